use effect::{
    DrawCommand, Effect, Lighting, ProgramStage, RenderCommands, ResourceId, TimeSample, Viewport,
};
use glam::Mat4;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};
use wallconfig::{FallSettings, MAX_DROP_RADIUS};

use crate::heightfield::RippleMap;
use crate::leaf::{Leaf, SurfaceGeometry};
use crate::mesh::{MeshVertex, WaterMesh};
use crate::refraction::RefractionTable;
use crate::sky::SkyScroll;

pub const WATER_MESH: ResourceId = ResourceId("water");
pub const TEXTURE_RIVERBED: ResourceId = ResourceId("riverbed");
pub const TEXTURE_SKY: ResourceId = ResourceId("sky");
pub const TEXTURE_LEAVES: ResourceId = ResourceId("leaves");

pub const FRAGMENT_BACKGROUND: ResourceId = ResourceId("pf_background");
pub const FRAGMENT_SKY: ResourceId = ResourceId("pf_sky");
pub const FRAGMENT_LIGHTING: ResourceId = ResourceId("pf_lighting");
pub const STORE_BACKGROUND: ResourceId = ResourceId("pfs_background");
pub const STORE_LEAF: ResourceId = ResourceId("pfs_leaf");
pub const VERTEX_SKY: ResourceId = ResourceId("pv_sky");
pub const VERTEX_LIGHT: ResourceId = ResourceId("pv_light");

const SKY_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.8];
const NORMAL_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const NORMAL_SCALE: f32 = 0.1;

const WATER_LIGHTING: Lighting = Lighting {
    ambient: [0.0, 0.0, 0.0, 1.0],
    diffuse: [0.0, 0.0, 0.0, 1.0],
    specular: [0.44, 0.44, 0.44, 1.0],
    shininess: 40.0,
};

/// Running totals since the scene was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallStats {
    pub frames: u64,
    /// Host drops consumed from the pending slot.
    pub drops: u64,
    /// Leaves that touched the water and rippled it.
    pub landings: u64,
}

/// The falling-leaves water scene.
pub struct FallScene {
    map: RippleMap,
    table: RefractionTable,
    mesh: WaterMesh,
    leaves: Vec<Leaf>,
    sky: SkyScroll,
    surface: SurfaceGeometry,
    viewport: Viewport,
    drop_radius: i32,
    show_normals: bool,
    pending_drop: Option<(i32, i32)>,
    rng: StdRng,
    stats: FallStats,
}

impl FallScene {
    pub fn from_config(settings: &FallSettings, viewport: Viewport, seed: u64) -> Self {
        let drop_radius = settings.drop_radius.clamp(1, MAX_DROP_RADIUS);
        let min_size = (2 * drop_radius + 2) as usize;
        let mesh_width = (settings.mesh_resolution as usize).max(min_size);
        let mesh_height = ((mesh_width as u64 * viewport.height as u64)
            / viewport.width.max(1) as u64) as usize;
        let mesh_height = mesh_height.max(min_size);

        let gl_width = 2.0;
        let gl_height = gl_width * viewport.aspect();
        let surface = SurfaceGeometry {
            gl_width,
            gl_height,
            mesh_width,
            mesh_height,
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let falling = settings.falling_leaves.min(settings.leaves);
        let leaves = (0..settings.leaves)
            .map(|index| {
                if index < falling {
                    Leaf::falling(&mut rng, &surface)
                } else {
                    Leaf::floating(&mut rng, &surface)
                }
            })
            .collect();
        let sky = match settings.sky_speed {
            Some([x, y]) => SkyScroll::new(x, y),
            None => SkyScroll::random(&mut rng),
        };

        debug!(
            mesh_width,
            mesh_height, gl_height, "allocated ripple map and water mesh"
        );
        info!(
            leaves = settings.leaves,
            falling,
            %viewport,
            "fall scene created"
        );

        Self {
            map: RippleMap::new(mesh_width, mesh_height),
            table: RefractionTable::default(),
            mesh: WaterMesh::new(mesh_width, mesh_height, gl_width, gl_height),
            leaves,
            sky,
            surface,
            viewport,
            drop_radius,
            show_normals: settings.show_normals,
            pending_drop: None,
            rng,
            stats: FallStats::default(),
        }
    }

    /// Schedules a drop at grid cell `(x, y)` for the next step. A newer
    /// request replaces one that has not been consumed yet.
    pub fn queue_drop(&mut self, x: i32, y: i32) {
        self.pending_drop = Some((x, y));
    }

    /// Schedules a drop under the screen pixel `(px, py)`.
    pub fn touch(&mut self, px: f32, py: f32) {
        let width = self.viewport.width.max(1) as f32;
        let height = self.viewport.height.max(1) as f32;
        let x = px / width * self.surface.mesh_width as f32;
        let y = py / height * self.surface.mesh_height as f32;
        self.queue_drop(x as i32, y as i32);
    }

    pub fn pending_drop(&self) -> Option<(i32, i32)> {
        self.pending_drop
    }

    pub fn set_show_normals(&mut self, show: bool) {
        self.show_normals = show;
    }

    /// Vertices as last generated, in upload layout.
    pub fn mesh(&self) -> &[MeshVertex] {
        self.mesh.vertices()
    }

    pub fn water_mesh(&self) -> &WaterMesh {
        &self.mesh
    }

    pub fn ripple_map(&self) -> &RippleMap {
        &self.map
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn sky(&self) -> &SkyScroll {
        &self.sky
    }

    pub fn surface(&self) -> &SurfaceGeometry {
        &self.surface
    }

    pub fn stats(&self) -> FallStats {
        self.stats
    }

    fn simulate(&mut self, commands: &mut RenderCommands) {
        if let Some((x, y)) = self.pending_drop.take() {
            trace!(x, y, radius = self.drop_radius, "drop consumed");
            self.map.drop(x, y, self.drop_radius);
            self.stats.drops += 1;
        }

        self.map.update();
        self.mesh.generate_ripples(&self.map, &self.table);
        self.mesh.compute_normals();
        commands.push(DrawCommand::UploadMesh { mesh: WATER_MESH });
    }

    fn draw_riverbed(&self, commands: &mut RenderCommands) {
        commands.bind_program(ProgramStage::Fragment, FRAGMENT_BACKGROUND);
        commands.bind_program(ProgramStage::Store, STORE_BACKGROUND);
        commands.bind_program(ProgramStage::Vertex, VERTEX_SKY);
        commands.bind_texture(FRAGMENT_BACKGROUND, 0, TEXTURE_RIVERBED);
        commands.draw_mesh(WATER_MESH);
    }

    fn draw_sky(&mut self, commands: &mut RenderCommands) {
        commands.push(DrawCommand::SetColor { rgba: SKY_COLOR });
        commands.bind_program(ProgramStage::Fragment, FRAGMENT_SKY);
        commands.bind_program(ProgramStage::Store, STORE_LEAF);
        commands.bind_texture(FRAGMENT_SKY, 0, TEXTURE_SKY);

        let matrix = self.sky.advance();
        commands.load_texture_matrix(matrix);
        commands.draw_mesh(WATER_MESH);
        commands.load_texture_matrix(Mat4::IDENTITY);
    }

    fn draw_lighting(&self, commands: &mut RenderCommands) {
        commands.push(DrawCommand::SetLighting(WATER_LIGHTING));
        commands.bind_program(ProgramStage::Store, STORE_BACKGROUND);
        commands.bind_program(ProgramStage::Fragment, FRAGMENT_LIGHTING);
        commands.bind_program(ProgramStage::Vertex, VERTEX_LIGHT);
        commands.draw_mesh(WATER_MESH);
    }

    fn draw_leaves(&mut self, commands: &mut RenderCommands) {
        commands.bind_program(ProgramStage::Fragment, FRAGMENT_BACKGROUND);
        commands.bind_program(ProgramStage::Store, STORE_LEAF);
        commands.bind_program(ProgramStage::Vertex, VERTEX_SKY);
        commands.bind_texture(FRAGMENT_BACKGROUND, 0, TEXTURE_LEAVES);

        for index in 0..self.leaves.len() {
            let leaf = &mut self.leaves[index];
            commands.load_model_matrix(leaf.model_matrix());
            commands.push(DrawCommand::DrawTexturedQuad {
                vertices: leaf.quad(),
            });

            // The edge test uses the position that was just drawn.
            let drawn = *leaf;
            if let Some((x, y)) = leaf.advance(&self.surface) {
                trace!(leaf = index, x, y, "leaf landed");
                self.map.drop(x, y, self.drop_radius);
                self.stats.landings += 1;
            }
            if drawn.is_outside(&self.surface) {
                leaf.respawn(&mut self.rng, &self.surface);
            }
        }

        commands.load_model_matrix(Mat4::IDENTITY);
    }

    fn draw_normals(&self, commands: &mut RenderCommands) {
        commands.bind_program(ProgramStage::Vertex, VERTEX_SKY);
        commands.bind_program(ProgramStage::Fragment, FRAGMENT_LIGHTING);
        commands.push(DrawCommand::SetColor { rgba: NORMAL_COLOR });
        for (from, to) in self.mesh.normal_lines(NORMAL_SCALE) {
            commands.push(DrawCommand::DrawLine { from, to });
        }
    }
}

impl Effect for FallScene {
    fn name(&self) -> &'static str {
        "fall"
    }

    fn step(&mut self, sample: TimeSample) -> RenderCommands {
        let extra = if self.show_normals {
            self.mesh.vertices().len() + 3
        } else {
            0
        };
        let mut commands = RenderCommands::with_capacity(32 + self.leaves.len() * 2 + extra);

        self.simulate(&mut commands);
        self.draw_riverbed(&mut commands);
        self.draw_sky(&mut commands);
        self.draw_lighting(&mut commands);
        self.draw_leaves(&mut commands);
        if self.show_normals {
            self.draw_normals(&mut commands);
        }

        self.stats.frames += 1;
        trace!(
            frame = sample.frame_index,
            commands = commands.len(),
            "fall frame"
        );
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> FallSettings {
        FallSettings {
            mesh_resolution: 16,
            leaves: 6,
            falling_leaves: 2,
            drop_radius: 2,
            sky_speed: Some([0.001, 0.0001]),
            show_normals: false,
        }
    }

    fn scene(settings: &FallSettings) -> FallScene {
        FallScene::from_config(settings, Viewport::new(100, 200), 42)
    }

    fn sample(frame: u64) -> TimeSample {
        TimeSample::new(frame as f32 / 60.0, frame)
    }

    fn count(commands: &RenderCommands, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        commands.iter().filter(|command| pred(command)).count()
    }

    #[test]
    fn geometry_follows_viewport_aspect() {
        let scene = scene(&settings());
        let surface = scene.surface();
        assert_eq!((surface.mesh_width, surface.mesh_height), (16, 32));
        assert_eq!((surface.gl_width, surface.gl_height), (2.0, 4.0));
        assert_eq!(scene.mesh().len(), 16 * 32);
        assert_eq!(scene.leaves().len(), 6);
    }

    #[test]
    fn landscape_mesh_keeps_minimum_height() {
        let scene = FallScene::from_config(&settings(), Viewport::new(1000, 100), 1);
        assert_eq!(scene.surface().mesh_height, 6);
    }

    #[test]
    fn frame_starts_with_upload_and_draws_mesh_three_times() {
        let mut scene = scene(&settings());
        let commands = scene.step(sample(0));
        assert!(commands.keep_running);
        assert_eq!(
            commands.commands()[0],
            DrawCommand::UploadMesh { mesh: WATER_MESH }
        );
        assert_eq!(
            count(&commands, |c| matches!(c, DrawCommand::DrawMesh { .. })),
            3
        );
        assert_eq!(
            count(&commands, |c| matches!(c, DrawCommand::DrawTexturedQuad { .. })),
            6
        );
        assert_eq!(
            count(&commands, |c| matches!(c, DrawCommand::SetLighting(_))),
            1
        );
        assert_eq!(
            commands.commands().last(),
            Some(&DrawCommand::LoadModelMatrix {
                matrix: Mat4::IDENTITY
            })
        );
    }

    #[test]
    fn sky_texture_matrix_is_restored() {
        let mut scene = scene(&settings());
        let commands = scene.step(sample(0));
        let matrices: Vec<Mat4> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::LoadTextureMatrix { matrix } => Some(*matrix),
                _ => None,
            })
            .collect();
        assert_eq!(matrices.len(), 2);
        assert_eq!(matrices[0].w_axis.x, 0.001);
        assert_eq!(matrices[1], Mat4::IDENTITY);
    }

    #[test]
    fn queued_drop_is_consumed_once() {
        let mut settings = settings();
        settings.falling_leaves = 0;
        let mut scene = scene(&settings);
        assert!(scene.ripple_map().is_flat());

        scene.queue_drop(3, 3);
        scene.queue_drop(8, 10);
        assert_eq!(scene.pending_drop(), Some((8, 10)));
        scene.step(sample(0));
        assert_eq!(scene.pending_drop(), None);
        assert_eq!(scene.stats().drops, 1);
        assert!(scene.ripple_map().energy() > 0);

        scene.step(sample(1));
        assert_eq!(scene.stats().drops, 1);
    }

    #[test]
    fn touch_converts_pixels_to_grid() {
        let mut scene = scene(&settings());
        scene.touch(50.0, 100.0);
        assert_eq!(scene.pending_drop(), Some((8, 16)));
        scene.touch(0.0, 199.0);
        assert_eq!(scene.pending_drop(), Some((0, 31)));
    }

    #[test]
    fn every_falling_leaf_lands_once() {
        let settings = settings();
        let mut scene = scene(&settings);
        for frame in 0..400 {
            scene.step(sample(frame));
        }
        let stats = scene.stats();
        assert_eq!(stats.frames, 400);
        assert_eq!(stats.landings, 2);
        assert_eq!(stats.drops, 0);
        assert!(scene.leaves().iter().all(|leaf| leaf.rippled));
    }

    #[test]
    fn leaf_respawns_the_frame_after_it_is_drawn_outside() {
        let mut scene = scene(&settings());
        let extent = crate::leaf::LEAF_SIZE * scene.leaves[0].scale;
        let start_x = 1.0 + extent - 0.001;
        {
            let leaf = &mut scene.leaves[0];
            leaf.x = start_x;
            leaf.y = 0.0;
            leaf.altitude = -1.0;
            leaf.rippled = true;
            leaf.delta_x = 0.01;
            leaf.delta_y = 0.0;
        }

        scene.step(sample(0));
        let leaf = scene.leaves()[0];
        assert!(leaf.is_outside(scene.surface()));
        assert!((leaf.x - (start_x + 0.01)).abs() < 1e-6);
        assert_eq!(leaf.y, 0.0);

        scene.step(sample(1));
        let leaf = scene.leaves()[0];
        assert!(leaf.y >= scene.surface().gl_height * 0.5);
    }

    #[test]
    fn floating_leaves_never_disturb_the_water() {
        let mut settings = settings();
        settings.falling_leaves = 0;
        let mut scene = scene(&settings);
        for frame in 0..50 {
            scene.step(sample(frame));
        }
        assert!(scene.ripple_map().is_flat());
        assert_eq!(scene.stats().landings, 0);
    }

    #[test]
    fn debug_normals_draw_one_line_per_vertex() {
        let mut settings = settings();
        settings.show_normals = true;
        let mut scene = scene(&settings);
        let commands = scene.step(sample(0));
        assert_eq!(
            count(&commands, |c| matches!(c, DrawCommand::DrawLine { .. })),
            16 * 32
        );

        scene.set_show_normals(false);
        let commands = scene.step(sample(1));
        assert_eq!(
            count(&commands, |c| matches!(c, DrawCommand::DrawLine { .. })),
            0
        );
    }

    #[test]
    fn same_seed_replays_identically() {
        let settings = settings();
        let mut a = scene(&settings);
        let mut b = scene(&settings);
        a.queue_drop(5, 5);
        b.queue_drop(5, 5);
        for frame in 0..30 {
            assert_eq!(a.step(sample(frame)), b.step(sample(frame)));
        }
        assert_eq!(a.mesh(), b.mesh());
    }
}
