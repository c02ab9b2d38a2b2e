use effect::{
    DrawCommand, Effect, ProgramStage, QuadVertex, RenderCommands, ResourceId, TimeSample,
    Viewport,
};
use glam::{Mat4, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};
use wallconfig::{GalaxySettings, ParticleLayout};

use crate::buffer::ParticleBuffer;
use crate::camera::CameraSweep;
use crate::distribution::{lerp, GalaxyShape};
use crate::star::Star;

pub const PARTICLES_MESH: ResourceId = ResourceId("particles");
pub const TEXTURE_SPACE: ResourceId = ResourceId("space");
pub const TEXTURE_FLARES: ResourceId = ResourceId("flares");
pub const TEXTURE_LIGHT: ResourceId = ResourceId("light1");

pub const FRAGMENT_BACKGROUND: ResourceId = ResourceId("pf_background");
pub const FRAGMENT_LIGHTING: ResourceId = ResourceId("pf_lighting");
pub const STORE_BACKGROUND: ResourceId = ResourceId("pfs_background");
pub const STORE_LIGHTS: ResourceId = ResourceId("pfs_lights");
pub const VERTEX_BACKGROUND: ResourceId = ResourceId("pv_background");

/// Edge length of the light flare texture in pixels.
const LIGHT_SIZE: f32 = 512.0;
/// The flare is widened by this fraction on each side.
const LIGHT_MARGIN: f32 = 0.05;

/// The rotating starfield scene.
pub struct GalaxyScene {
    stars: Vec<Star>,
    buffer: ParticleBuffer,
    shape: GalaxyShape,
    viewport: Viewport,
    x_offset: f32,
    preview: bool,
    sweep: CameraSweep,
    frames: u64,
}

impl GalaxyScene {
    pub fn from_config(settings: &GalaxySettings, viewport: Viewport, seed: u64) -> Self {
        let projection_scale = viewport.width.min(viewport.height) as f32 * 0.5;
        let shape = GalaxyShape::new(settings.galaxy_radius, projection_scale);
        let mut rng = StdRng::seed_from_u64(seed);
        let stars: Vec<Star> = (0..settings.particles)
            .map(|_| Star::spawn(&mut rng, &shape))
            .collect();
        let buffer = ParticleBuffer::new(settings.layout, &stars);

        debug!(
            particles = stars.len(),
            vertices = buffer.vertex_count(),
            radius = shape.radius,
            projection_scale,
            "generated star field"
        );
        info!(layout = ?settings.layout, %viewport, "galaxy scene created");

        let mut scene = Self {
            stars,
            buffer,
            shape,
            viewport,
            x_offset: 0.5,
            preview: false,
            sweep: CameraSweep::idle(),
            frames: 0,
        };
        scene.set_x_offset(settings.x_offset);
        scene.set_preview(settings.preview);
        scene
    }

    /// Sets the launcher scroll position; values outside `[0, 1]` clamp.
    pub fn set_x_offset(&mut self, offset: f32) {
        if !offset.is_finite() {
            warn!(offset, "ignoring non-finite parallax offset");
            return;
        }
        let clamped = offset.clamp(0.0, 1.0);
        if clamped != offset {
            warn!(offset, clamped, "parallax offset out of range");
        }
        self.x_offset = clamped;
    }

    pub fn x_offset(&self) -> f32 {
        self.x_offset
    }

    /// Turning preview on restarts the camera sweep; turning it off
    /// stops it.
    pub fn set_preview(&mut self, preview: bool) {
        if preview && !self.preview {
            debug!("preview sweep started");
            self.sweep = CameraSweep::start();
        } else if !preview {
            self.sweep = CameraSweep::idle();
        }
        self.preview = preview;
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    pub fn sweep(&self) -> &CameraSweep {
        &self.sweep
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn shape(&self) -> &GalaxyShape {
        &self.shape
    }

    pub fn particle_buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    pub fn layout(&self) -> ParticleLayout {
        self.buffer.layout()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Horizontal parallax shift: `+w` at offset 0, `-w` at offset 1.
    pub fn parallax(&self) -> f32 {
        let half = self.viewport.width as f32 * 0.5;
        lerp(half, -half, self.x_offset)
    }

    /// Screen point the stars orbit.
    pub fn origin(&self) -> Vec2 {
        Vec2::new(
            self.viewport.width as f32 * 0.5 + self.parallax(),
            self.viewport.height as f32 * 0.5,
        )
    }

    /// Mean orbital angle travelled per star since creation.
    pub fn mean_angle_advance(&self) -> f32 {
        if self.stars.is_empty() {
            return 0.0;
        }
        let mean_speed =
            self.stars.iter().map(|star| star.speed as f64).sum::<f64>() / self.stars.len() as f64;
        (mean_speed * self.frames as f64) as f32
    }

    fn draw_space(&self, commands: &mut RenderCommands) {
        let width = self.viewport.width as f32;
        let height = self.viewport.height as f32;
        commands.bind_program(ProgramStage::Vertex, VERTEX_BACKGROUND);
        commands.bind_program(ProgramStage::Fragment, FRAGMENT_BACKGROUND);
        commands.bind_program(ProgramStage::Store, STORE_BACKGROUND);
        commands.bind_texture(FRAGMENT_BACKGROUND, 0, TEXTURE_SPACE);
        commands.push(DrawCommand::DrawTexturedQuad {
            vertices: [
                QuadVertex::new(0.0, 0.0, 0.0, 0.0, 1.0),
                QuadVertex::new(width, 0.0, 0.0, 2.0, 1.0),
                QuadVertex::new(width, height, 0.0, 2.0, 0.0),
                QuadVertex::new(0.0, height, 0.0, 0.0, 0.0),
            ],
        });
    }

    fn draw_particles(&mut self, commands: &mut RenderCommands) {
        commands.bind_program(ProgramStage::Fragment, FRAGMENT_LIGHTING);
        commands.bind_program(ProgramStage::Store, STORE_LIGHTS);
        commands.bind_texture(FRAGMENT_LIGHTING, 0, TEXTURE_FLARES);

        let origin = self.origin();
        self.sweep.advance();
        commands.load_model_matrix(self.sweep.model_matrix(origin));

        for (index, star) in self.stars.iter_mut().enumerate() {
            star.advance();
            self.buffer.write(index, star.project(origin), star.radius);
        }

        commands.push(DrawCommand::UploadMesh {
            mesh: PARTICLES_MESH,
        });
        commands.push(DrawCommand::DrawMeshRange {
            mesh: PARTICLES_MESH,
            start: 0,
            count: self.stars.len() as u32 * self.layout().vertices_per_particle(),
        });
        commands.load_model_matrix(Mat4::IDENTITY);
    }

    fn draw_lights(&self, commands: &mut RenderCommands) {
        let x = (self.viewport.width as f32 - LIGHT_SIZE) * 0.5 + self.parallax()
            - LIGHT_SIZE * LIGHT_MARGIN;
        let y = (self.viewport.height as f32 - LIGHT_SIZE) * 0.5;
        let right = x + LIGHT_SIZE * (1.0 + 2.0 * LIGHT_MARGIN);

        commands.bind_program(ProgramStage::Fragment, FRAGMENT_BACKGROUND);
        commands.bind_texture(FRAGMENT_BACKGROUND, 0, TEXTURE_LIGHT);
        commands.push(DrawCommand::DrawQuad {
            corners: [
                [right, y, 0.0],
                [x, y, 0.0],
                [x, y + LIGHT_SIZE, 0.0],
                [right, y + LIGHT_SIZE, 0.0],
            ],
        });
    }
}

impl Effect for GalaxyScene {
    fn name(&self) -> &'static str {
        "galaxy"
    }

    fn step(&mut self, sample: TimeSample) -> RenderCommands {
        let mut commands = RenderCommands::with_capacity(20);
        self.draw_space(&mut commands);
        self.draw_particles(&mut commands);
        self.draw_lights(&mut commands);

        self.frames += 1;
        trace!(
            frame = sample.frame_index,
            sweep_angle = self.sweep.angle,
            "galaxy frame"
        );
        commands
    }
}
