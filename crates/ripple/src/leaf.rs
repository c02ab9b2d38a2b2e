use effect::QuadVertex;
use glam::{Mat4, Vec3};
use rand::Rng;

/// Half extent of a leaf quad in GL units, before scaling.
pub const LEAF_SIZE: f32 = 0.55;

/// Number of leaf sprites packed side by side in the leaf texture.
pub const LEAF_TEXTURE_COUNT: u32 = 4;

/// Altitude lost per frame while a leaf is airborne.
pub const FALL_RATE: f32 = 0.005;

/// GL-space and grid dimensions a leaf moves within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    pub gl_width: f32,
    pub gl_height: f32,
    pub mesh_width: usize,
    pub mesh_height: usize,
}

impl SurfaceGeometry {
    /// Grid cell under GL-space point `(x, y)` in drop coordinates.
    pub fn grid_point(&self, x: f32, y: f32) -> (i32, i32) {
        let gx = ((x + self.gl_width * 0.5) / self.gl_width) * self.mesh_width as f32;
        let gy = self.mesh_height as f32
            - ((y + self.gl_height * 0.5) / self.gl_height) * self.mesh_height as f32;
        (gx as i32, gy as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leaf {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    /// Rotation in degrees.
    pub angle: f32,
    /// Rotation per frame in degrees.
    pub spin: f32,
    pub u1: f32,
    pub u2: f32,
    /// Height above the water; `<= 0` means floating.
    pub altitude: f32,
    /// Set once a landed leaf has disturbed the water.
    pub rippled: bool,
    pub delta_x: f32,
    pub delta_y: f32,
}

impl Leaf {
    /// A leaf already floating somewhere on the visible surface.
    pub fn floating<R: Rng>(rng: &mut R, surface: &SurfaceGeometry) -> Self {
        let half_height = surface.gl_height * 0.5;
        let (u1, u2) = random_sprite(rng);
        Self {
            x: rng.gen_range(-1.0..1.0),
            y: rng.gen_range(-half_height..half_height),
            scale: rng.gen_range(0.4..0.5),
            angle: rng.gen_range(0.0..360.0),
            spin: random_spin(rng),
            u1,
            u2,
            altitude: -1.0,
            rippled: true,
            delta_x: random_delta_x(rng),
            delta_y: random_delta_y(rng),
        }
    }

    /// A leaf still in the air; it ripples the water once it lands.
    pub fn falling<R: Rng>(rng: &mut R, surface: &SurfaceGeometry) -> Self {
        Self {
            altitude: rng.gen_range(0.25..1.0),
            rippled: false,
            ..Self::floating(rng, surface)
        }
    }

    pub fn is_airborne(&self) -> bool {
        self.altitude > 0.0
    }

    /// Model transform: translate, uniform scale, then spin about z.
    pub fn model_matrix(&self) -> Mat4 {
        let tz = if self.is_airborne() { -self.altitude } else { 0.0 };
        Mat4::from_translation(Vec3::new(self.x, self.y, tz))
            * Mat4::from_scale(Vec3::new(self.scale, self.scale, 1.0))
            * Mat4::from_rotation_z(self.angle.to_radians())
    }

    /// Quad in leaf-local space with this leaf's sprite coordinates.
    pub fn quad(&self) -> [QuadVertex; 4] {
        let (x1, x2) = (-LEAF_SIZE, LEAF_SIZE);
        let (y1, y2) = (-LEAF_SIZE, LEAF_SIZE);
        [
            QuadVertex::new(x1, y1, 0.0, self.u1, 1.0),
            QuadVertex::new(x2, y1, 0.0, self.u2, 1.0),
            QuadVertex::new(x2, y2, 0.0, self.u2, 0.0),
            QuadVertex::new(x1, y2, 0.0, self.u1, 0.0),
        ]
    }

    /// Moves the leaf one frame.
    ///
    /// Returns the grid cell to ripple when a landed leaf touches the water
    /// for the first time; its spin is quartered at that moment.
    pub fn advance(&mut self, surface: &SurfaceGeometry) -> Option<(i32, i32)> {
        if self.is_airborne() {
            self.altitude -= FALL_RATE;
            self.angle += self.spin * 2.0;
            return None;
        }

        let mut landing = None;
        if !self.rippled {
            landing = Some(surface.grid_point(self.x, self.y));
            self.spin /= 4.0;
            self.rippled = true;
        }
        self.x += self.delta_x;
        self.y += self.delta_y;
        self.angle += self.spin;
        landing
    }

    pub fn is_outside(&self, surface: &SurfaceGeometry) -> bool {
        let extent = LEAF_SIZE * self.scale;
        -extent + self.x > surface.gl_width * 0.5
            || extent + self.x < -surface.gl_width * 0.5
            || extent + self.y < -surface.gl_height * 0.5
    }

    /// Re-enters the leaf just above the top edge with a fresh sprite,
    /// scale, spin and drift. Angle, altitude and ripple state carry over.
    pub fn respawn<R: Rng>(&mut self, rng: &mut R, surface: &SurfaceGeometry) {
        let (u1, u2) = random_sprite(rng);
        self.x = rng.gen_range(-1.0..1.0);
        self.y = surface.gl_height * 0.5 + LEAF_SIZE * 2.0 * rng.gen_range(0.0..1.0);
        self.scale = rng.gen_range(0.4..0.5);
        self.spin = random_spin(rng);
        self.u1 = u1;
        self.u2 = u2;
        self.delta_x = random_delta_x(rng);
        self.delta_y = random_delta_y(rng);
    }
}

fn random_sprite<R: Rng>(rng: &mut R) -> (f32, f32) {
    let sprite = rng.gen_range(0..LEAF_TEXTURE_COUNT) as f32;
    let count = LEAF_TEXTURE_COUNT as f32;
    (sprite / count, (sprite + 1.0) / count)
}

fn random_spin<R: Rng>(rng: &mut R) -> f32 {
    rng.gen_range(-0.02f32..0.02).to_degrees() / 4.0
}

fn random_delta_x<R: Rng>(rng: &mut R) -> f32 {
    rng.gen_range(-0.02..0.02) / 60.0
}

fn random_delta_y<R: Rng>(rng: &mut R) -> f32 {
    -0.08 * rng.gen_range(0.9..1.1) / 60.0
}
