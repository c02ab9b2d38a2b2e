use glam::{Mat4, Vec2, Vec3};

/// Rotation, in degrees, the preview sweep starts from.
pub const SWEEP_START_ANGLE: f32 = 45.0;
/// Extra distance the preview sweep starts from; the draw is scaled by
/// `1 / (1 + distance)`.
pub const SWEEP_START_DISTANCE: f32 = 1.5;
/// Fraction of the remaining sweep kept each frame.
pub const SWEEP_DECAY: f32 = 0.95;
/// Components below this snap to zero.
pub const SWEEP_EPSILON: f32 = 1e-3;

/// Fly-in camera used while the wallpaper is shown in the picker preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSweep {
    pub angle: f32,
    pub distance: f32,
    active: bool,
}

impl CameraSweep {
    pub fn idle() -> Self {
        Self {
            angle: 0.0,
            distance: 0.0,
            active: false,
        }
    }

    pub fn start() -> Self {
        Self {
            angle: SWEEP_START_ANGLE,
            distance: SWEEP_START_DISTANCE,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True once both components have decayed to zero.
    pub fn is_settled(&self) -> bool {
        self.angle == 0.0 && self.distance == 0.0
    }

    /// Decays the sweep one frame; a no-op when idle.
    pub fn advance(&mut self) {
        if !self.active {
            return;
        }
        self.angle = decay(self.angle);
        self.distance = decay(self.distance);
    }

    /// Rotation about `origin` by `angle` degrees, scaled toward it by
    /// `1 / (1 + distance)`. Identity when idle or settled.
    pub fn model_matrix(&self, origin: Vec2) -> Mat4 {
        if !self.active || self.is_settled() {
            return Mat4::IDENTITY;
        }
        let pivot = origin.extend(0.0);
        let scale = 1.0 / (1.0 + self.distance);
        Mat4::from_translation(pivot)
            * Mat4::from_rotation_z(self.angle.to_radians())
            * Mat4::from_scale(Vec3::new(scale, scale, 1.0))
            * Mat4::from_translation(-pivot)
    }
}

impl Default for CameraSweep {
    fn default() -> Self {
        Self::idle()
    }
}

fn decay(value: f32) -> f32 {
    let next = value * SWEEP_DECAY;
    if next.abs() < SWEEP_EPSILON {
        0.0
    } else {
        next
    }
}
