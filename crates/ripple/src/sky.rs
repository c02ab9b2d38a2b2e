use glam::{Mat4, Vec3};
use rand::Rng;

/// Scrolling texture offset for the sky reflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyScroll {
    pub offset_x: f32,
    pub offset_y: f32,
    pub speed_x: f32,
    pub speed_y: f32,
}

impl SkyScroll {
    pub fn new(speed_x: f32, speed_y: f32) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            speed_x,
            speed_y,
        }
    }

    /// A slow drift with a random sideways component and a steady upward one.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::new(rng.gen_range(-0.001..0.001), rng.gen_range(0.00008..0.0002))
    }

    /// Moves the offset one frame and returns the texture matrix to load.
    ///
    /// Either axis snaps back to zero once it leaves its range: `[-1, 1]`
    /// horizontally, above `1` vertically.
    pub fn advance(&mut self) -> Mat4 {
        let mut x = self.offset_x + self.speed_x;
        let mut y = self.offset_y + self.speed_y;
        if !(-1.0..=1.0).contains(&x) {
            x = 0.0;
        }
        if y > 1.0 {
            y = 0.0;
        }
        self.offset_x = x;
        self.offset_y = y;
        self.matrix()
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.offset_x, self.offset_y, 0.0))
    }
}
