use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::distribution::{GalaxyShape, ELLIPSE_RATIO, ELLIPSE_TWIST, INNER_BAND, INNER_SPEEDUP};

/// One orbiting particle.
///
/// `speed` and `distance` are fixed at creation; only `angle` moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Orbital angle in radians.
    pub angle: f32,
    /// Projected orbit radius in screen units.
    pub distance: f32,
    /// Radians added to `angle` per frame.
    pub speed: f32,
    /// Half size of the drawn particle.
    pub radius: f32,
    /// Cosine of the orbit twist.
    pub s: f32,
    /// Sine of the orbit twist.
    pub t: f32,
    /// RGBA.
    pub color: [u8; 4],
}

impl Star {
    pub fn spawn<R: Rng>(rng: &mut R, shape: &GalaxyShape) -> Self {
        let d = shape.sample_distance(rng);
        let id = shape.normalized(d);
        let twist = -d * ELLIPSE_TWIST;
        let angle = rng.gen_range(0.0..TAU);
        let speed =
            rng.gen_range(0.0015..0.0025) * (0.5 + INNER_SPEEDUP / d.max(1.0)) * 0.8;

        let (color, radius) = if shape.is_inner(d) {
            let red = (220.0 + 35.0 * id).min(255.0) as u8;
            ([red, 220, 220, 255], rng.gen_range(1.6..2.4))
        } else {
            let blue = (140.0 + 115.0 * id).clamp(140.0, 255.0) as u8;
            let fade = ((id - INNER_BAND) / (1.0 - INNER_BAND)).clamp(0.0, 1.0);
            let alpha = (255.0 + (96.0 - 255.0) * fade) as u8;
            ([180, 180, blue, alpha], rng.gen_range(1.0..1.8))
        };

        Self {
            angle,
            distance: shape.project(d),
            speed,
            radius,
            s: twist.cos(),
            t: twist.sin(),
            color,
        }
    }

    pub fn advance(&mut self) {
        self.angle += self.speed;
    }

    /// Screen position of the star around `origin`: a point on a squashed
    /// ellipse, rotated by the star's twist.
    pub fn project(&self, origin: Vec2) -> Vec2 {
        let x = self.distance * self.angle.sin();
        let y = self.distance * self.angle.cos() * ELLIPSE_RATIO;
        Vec2::new(
            self.t * x + self.s * y + origin.x,
            self.s * x - self.t * y + origin.y,
        )
    }

    /// Colour packed as `0xAABBGGRR`, the byte order hosts upload.
    pub fn packed_color(&self) -> u32 {
        u32::from_le_bytes(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stars(count: usize) -> (Vec<Star>, GalaxyShape) {
        let shape = GalaxyShape::new(300.0, 540.0);
        let mut rng = StdRng::seed_from_u64(2024);
        let stars = (0..count).map(|_| Star::spawn(&mut rng, &shape)).collect();
        (stars, shape)
    }

    #[test]
    fn angle_advances_by_speed_only() {
        let (mut stars, _) = stars(200);
        let before = stars.clone();
        for star in &mut stars {
            star.advance();
        }
        for (star, old) in stars.iter().zip(&before) {
            assert_eq!(star.angle, old.angle + old.speed);
            assert_eq!(star.speed, old.speed);
            assert_eq!(star.distance, old.distance);
            assert_eq!(star.radius, old.radius);
        }
    }

    #[test]
    fn spawned_stars_fit_bands() {
        let (stars, shape) = stars(5_000);
        for star in &stars {
            assert!((0.0..=shape.projection_scale).contains(&star.distance));
            assert!((0.0..TAU).contains(&star.angle));
            assert!(star.speed > 0.0);
            assert!((star.s * star.s + star.t * star.t - 1.0).abs() < 1e-4);
            if star.color[3] == 255 && star.color[1] == 220 {
                assert!((1.6..2.4).contains(&star.radius));
                assert!(star.color[0] >= 220);
            } else {
                assert_eq!(&star.color[..2], &[180, 180]);
                assert!(star.color[2] >= 140);
                assert!(star.color[3] >= 96);
                assert!((1.0..1.8).contains(&star.radius));
            }
        }
        let inner = stars.iter().filter(|s| s.color[1] == 220).count();
        assert!(inner > 0 && inner < stars.len());
    }

    #[test]
    fn inner_stars_orbit_faster_on_average() {
        let (stars, _) = stars(5_000);
        let mean = |inner: bool| {
            let speeds: Vec<f32> = stars
                .iter()
                .filter(|s| (s.color[1] == 220) == inner)
                .map(|s| s.speed)
                .collect();
            speeds.iter().sum::<f32>() / speeds.len() as f32
        };
        assert!(mean(true) > mean(false));
    }

    #[test]
    fn projection_applies_twist_and_squash() {
        let star = Star {
            angle: 0.0,
            distance: 100.0,
            speed: 0.0,
            radius: 1.0,
            s: 1.0,
            t: 0.0,
            color: [0; 4],
        };
        let p = star.project(Vec2::new(10.0, 20.0));
        assert!((p - Vec2::new(10.0 + 100.0 * ELLIPSE_RATIO, 20.0)).length() < 1e-4);

        let quarter = Star {
            angle: std::f32::consts::FRAC_PI_2,
            s: 0.0,
            t: 1.0,
            ..star
        };
        let p = quarter.project(Vec2::ZERO);
        assert!((p - Vec2::new(100.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn packs_color_as_abgr() {
        let star = Star {
            angle: 0.0,
            distance: 0.0,
            speed: 0.0,
            radius: 1.0,
            s: 1.0,
            t: 0.0,
            color: [0x11, 0x22, 0x33, 0x44],
        };
        assert_eq!(star.packed_color(), 0x4433_2211);
    }
}
