use rand::Rng;

/// Radial twist applied per unit of raw distance; produces the spiral arms.
pub const ELLIPSE_TWIST: f32 = 0.023_333_333;

/// Vertical squash of every orbit.
pub const ELLIPSE_RATIO: f32 = 0.892;

/// Fraction of the galaxy radius that forms the bright core.
pub const INNER_BAND: f32 = 0.33;

/// Orbital speed boost near the centre, in raw distance units.
pub const INNER_SPEEDUP: f32 = 20.0;

/// Uniform jitter added to every raw distance.
pub const DISTANCE_JITTER: f32 = 64.0;

/// Standard normal sample via the polar Box-Muller method.
pub fn random_gauss<R: Rng>(rng: &mut R) -> f32 {
    loop {
        let x1: f32 = rng.gen_range(-1.0..1.0);
        let x2: f32 = rng.gen_range(-1.0..1.0);
        let w = x1 * x1 + x2 * x2;
        if w > 0.0 && w < 1.0 {
            return x1 * ((-2.0 * w.ln()) / w).sqrt();
        }
    }
}

/// Size of the galaxy in raw units and on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalaxyShape {
    /// Radius `R` that raw star distances are drawn against.
    pub radius: f32,
    /// Screen distance `S` the outermost stars project to.
    pub projection_scale: f32,
}

impl GalaxyShape {
    pub fn new(radius: f32, projection_scale: f32) -> Self {
        Self {
            radius,
            projection_scale,
        }
    }

    /// Raw distance from the centre: a half-normal spread plus jitter.
    pub fn sample_distance<R: Rng>(&self, rng: &mut R) -> f32 {
        random_gauss(rng).abs() * self.radius * 0.5 + rng.gen_range(0.0..DISTANCE_JITTER)
    }

    /// Raw distance as a fraction of the radius.
    pub fn normalized(&self, distance: f32) -> f32 {
        distance / self.radius
    }

    /// Maps a raw distance onto `[0, projection_scale]`.
    pub fn project(&self, distance: f32) -> f32 {
        let t = self.normalized(distance).clamp(0.0, 1.0);
        lerp(0.0, self.projection_scale, t)
    }

    pub fn is_inner(&self, distance: f32) -> bool {
        distance < INNER_BAND * self.radius
    }
}

pub fn lerp(start: f32, stop: f32, amount: f32) -> f32 {
    start + (stop - start) * amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn gauss_samples_look_standard_normal() {
        let mut rng = StdRng::seed_from_u64(17);
        let samples: Vec<f32> = (0..20_000).map(|_| random_gauss(&mut rng)).collect();
        assert!(samples.iter().all(|value| value.is_finite()));
        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        let variance =
            samples.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / samples.len() as f32;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((variance - 1.0).abs() < 0.08, "variance {variance}");
    }

    #[test]
    fn projected_distances_stay_within_scale() {
        let shape = GalaxyShape::new(300.0, 540.0);
        let mut rng = StdRng::seed_from_u64(99);
        let mut beyond_radius = 0;
        for _ in 0..10_000 {
            let raw = shape.sample_distance(&mut rng);
            assert!(raw >= 0.0);
            if raw > shape.radius {
                beyond_radius += 1;
            }
            let projected = shape.project(raw);
            assert!((0.0..=540.0).contains(&projected), "projected {projected}");
        }
        // The half-normal tail regularly overshoots the radius; clamping keeps it on screen.
        assert!(beyond_radius > 0);
    }

    #[test]
    fn projection_is_linear_inside_radius() {
        let shape = GalaxyShape::new(200.0, 400.0);
        assert_eq!(shape.project(0.0), 0.0);
        assert_eq!(shape.project(100.0), 200.0);
        assert_eq!(shape.project(200.0), 400.0);
        assert_eq!(shape.project(1_000.0), 400.0);
    }

    #[test]
    fn inner_band_boundary() {
        let shape = GalaxyShape::new(100.0, 100.0);
        assert!(shape.is_inner(32.9));
        assert!(!shape.is_inner(33.1));
    }
}
