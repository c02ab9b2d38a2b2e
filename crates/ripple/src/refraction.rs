use crate::heightfield::{Height, HEIGHT_SHIFT};

/// Refractive index of water relative to air.
pub const REFRACTION_INDEX: f32 = 1.333;

/// Largest height delta the table covers; larger deltas clamp to it.
pub const MAX_DELTA: usize = 512;

/// Displacement lookup indexed by absolute height delta.
///
/// Entry `i` is the fixed-point (`<< 16`) horizontal shift of a ray entering a
/// surface of slope `i / 256`, following Snell's law.
#[derive(Debug, Clone)]
pub struct RefractionTable {
    entries: Vec<i32>,
}

impl RefractionTable {
    pub fn new(index: f32) -> Self {
        let ir = 1.0f32 / index;
        let entries = (0..=MAX_DELTA)
            .map(|i| {
                let slope = i as f32 * (1.0 / 256.0);
                let d = (slope.atan().sin() * ir).asin().tan();
                (d * (1u32 << HEIGHT_SHIFT) as f32 + 0.5).floor() as i32
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[i32] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> i32 {
        self.entries[index.min(MAX_DELTA)]
    }

    /// Signed displacement for height delta `d` at local wave height `wave`.
    ///
    /// Deeper troughs shrink the displacement; the result keeps the sign of
    /// `d` so `refract(-d, w) == -refract(d, w)`.
    pub fn refract(&self, d: Height, wave: Height) -> i32 {
        let i = (d.unsigned_abs() as usize).min(MAX_DELTA);
        let w = ((wave as i64 + 0x10000) >> 8).max(0);
        let r = ((self.entries[i] as i64 * w) >> 3) as i32;
        if d < 0 {
            -r
        } else {
            r
        }
    }
}

impl Default for RefractionTable {
    fn default() -> Self {
        Self::new(REFRACTION_INDEX)
    }
}
