//! Damped wave simulation over a ping-pong pair of integer height grids.
//!
//! Heights are `i32` values in a fixed-point scale: a drop of radius `r`
//! produces depths of magnitude `sqrt(r² << HEIGHT_SHIFT)`, i.e. `r * 256`.
//! Each grid carries a one-cell halo that stays zero so neighbour reads never
//! need bounds checks; the halo acts as a fixed (reflecting) boundary.

/// Left shift applied inside the drop square root.
pub const HEIGHT_SHIFT: u32 = 16;

/// Damping shift: each step removes `value >> DAMP` (about 12.5%).
pub const DAMP: u32 = 3;

/// Fixed-point wave height.
pub type Height = i32;

#[derive(Debug, Clone)]
pub struct RippleMap {
    width: usize,
    height: usize,
    buffers: [Vec<Height>; 2],
    active: usize,
}

impl RippleMap {
    pub fn new(width: usize, height: usize) -> Self {
        let len = (width + 2) * (height + 2);
        Self {
            width,
            height,
            buffers: [vec![0; len], vec![0; len]],
            active: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Index of the grid currently holding the newest state.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Row stride including both halo columns.
    pub fn stride(&self) -> usize {
        self.width + 2
    }

    /// Buffer index of interior cell `(x, y)`; `-1` and `width`/`height`
    /// address the halo.
    pub fn offset(&self, x: isize, y: isize) -> usize {
        let stride = self.stride() as isize;
        (x + 1 + (y + 1) * stride) as usize
    }

    /// The current grid, halo included.
    pub fn current(&self) -> &[Height] {
        &self.buffers[self.active]
    }

    pub fn height_at(&self, x: usize, y: usize) -> Height {
        self.current()[self.offset(x as isize, y as isize)]
    }

    /// Sum of absolute heights of the current grid.
    pub fn energy(&self) -> u64 {
        self.current()
            .iter()
            .map(|value| value.unsigned_abs() as u64)
            .sum()
    }

    pub fn is_flat(&self) -> bool {
        self.buffers.iter().all(|grid| grid.iter().all(|&v| v == 0))
    }

    /// Clears both grids.
    pub fn reset(&mut self) {
        for grid in &mut self.buffers {
            grid.fill(0);
        }
        self.active = 0;
    }

    pub fn drop(&mut self, x: i32, y: i32, radius: i32) {
        self.drop_with_strength(x, y, radius, 1);
    }

    /// Presses a disc of radius `radius` into the current grid.
    ///
    /// The centre is clamped so the disc fits the grid, then mirrored
    /// horizontally (`x = width - x`) to match the mesh orientation. Each
    /// cell within the radius receives `-sqrt((r² - d²) << 16) / strength`.
    pub fn drop_with_strength(&mut self, x: i32, y: i32, radius: i32, strength: i32) {
        if radius <= 0 {
            return;
        }
        let width = self.width as i32;
        let height = self.height as i32;
        let r = radius;

        let mut x = x;
        let mut y = y;
        if x < r {
            x = r;
        }
        if y < r {
            y = r;
        }
        if x >= width - r {
            x = width - r - 1;
        }
        if y >= height - r {
            y = height - r - 1;
        }

        let x = width - x;

        let sqr = i64::from(r) * i64::from(r);
        let invs = 1.0f32 / strength.max(1) as f32;

        for h in 0..r {
            let sqv = i64::from(h) * i64::from(h);
            for w in 0..r {
                let squ = i64::from(w) * i64::from(w);
                if squ + sqv >= sqr {
                    continue;
                }
                let depth = (((sqr - (squ + sqv)) << HEIGHT_SHIFT) as f32).sqrt();
                let value = (-depth * invs) as Height;
                self.write_interior(x + w, y - h, value);
                self.write_interior(x + w, y + h, value);
                self.write_interior(x - w, y - h, value);
                self.write_interior(x - w, y + h, value);
            }
        }
    }

    fn write_interior(&mut self, x: i32, y: i32, value: Height) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let index = self.offset(x as isize, y as isize);
        self.buffers[self.active][index] = value;
    }

    /// Advances the wave equation by one step and swaps the grids.
    ///
    /// `next = ((n + s + w + e) >> 1) - next`, then damped by `next >> DAMP`.
    /// The grid that held the previous-previous state is overwritten in place.
    pub fn update(&mut self) {
        let stride = self.stride();
        let (width, height) = (self.width, self.height);
        let (first, second) = self.buffers.split_at_mut(1);
        let (current, next) = if self.active == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        };

        for y in 0..height {
            let row = (y + 1) * stride + 1;
            for x in 0..width {
                let c = row + x;
                let droplet = ((current[c - stride] + current[c + stride] + current[c - 1]
                    + current[c + 1])
                    >> 1)
                    - next[c];
                next[c] = droplet - (droplet >> DAMP);
            }
        }

        self.active = 1 - self.active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interior(map: &RippleMap) -> Vec<Height> {
        let mut cells = Vec::with_capacity(map.width() * map.height());
        for y in 0..map.height() {
            for x in 0..map.width() {
                cells.push(map.height_at(x, y));
            }
        }
        cells
    }

    #[test]
    fn single_cell_drop_on_small_grid() {
        let mut map = RippleMap::new(4, 4);
        map.drop(2, 2, 1);

        // x = 4 - 2 after mirroring.
        assert_eq!(map.height_at(2, 2), -256);
        for (x, y) in [(0, 0), (3, 0), (0, 3), (3, 3), (1, 2), (3, 2), (2, 1), (2, 3)] {
            assert_eq!(map.height_at(x, y), 0, "cell ({x}, {y}) should stay flat");
        }
        assert_eq!(interior(&map).iter().filter(|&&v| v != 0).count(), 1);
    }

    #[test]
    fn wide_drop_keeps_full_depth() {
        let mut map = RippleMap::new(402, 402);
        map.drop(201, 201, 200);
        assert_eq!(map.height_at(201, 201), -200 * 256);
        assert!(map.height_at(201, 201 - 199) < 0);
        assert_eq!(map.height_at(201, 0), 0);
    }

    #[test]
    fn radius_two_writes_exact_neighbour_depths() {
        let mut map = RippleMap::new(16, 16);
        map.drop(8, 8, 2);
        let (cx, cy) = (8, 8);

        assert_eq!(map.height_at(cx, cy), -512);
        let axis = -((3 << HEIGHT_SHIFT) as f32).sqrt() as i32;
        assert_eq!(axis, -443);
        for (x, y) in [(cx - 1, cy), (cx + 1, cy), (cx, cy - 1), (cx, cy + 1)] {
            assert_eq!(map.height_at(x, y), axis);
        }
        let diagonal = -((2 << HEIGHT_SHIFT) as f32).sqrt() as i32;
        for (x, y) in [
            (cx - 1, cy - 1),
            (cx + 1, cy - 1),
            (cx - 1, cy + 1),
            (cx + 1, cy + 1),
        ] {
            assert_eq!(map.height_at(x, y), diagonal);
        }
    }

    #[test]
    fn drop_leaves_cells_outside_radius_untouched() {
        let mut map = RippleMap::new(24, 20);
        map.drop(12, 10, 3);
        let cx = 24 - 12;
        let cy = 10;
        for y in 0..map.height() {
            for x in 0..map.width() {
                let dx = x as i32 - cx;
                let dy = y as i32 - cy;
                if dx * dx + dy * dy >= 9 {
                    assert_eq!(map.height_at(x, y), 0, "({x}, {y}) outside the disc");
                } else {
                    assert!(map.height_at(x, y) < 0);
                }
            }
        }
    }

    #[test]
    fn drop_is_symmetric_across_quadrants() {
        let mut map = RippleMap::new(32, 32);
        map.drop(15, 17, 5);
        let cx = 32 - 15;
        let cy = 17;
        for dy in 0..5i32 {
            for dx in 0..5i32 {
                if dx * dx + dy * dy >= 25 {
                    continue;
                }
                let expected = map.height_at((cx + dx) as usize, (cy + dy) as usize);
                for (sx, sy) in [(-1, -1), (-1, 1), (1, -1)] {
                    let x = (cx + sx * dx) as usize;
                    let y = (cy + sy * dy) as usize;
                    assert_eq!(map.height_at(x, y), expected);
                }
            }
        }
    }

    #[test]
    fn drop_clamps_centre_into_grid() {
        let mut map = RippleMap::new(10, 10);
        map.drop(-50, 500, 2);
        // x clamps to 2 then mirrors to 8, y clamps to 10 - 2 - 1.
        assert_eq!(map.height_at(8, 7), -512);
        assert!(map.current()[..map.stride()].iter().all(|&v| v == 0));
    }

    #[test]
    fn strength_divides_depth() {
        let mut map = RippleMap::new(16, 16);
        map.drop_with_strength(8, 8, 2, 4);
        assert_eq!(map.height_at(8, 8), -128);
    }

    #[test]
    fn flat_field_is_a_fixed_point() {
        let mut map = RippleMap::new(12, 9);
        for _ in 0..10 {
            map.update();
        }
        assert!(map.is_flat());
    }

    #[test]
    fn update_swaps_active_grid() {
        let mut map = RippleMap::new(8, 8);
        assert_eq!(map.active_index(), 0);
        map.update();
        assert_eq!(map.active_index(), 1);
        map.update();
        assert_eq!(map.active_index(), 0);
    }

    #[test]
    fn update_spreads_impulse_to_neighbours() {
        let mut map = RippleMap::new(8, 8);
        map.drop(4, 4, 1);
        map.update();
        // (-256 >> 1) = -128, damped: -128 - (-16) = -112.
        assert_eq!(map.height_at(3, 4), -112);
        assert_eq!(map.height_at(5, 4), -112);
        assert_eq!(map.height_at(4, 3), -112);
        assert_eq!(map.height_at(4, 5), -112);
        assert_eq!(map.height_at(4, 4), 0);
    }

    #[test]
    fn impulse_energy_decays() {
        let mut map = RippleMap::new(24, 24);
        map.drop(12, 12, 4);
        let initial = map.energy();
        assert!(initial > 20_000);

        let mut early_peak = initial;
        for _ in 0..100 {
            map.update();
            early_peak = early_peak.max(map.energy());
        }
        for _ in 100..200 {
            map.update();
        }
        let mut late_peak = 0;
        for _ in 200..300 {
            map.update();
            late_peak = late_peak.max(map.energy());
        }

        assert!(late_peak < early_peak);
        assert!(late_peak < initial / 4, "late {late_peak} initial {initial}");
    }

    #[test]
    fn halo_is_never_written() {
        let mut map = RippleMap::new(10, 10);
        map.drop(5, 5, 3);
        for _ in 0..25 {
            map.update();
        }
        let stride = map.stride();
        let grid = map.current();
        for x in 0..stride {
            assert_eq!(grid[x], 0);
            assert_eq!(grid[(map.height() + 1) * stride + x], 0);
        }
        for y in 0..map.height() + 2 {
            assert_eq!(grid[y * stride], 0);
            assert_eq!(grid[y * stride + stride - 1], 0);
        }
    }

    #[test]
    fn reset_clears_state() {
        let mut map = RippleMap::new(8, 8);
        map.drop(4, 4, 2);
        map.update();
        map.reset();
        assert!(map.is_flat());
        assert_eq!(map.active_index(), 0);
    }
}
