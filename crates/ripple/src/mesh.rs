use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::heightfield::RippleMap;
use crate::refraction::{RefractionTable, MAX_DELTA};

/// The higher, the flatter the rendered ripples.
pub const RIPPLE_HEIGHT: f32 = 10.0;

/// Interleaved vertex layout uploaded to the host as-is.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct MeshVertex {
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub position: [f32; 3],
}

/// Regular grid mesh matching the ripple map cell for cell.
///
/// Vertices are row major; rows grow upward (+y) and columns grow rightward
/// (+x) across a `gl_width × gl_height` rectangle centred on the origin. The
/// heightmap is stored rotated by 180° relative to the mesh: cell `(c, r)`
/// drives vertex `(width - 1 - c, height - 1 - r)`.
#[derive(Debug, Clone)]
pub struct WaterMesh {
    width: usize,
    height: usize,
    vertices: Vec<MeshVertex>,
}

impl WaterMesh {
    pub fn new(width: usize, height: usize, gl_width: f32, gl_height: f32) -> Self {
        let step_x = gl_width / (width.max(2) - 1) as f32;
        let step_y = gl_height / (height.max(2) - 1) as f32;
        let mut vertices = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                vertices.push(MeshVertex {
                    normal: [0.0, 0.0, -1.0],
                    uv: [
                        (width - col) as f32 / width as f32,
                        (height - row) as f32 / height as f32,
                    ],
                    position: [
                        -gl_width * 0.5 + col as f32 * step_x,
                        -gl_height * 0.5 + row as f32 * step_y,
                        0.0,
                    ],
                });
            }
        }
        Self {
            width,
            height,
            vertices,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    /// Raw bytes ready for a vertex buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn vertex(&self, col: usize, row: usize) -> &MeshVertex {
        &self.vertices[row * self.width + col]
    }

    /// Refracts texture coordinates through the current wave heights and
    /// lifts each vertex by its vertical height delta.
    pub fn generate_ripples(&mut self, map: &RippleMap, table: &RefractionTable) {
        debug_assert_eq!(map.width(), self.width);
        debug_assert_eq!(map.height(), self.height);

        let width = self.width as i32;
        let height = self.height as i32;
        let stride = map.stride();
        let current = map.current();

        let fw = 1.0 / width as f32;
        let fh = 1.0 / height as f32;
        let fy = (1.0 / MAX_DELTA as f32) * (1.0 / RIPPLE_HEIGHT);

        for r in 0..self.height {
            let vr = self.height - 1 - r;
            let row = map.offset(0, r as isize);
            for c in 0..self.width {
                let vc = self.width - 1 - c;
                let cell = row + c;
                let wave = current[cell];
                let dx = current[cell + 1] - wave;
                let dy = current[cell + stride] - wave;

                let offset_x = table.refract(dx, wave) >> 16;
                let u = ((width - vc as i32) + offset_x).clamp(0, width - 1);

                let offset_y = table.refract(dy, wave) >> 16;
                let v = ((height - vr as i32) + offset_y).clamp(0, height - 1);

                let vertex = &mut self.vertices[vr * self.width + vc];
                vertex.uv = [u as f32 * fw, v as f32 * fh];
                vertex.position[2] = dy as f32 * fy;
            }
        }
    }

    /// Recomputes per-vertex lighting normals from the current positions.
    ///
    /// Each normal averages `right × below` with `diagonal × below`. The z
    /// component is negated: the grid faces +z while the viewer looks down -z.
    pub fn compute_normals(&mut self) {
        for row in 0..self.height {
            for col in 0..self.width {
                let (right, below, diagonal) = self.edges(col, row);
                let n = right.cross(below).normalize_or_zero() + diagonal.cross(below);
                let n = n.normalize_or_zero();
                self.vertices[row * self.width + col].normal = [n.x, n.y, -n.z];
            }
        }
    }

    fn position(&self, col: usize, row: usize) -> Vec3 {
        Vec3::from(self.vertices[row * self.width + col].position)
    }

    /// Edge vectors toward the next column, next row, and the diagonal
    /// neighbour; on the last column/row the backward difference is used.
    fn edges(&self, col: usize, row: usize) -> (Vec3, Vec3, Vec3) {
        let p = self.position(col, row);
        let right = if col + 1 < self.width {
            self.position(col + 1, row) - p
        } else if col > 0 {
            p - self.position(col - 1, row)
        } else {
            Vec3::X
        };
        let below = if row + 1 < self.height {
            self.position(col, row + 1) - p
        } else if row > 0 {
            p - self.position(col, row - 1)
        } else {
            Vec3::Y
        };
        let diagonal = if col + 1 < self.width && row + 1 < self.height {
            self.position(col + 1, row + 1) - p
        } else {
            right + below
        };
        (right, below, diagonal)
    }

    /// Debug segments from each vertex along its normal.
    pub fn normal_lines(&self, scale: f32) -> impl Iterator<Item = ([f32; 3], [f32; 3])> + '_ {
        self.vertices.iter().map(move |vertex| {
            let from = Vec3::from(vertex.position);
            let to = from + Vec3::from(vertex.normal) * scale;
            (from.to_array(), to.to_array())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_mesh(width: usize, height: usize) -> (WaterMesh, RippleMap, RefractionTable) {
        (
            WaterMesh::new(width, height, 2.0, 3.0),
            RippleMap::new(width, height),
            RefractionTable::default(),
        )
    }

    #[test]
    fn positions_span_gl_rectangle() {
        let mesh = WaterMesh::new(5, 4, 2.0, 3.0);
        assert_eq!(mesh.vertices().len(), 20);
        assert_eq!(mesh.vertex(0, 0).position, [-1.0, -1.5, 0.0]);
        assert_eq!(mesh.vertex(4, 3).position, [1.0, 1.5, 0.0]);
        assert_eq!(mesh.as_bytes().len(), 20 * 32);
    }

    #[test]
    fn flat_surface_keeps_base_texture_coordinates() {
        let (mut mesh, map, table) = flat_mesh(6, 5);
        mesh.generate_ripples(&map, &table);
        for row in 0..5 {
            for col in 0..6 {
                let vertex = mesh.vertex(col, row);
                let u = (6 - col).min(5) as f32 / 6.0;
                let v = (5 - row).min(4) as f32 / 5.0;
                assert!((vertex.uv[0] - u).abs() < 1e-6, "vertex ({col}, {row})");
                assert!((vertex.uv[1] - v).abs() < 1e-6, "vertex ({col}, {row})");
                assert_eq!(vertex.position[2], 0.0);
            }
        }
    }

    #[test]
    fn texture_coordinates_stay_in_bounds_under_waves() {
        let (mut mesh, mut map, table) = flat_mesh(20, 16);
        map.drop(10, 8, 4);
        map.drop(3, 3, 2);
        for _ in 0..6 {
            map.update();
            mesh.generate_ripples(&map, &table);
            for vertex in mesh.vertices() {
                assert!((0.0..1.0).contains(&vertex.uv[0]));
                assert!((0.0..1.0).contains(&vertex.uv[1]));
            }
        }
    }

    #[test]
    fn vertex_depth_follows_vertical_delta() {
        let (mut mesh, mut map, table) = flat_mesh(8, 8);
        map.drop(4, 4, 1);
        mesh.generate_ripples(&map, &table);

        // Cell (4, 3) sits above the -256 impulse at (4, 4).
        let vertex = mesh.vertex(8 - 1 - 4, 8 - 1 - 3);
        let expected = -256.0 / 512.0 / RIPPLE_HEIGHT;
        assert!((vertex.position[2] - expected).abs() < 1e-6);
    }

    #[test]
    fn flat_normals_face_viewer() {
        let (mut mesh, _, _) = flat_mesh(5, 5);
        mesh.compute_normals();
        for vertex in mesh.vertices() {
            let [x, y, z] = vertex.normal;
            assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
            assert!((z + 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn rippled_normals_are_unit_length() {
        let (mut mesh, mut map, table) = flat_mesh(12, 12);
        map.drop(6, 6, 3);
        map.update();
        mesh.generate_ripples(&map, &table);
        mesh.compute_normals();
        for vertex in mesh.vertices() {
            let length = Vec3::from(vertex.normal).length();
            assert!((length - 1.0).abs() < 1e-4, "normal length {length}");
        }
        let tilted = mesh
            .vertices()
            .iter()
            .filter(|v| v.normal[0].abs() > 1e-4 || v.normal[1].abs() > 1e-4)
            .count();
        assert!(tilted > 0);
    }

    #[test]
    fn normal_lines_start_at_vertices() {
        let (mut mesh, _, _) = flat_mesh(3, 3);
        mesh.compute_normals();
        let lines: Vec<_> = mesh.normal_lines(0.1).collect();
        assert_eq!(lines.len(), 9);
        let (from, to) = lines[0];
        assert_eq!(from, mesh.vertex(0, 0).position);
        assert!((to[2] - (from[2] - 0.1)).abs() < 1e-6);
    }
}
