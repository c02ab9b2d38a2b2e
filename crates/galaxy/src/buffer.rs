use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use wallconfig::ParticleLayout;

use crate::star::Star;

/// Triangle-variant vertex: packed colour, position, texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ParticleVertex {
    pub color: u32,
    pub x: f32,
    pub y: f32,
    pub s: f32,
    pub t: f32,
}

/// Point-variant vertex; `size` is the sprite diameter in pixels.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PointSprite {
    pub color: u32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Texture coordinates of the lower left, lower right and top vertex.
const TRIANGLE_UV: [[f32; 2]; 3] = [[0.0, 1.0], [1.0, 1.0], [0.5, 0.0]];

/// Per-frame vertex data for every star, in one of the two layouts.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleBuffer {
    Triangles(Vec<ParticleVertex>),
    Points(Vec<PointSprite>),
}

impl ParticleBuffer {
    /// Allocates the buffer for `stars` with colours and texture
    /// coordinates filled in; positions are written by [`Self::write`].
    pub fn new(layout: ParticleLayout, stars: &[Star]) -> Self {
        match layout {
            ParticleLayout::Triangles => Self::Triangles(
                stars
                    .iter()
                    .flat_map(|star| {
                        let color = star.packed_color();
                        TRIANGLE_UV.map(|[s, t]| ParticleVertex {
                            color,
                            s,
                            t,
                            ..ParticleVertex::default()
                        })
                    })
                    .collect(),
            ),
            ParticleLayout::Points => Self::Points(
                stars
                    .iter()
                    .map(|star| PointSprite {
                        color: star.packed_color(),
                        size: star.radius * 2.0,
                        ..PointSprite::default()
                    })
                    .collect(),
            ),
        }
    }

    pub fn layout(&self) -> ParticleLayout {
        match self {
            Self::Triangles(_) => ParticleLayout::Triangles,
            Self::Points(_) => ParticleLayout::Points,
        }
    }

    /// Positions the particle of star `index` centred on `center`.
    pub fn write(&mut self, index: usize, center: Vec2, radius: f32) {
        match self {
            Self::Triangles(vertices) => {
                let base = index * 3;
                let corners = [
                    (center.x - radius, center.y + radius),
                    (center.x + radius, center.y + radius),
                    (center.x, center.y - radius),
                ];
                for (vertex, (x, y)) in vertices[base..base + 3].iter_mut().zip(corners) {
                    vertex.x = x;
                    vertex.y = y;
                }
            }
            Self::Points(sprites) => {
                let sprite = &mut sprites[index];
                sprite.x = center.x;
                sprite.y = center.y;
            }
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Triangles(vertices) => vertices.len(),
            Self::Points(sprites) => sprites.len(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Triangles(vertices) => bytemuck::cast_slice(vertices),
            Self::Points(sprites) => bytemuck::cast_slice(sprites),
        }
    }
}
