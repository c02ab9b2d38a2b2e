//! Water ripples under drifting leaves.
//!
//! Each frame the scene advances a damped wave simulation, bends the riverbed
//! texture coordinates through the rippled surface, and emits commands to
//! draw the riverbed, a scrolling sky reflection, a specular pass and the leaf
//! sprites. Leaves that land on the water drop a ripple of their own.

mod heightfield;
mod leaf;
mod mesh;
mod refraction;
mod scene;
mod sky;

pub use heightfield::{Height, RippleMap, DAMP, HEIGHT_SHIFT};
pub use leaf::{Leaf, SurfaceGeometry, FALL_RATE, LEAF_SIZE, LEAF_TEXTURE_COUNT};
pub use mesh::{MeshVertex, WaterMesh, RIPPLE_HEIGHT};
pub use refraction::{RefractionTable, MAX_DELTA, REFRACTION_INDEX};
pub use scene::{
    FallScene, FallStats, FRAGMENT_BACKGROUND, FRAGMENT_LIGHTING, FRAGMENT_SKY, STORE_BACKGROUND,
    STORE_LEAF, TEXTURE_LEAVES, TEXTURE_RIVERBED, TEXTURE_SKY, VERTEX_LIGHT, VERTEX_SKY,
    WATER_MESH,
};
pub use sky::SkyScroll;
