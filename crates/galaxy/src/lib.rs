//! Rotating starfield.
//!
//! Stars are scattered once around the galactic centre with a half-normal
//! radial spread, then orbit on twisted, vertically squashed ellipses. Every
//! frame rebuilds the particle vertex buffer and draws it between a space
//! backdrop and a light flare, shifted horizontally by the launcher scroll.

mod buffer;
mod camera;
mod distribution;
mod scene;
mod star;

pub use buffer::{ParticleBuffer, ParticleVertex, PointSprite};
pub use camera::{CameraSweep, SWEEP_DECAY, SWEEP_EPSILON, SWEEP_START_ANGLE, SWEEP_START_DISTANCE};
pub use distribution::{
    lerp, random_gauss, GalaxyShape, DISTANCE_JITTER, ELLIPSE_RATIO, ELLIPSE_TWIST, INNER_BAND,
    INNER_SPEEDUP,
};
pub use scene::{
    GalaxyScene, FRAGMENT_BACKGROUND, FRAGMENT_LIGHTING, PARTICLES_MESH, STORE_BACKGROUND,
    STORE_LIGHTS, TEXTURE_FLARES, TEXTURE_LIGHT, TEXTURE_SPACE, VERTEX_BACKGROUND,
};
pub use star::Star;
