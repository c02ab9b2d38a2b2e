//! Host-facing surface shared by the livewall effects.
//!
//! An effect is a state struct that the host steps once per display frame.
//! Each step returns an ordered list of draw commands instead of touching a
//! GPU directly, which keeps the simulations testable without a device:
//!
//! ```text
//!   host frame callback
//!          │ TimeSample
//!          ▼
//!   Effect::step ──▶ simulation update ──▶ RenderCommands ──▶ host renderer
//!                                             │
//!                                             └─▶ keep_running flag
//! ```
//!
//! Resources (meshes, textures, programs) are referred to by name through
//! `ResourceId`; the host owns the actual objects.

mod commands;
mod runtime;

pub use commands::{DrawCommand, Lighting, ProgramStage, QuadVertex, RenderCommands, ResourceId};
pub use runtime::{BoxedTimeSource, FixedStepTimeSource, SystemTimeSource, TimeSample, TimeSource};

use serde::Serialize;

/// A per-frame visual effect driven by the host render loop.
pub trait Effect {
    /// Short, stable name used in logs and summaries.
    fn name(&self) -> &'static str;

    /// Advances the simulation by one frame and describes what to draw.
    fn step(&mut self, sample: TimeSample) -> RenderCommands;
}

/// Surface dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height over width; portrait phones report values above one.
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
