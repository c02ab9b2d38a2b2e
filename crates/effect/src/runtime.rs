//! Frame clocks for driving effects.
//!
//! An effect never reads the time itself; the host samples one of these
//! clocks once per frame and passes the result to `Effect::step`.

use std::time::{Duration, Instant};

/// Time and frame number for one `Effect::step` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Seconds since the clock was last reset.
    pub seconds: f32,
    /// Zero-based index of the frame being stepped.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Produces one `TimeSample` per frame.
pub trait TimeSource: Send {
    /// Rewinds to frame zero.
    fn reset(&mut self);
    /// Returns the sample for the next frame and advances the frame count.
    fn sample(&mut self) -> TimeSample;
}

/// Wall clock for interactive runs; `seconds` is real elapsed time, so
/// frame pacing depends on how long the host sleeps between steps.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    started: Instant,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.started.elapsed().as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Deterministic clock that advances by a fixed interval per sample.
///
/// Headless runs use this so a given seed always produces the same frames.
#[derive(Debug, Clone, Copy)]
pub struct FixedStepTimeSource {
    interval: Duration,
    frame: u64,
}

impl FixedStepTimeSource {
    pub fn new(interval: Duration) -> Self {
        Self { interval, frame: 0 }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl TimeSource for FixedStepTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let seconds = self.interval.as_secs_f64() * self.frame as f64;
        let sample = TimeSample::new(seconds as f32, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Clock chosen at runtime by the host.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;
