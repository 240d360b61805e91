//! Variable-timestep frame clock.
//!
//! Measures the wall-clock delta once per frame and runs exactly one update
//! followed by one render with it. Long frames are clamped so a stall (window
//! drag, debugger pause) does not fling the camera or the planets.

use std::time::Instant;
use tracing::warn;

/// Maximum frame time handed to the update, in seconds.
pub const MAX_FRAME_TIME: f32 = 0.25;

/// Clamp a measured frame time, logging when it was too long.
pub fn clamp_frame_time(frame_time: f32) -> f32 {
    if frame_time > MAX_FRAME_TIME {
        warn!(
            "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
            frame_time * 1000.0,
            MAX_FRAME_TIME * 1000.0
        );
        MAX_FRAME_TIME
    } else {
        frame_time.max(0.0)
    }
}

/// Wall-clock driven frame clock.
///
/// Call [`tick`](Self::tick) once per presented frame.
pub struct FrameClock {
    previous_time: Instant,
    total_time: f64,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Forget the time spent away, e.g. after the window was suspended.
    pub fn reset(&mut self) {
        self.previous_time = Instant::now();
    }

    /// Measure the elapsed time, then call `update_fn(state, dt)` and
    /// `render_fn(state)` once each.
    pub fn tick<S>(
        &mut self,
        state: &mut S,
        update_fn: impl FnOnce(&mut S, f32),
        render_fn: impl FnOnce(&S),
    ) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f32();
        self.previous_time = now;

        let dt = clamp_frame_time(frame_time);
        update_fn(state, dt);
        self.total_time += f64::from(dt);

        render_fn(state);
        self.frame_count += 1;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of every clamped delta handed to the update.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// A frame clock fed explicit frame times instead of reading the wall clock.
#[cfg(test)]
pub(crate) struct TestableFrameClock {
    pub(crate) total_time: f64,
    pub(crate) frame_count: u64,
}

#[cfg(test)]
impl TestableFrameClock {
    pub(crate) fn new() -> Self {
        Self {
            total_time: 0.0,
            frame_count: 0,
        }
    }

    pub(crate) fn tick<S>(
        &mut self,
        frame_time: f32,
        state: &mut S,
        update_fn: impl FnOnce(&mut S, f32),
        render_fn: impl FnOnce(&S),
    ) {
        let dt = clamp_frame_time(frame_time);
        update_fn(state, dt);
        self.total_time += f64::from(dt);
        render_fn(state);
        self.frame_count += 1;
    }
}
