//! Frame pacing for a display-synchronized loop.
//!
//! The host calls `begin_frame` on every display refresh. Wall-clock time is
//! accumulated until it reaches the frame budget (`1 / fps`); only then does
//! `begin_frame` hand back a step, carrying the *whole* accumulated time so the
//! simulation advances by real elapsed time rather than by the nominal budget.
//! The accumulator is then reset to zero.

use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 30;

pub struct FramePacer {
    fps: u32,
    frame_budget: f64,
    /// Upper bound on the time handed to one step. `None` hands over the full
    /// accumulated time.
    pub max_step: Option<f64>,
    accumulator: f64,
    last_instant: Option<Instant>,
    pub frame_count: u64,
    pub step_count: u64,
    pub last_step_dt: f64,

    step_samples: [f64; FPS_SAMPLE_COUNT],
    step_sample_index: usize,
    pub smoothed_fps: f64,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        let fps = fps.max(1);
        let frame_budget = 1.0 / fps as f64;
        Self {
            fps,
            frame_budget,
            max_step: None,
            accumulator: 0.0,
            last_instant: None,
            frame_count: 0,
            step_count: 0,
            last_step_dt: 0.0,
            step_samples: [frame_budget; FPS_SAMPLE_COUNT],
            step_sample_index: 0,
            smoothed_fps: fps as f64,
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn frame_budget_secs(&self) -> f64 {
        self.frame_budget
    }

    /// Measures wall-clock time since the previous call. The first call only
    /// records the instant.
    pub fn begin_frame(&mut self, now: Instant) -> Option<f64> {
        let real_dt = match self.last_instant {
            Some(before) => now.saturating_duration_since(before).as_secs_f64(),
            None => 0.0,
        };
        self.last_instant = Some(now);
        self.advance(real_dt)
    }

    /// Adds `real_dt` seconds. Returns the elapsed time to simulate once the
    /// budget is reached, `None` otherwise.
    pub fn advance(&mut self, real_dt: f64) -> Option<f64> {
        self.frame_count += 1;
        self.accumulator += real_dt.max(0.0);
        if self.accumulator < self.frame_budget {
            return None;
        }

        let mut step = self.accumulator;
        self.accumulator = 0.0;
        if let Some(max_step) = self.max_step.filter(|&max| step > max) {
            log::warn!(
                "Frame took {:.1}ms, capping step to {:.0}ms",
                step * 1000.0,
                max_step * 1000.0
            );
            step = max_step;
        }

        self.step_count += 1;
        self.last_step_dt = step;
        self.step_samples[self.step_sample_index] = step;
        self.step_sample_index = (self.step_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg = self.step_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_fps = if avg > 0.0 { 1.0 / avg } else { 0.0 };
        Some(step)
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(30)
    }
}
