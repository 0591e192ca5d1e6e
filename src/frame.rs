//! Frame driver
//!
//! Turns timestamps into clamped, time-scaled deltas and feeds them to the
//! simulation. The host decides where timestamps come from: an animation
//! callback, a wall clock, or [`FixedRateSource`] for headless runs.

use crate::consts::MAX_FRAME_DT;
use crate::mix;
use crate::sim::{MatchSnapshot, MatchState, step};

/// Weight of the newest sample in the smoothed FPS
const FPS_SMOOTHING: f32 = 0.12;

/// Delta/FPS tracker fed with millisecond timestamps
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    last_ms: Option<f64>,
    fps: f32,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now_ms`. Returns `(dt, fps)` with `dt` in seconds,
    /// clamped to `[0, MAX_FRAME_DT]`. The first frame has `dt == 0`.
    pub fn sample(&mut self, now_ms: f64) -> (f32, f32) {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return (0.0, self.fps);
        };

        let raw = ((now_ms - last) / 1000.0) as f32;
        if raw > 0.0 {
            let instant = 1.0 / raw;
            self.fps = if self.fps == 0.0 {
                instant
            } else {
                mix(self.fps, instant, FPS_SMOOTHING)
            };
        }

        let dt = if raw.is_finite() {
            raw.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        (dt, self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Supplier of frame timestamps in milliseconds
pub trait FrameSource {
    /// Next timestamp, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Option<f64>;
}

/// Evenly spaced timestamps for a fixed number of frames
#[derive(Debug, Clone)]
pub struct FixedRateSource {
    interval_ms: f64,
    remaining: u64,
    now: f64,
}

impl FixedRateSource {
    pub fn new(hz: f64, frames: u64) -> Self {
        Self {
            interval_ms: if hz > 0.0 { 1000.0 / hz } else { 0.0 },
            remaining: frames,
            now: 0.0,
        }
    }

    /// Enough frames at `hz` to cover `seconds`
    pub fn for_duration(hz: f64, seconds: f64) -> Self {
        Self::new(hz, (hz * seconds).ceil().max(0.0) as u64)
    }
}

impl FrameSource for FixedRateSource {
    fn next_frame(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let now = self.now;
        self.now += self.interval_ms;
        Some(now)
    }
}

/// What one frame did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Simulated seconds after clamping and time scaling
    pub dt: f32,
    pub fps: f32,
}

/// Drives a match from a timestamp stream
#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    meter: FpsMeter,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fps(&self) -> f32 {
        self.meter.fps()
    }

    /// Advance `state` for a frame stamped `now_ms`
    pub fn advance(&mut self, state: &mut MatchState, now_ms: f64) -> FrameReport {
        let (dt, fps) = self.meter.sample(now_ms);
        let dt = dt * state.time_scale();
        step(state, dt);
        FrameReport { dt, fps }
    }

    /// Run until the source is exhausted, handing every frame's snapshot and
    /// FPS to `present`. Returns the number of frames driven.
    pub fn run<S, F>(&mut self, state: &mut MatchState, source: &mut S, mut present: F) -> u64
    where
        S: FrameSource + ?Sized,
        F: FnMut(&MatchSnapshot, f32),
    {
        let mut frames = 0;
        while let Some(now) = source.next_frame() {
            let report = self.advance(state, now);
            present(&state.snapshot(), report.fps);
            frames += 1;
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_first_sample_has_zero_dt() {
        let mut meter = FpsMeter::new();
        assert_eq!(meter.sample(1234.0), (0.0, 0.0));
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut meter = FpsMeter::new();
        meter.sample(0.0);
        let (dt, _) = meter.sample(500.0);
        assert_eq!(dt, MAX_FRAME_DT);

        // Clock going backwards yields no time
        let (dt, _) = meter.sample(400.0);
        assert_eq!(dt, 0.0);
    }

    #[test]
    fn test_fps_smoothing() {
        let mut meter = FpsMeter::new();
        meter.sample(0.0);
        let (_, fps) = meter.sample(1000.0 / 60.0);
        assert!((fps - 60.0).abs() < 0.01);

        let (_, fps) = meter.sample(1000.0 / 60.0 + 1000.0 / 30.0);
        assert!((fps - mix(60.0, 30.0, FPS_SMOOTHING)).abs() < 0.01);
    }

    #[test]
    fn test_fixed_rate_source() {
        let mut source = FixedRateSource::new(50.0, 3);
        assert_eq!(source.next_frame(), Some(0.0));
        assert_eq!(source.next_frame(), Some(20.0));
        assert_eq!(source.next_frame(), Some(40.0));
        assert_eq!(source.next_frame(), None);

        let source = FixedRateSource::for_duration(60.0, 2.0);
        assert_eq!(source.remaining, 120);
    }

    #[test]
    fn test_advance_scales_by_time_scale() {
        let mut state = MatchState::new(Settings::default(), 4).unwrap();
        let mut driver = FrameDriver::new();
        driver.advance(&mut state, 0.0);

        let report = driver.advance(&mut state, 20.0);
        assert!((report.dt - 0.02).abs() < 1e-6);

        state.toggle_slow_motion();
        let report = driver.advance(&mut state, 40.0);
        assert!((report.dt - 0.02 * 0.35).abs() < 1e-6);

        state.toggle_pause();
        let time = state.simulation_time;
        let report = driver.advance(&mut state, 60.0);
        assert_eq!(report.dt, 0.0);
        assert_eq!(state.simulation_time, time);
    }

    #[test]
    fn test_run_drives_every_frame() {
        let mut state = MatchState::new(Settings::default(), 5).unwrap();
        let mut driver = FrameDriver::new();
        let mut source = FixedRateSource::new(60.0, 61);
        let mut seen = 0;

        let frames = driver.run(&mut state, &mut source, |snapshot, _fps| {
            seen += 1;
            assert!(snapshot.simulation_time >= 0.0);
        });

        assert_eq!(frames, 61);
        assert_eq!(seen, 61);
        assert!(state.simulation_time > 0.9 || state.game_over());
        assert!((driver.fps() - 60.0).abs() < 0.5);
    }
}
