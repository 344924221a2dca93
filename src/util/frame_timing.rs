use web_time::{Duration, Instant};

/// Frame pacing: an optional FPS cap, the last frame's delta and a smoothed
/// FPS for display.
pub struct FrameTiming {
    /// Minimum frame duration (zero when uncapped).
    min_frame_duration: Duration,
    last_frame: Instant,
    /// Seconds between the two most recent frames.
    last_delta: f32,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Weight of the newest sample in the average.
    smoothing: f32,
}

impl FrameTiming {
    /// Create a new frame timer with the given FPS cap (0 = uncapped).
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let min_frame_duration = if target_fps > 0 {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        } else {
            Duration::ZERO
        };

        Self {
            min_frame_duration,
            last_frame: Instant::now(),
            last_delta: 0.0,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Whether enough time has passed since the last frame to render again.
    pub fn should_render(&self) -> bool {
        self.last_frame.elapsed() >= self.min_frame_duration
    }

    /// Seconds elapsed since the last [`end_frame`](Self::end_frame).
    pub fn elapsed(&self) -> f32 {
        self.last_frame.elapsed().as_secs_f32()
    }

    /// Mark a frame as finished and return its duration in seconds.
    pub fn end_frame(&mut self) -> f32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(frame_time);
        frame_time
    }

    fn record(&mut self, frame_time: f32) {
        self.last_delta = frame_time;
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
    }

    /// Duration of the most recent frame in seconds.
    pub fn last_delta(&self) -> f32 {
        self.last_delta
    }

    /// Get the current FPS (smoothed)
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_timer_always_renders() {
        assert!(FrameTiming::new(0).should_render());
    }

    #[test]
    fn capped_timer_waits_for_the_frame_budget() {
        let timing = FrameTiming::new(1);
        assert!(!timing.should_render());
    }

    #[test]
    fn fps_moves_towards_the_measured_rate() {
        let mut timing = FrameTiming::new(0);
        for _ in 0..200 {
            timing.record(1.0 / 30.0);
        }
        assert!((timing.fps() - 30.0).abs() < 1.0);
        assert!((timing.last_delta() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn zero_length_frame_keeps_fps() {
        let mut timing = FrameTiming::new(0);
        timing.record(0.0);
        assert_eq!(timing.fps(), 60.0);
    }
}
