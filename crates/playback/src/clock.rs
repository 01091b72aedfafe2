use std::time::{Duration, Instant};

/// Converts wall-clock instants and play/pause transitions into shader time.
///
/// Shader time is the value written into the `iTime` uniform. While playing
/// it equals `accumulated + (now - origin)`; while paused it is frozen at the
/// value observed when the pause happened, and every redraw (a resize, an
/// expose event) reuses that frozen value. Resuming rebases the origin so the
/// stream continues where it stopped instead of jumping over the gap.
#[derive(Clone, Copy, Debug)]
pub struct RenderClock {
    /// Wall-clock origin of the current play segment.
    origin: Instant,
    /// Shader time already on the clock when the current segment started.
    accumulated: Duration,
    /// Most recent shader time handed to a frame; the frozen value while paused.
    last_observed: Duration,
}

impl RenderClock {
    /// Starts a clock at shader time zero.
    pub fn started(now: Instant) -> Self {
        Self {
            origin: now,
            accumulated: Duration::ZERO,
            last_observed: Duration::ZERO,
        }
    }

    /// Produces the shader time for a frame rendered at `now`.
    pub fn sample(&mut self, now: Instant) -> f32 {
        let elapsed = self.accumulated + now.saturating_duration_since(self.origin);
        self.last_observed = elapsed;
        elapsed.as_secs_f32()
    }

    /// Freezes the clock at the shader time of the pause instant.
    pub fn pause(&mut self, now: Instant) {
        self.last_observed = self.accumulated + now.saturating_duration_since(self.origin);
    }

    /// Continues from the frozen value, rebasing the wall-clock origin.
    pub fn resume(&mut self, now: Instant) {
        self.accumulated = self.last_observed;
        self.origin = now;
    }

    /// The frozen shader time; valid whenever no play segment is running.
    pub fn frozen_seconds(&self) -> f32 {
        self.last_observed.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_tracks_wall_clock() {
        let start = Instant::now();
        let mut clock = RenderClock::started(start);
        assert_eq!(clock.sample(start), 0.0);
        let later = clock.sample(start + Duration::from_millis(2500));
        assert!((later - 2.5).abs() < 1e-6);
    }

    #[test]
    fn sample_is_non_decreasing() {
        let start = Instant::now();
        let mut clock = RenderClock::started(start);
        let mut last = 0.0;
        for step in 0..10 {
            let sample = clock.sample(start + Duration::from_millis(step * 16));
            assert!(sample >= last);
            last = sample;
        }
    }

    #[test]
    fn pause_freezes_at_transition_instant() {
        let start = Instant::now();
        let mut clock = RenderClock::started(start);
        clock.pause(start + Duration::from_millis(2500));
        assert!((clock.frozen_seconds() - 2.5).abs() < 1e-6);
        // Frozen value is stable no matter how much wall time passes.
        assert!((clock.frozen_seconds() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn resume_continues_without_jump() {
        let start = Instant::now();
        let mut clock = RenderClock::started(start);
        clock.pause(start + Duration::from_millis(2500));
        // Three seconds of wall time elapse while paused.
        let resumed_at = start + Duration::from_millis(5500);
        clock.resume(resumed_at);
        let next = clock.sample(resumed_at + Duration::from_millis(16));
        assert!((next - 2.516).abs() < 1e-3, "time jumped to {next}");
    }
}
