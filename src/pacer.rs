// Frame pacer - Poll and render cadence
//
// Host events are polled at a fixed interval. Frames are rendered at the
// same interval while the window is focused and much less often when it is
// in the background. The event loop sleeps until `next_deadline` instead of
// spinning.

use std::time::{Duration, Instant};

/// Default host event poll interval
pub const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Default frame interval while focused (about 60 Hz)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Default frame interval in the background (10 Hz)
pub const BACKGROUND_INTERVAL: Duration = Duration::from_millis(100);

/// Pacing intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingIntervals {
    pub poll: Duration,
    pub frame: Duration,
    pub background: Duration,
}

impl Default for PacingIntervals {
    fn default() -> Self {
        Self {
            poll: POLL_INTERVAL,
            frame: FRAME_INTERVAL,
            background: BACKGROUND_INTERVAL,
        }
    }
}

/// Tracks when the next poll and the next frame are due
#[derive(Debug, Clone)]
pub struct FramePacer {
    intervals: PacingIntervals,
    last_poll: Option<Instant>,
    last_render: Option<Instant>,
    focused: bool,
    background: bool,
}

impl FramePacer {
    pub fn new(intervals: PacingIntervals) -> Self {
        Self {
            intervals,
            last_poll: None,
            last_render: None,
            focused: true,
            background: false,
        }
    }

    pub fn intervals(&self) -> PacingIntervals {
        self.intervals
    }

    /// Interval between frames in the current focus state
    pub fn frame_interval(&self) -> Duration {
        if self.focused && !self.background {
            self.intervals.frame
        } else {
            self.intervals.background
        }
    }

    fn due(last: Option<Instant>, interval: Duration, now: Instant) -> bool {
        match last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= interval,
        }
    }

    pub fn poll_due(&self, now: Instant) -> bool {
        Self::due(self.last_poll, self.intervals.poll, now)
    }

    pub fn mark_polled(&mut self, now: Instant) {
        self.last_poll = Some(now);
    }

    pub fn frame_due(&self, now: Instant) -> bool {
        Self::due(self.last_render, self.frame_interval(), now)
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_render = Some(now);
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Hidden or minimized windows render at the background rate
    pub fn set_background(&mut self, background: bool) {
        self.background = background;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_background(&self) -> bool {
        self.background || !self.focused
    }

    /// Earliest instant at which either a poll or a frame is due
    pub fn next_deadline(&self, now: Instant) -> Instant {
        let poll = self.last_poll.map_or(now, |t| t + self.intervals.poll);
        let frame = self.last_render.map_or(now, |t| t + self.frame_interval());
        poll.min(frame).max(now)
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(PacingIntervals::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_poll_and_frame_due_immediately() {
        let pacer = FramePacer::default();
        let now = Instant::now();
        assert!(pacer.poll_due(now));
        assert!(pacer.frame_due(now));
        assert_eq!(pacer.next_deadline(now), now);
    }

    #[test]
    fn test_focused_frame_cadence() {
        let mut pacer = FramePacer::default();
        let start = Instant::now();
        pacer.mark_rendered(start);

        assert!(!pacer.frame_due(start + Duration::from_millis(10)));
        assert!(pacer.frame_due(start + Duration::from_millis(16)));
    }

    #[test]
    fn test_background_frame_cadence() {
        let mut pacer = FramePacer::default();
        pacer.set_focus(false);
        let start = Instant::now();
        pacer.mark_rendered(start);

        assert!(!pacer.frame_due(start + Duration::from_millis(50)));
        assert!(pacer.frame_due(start + Duration::from_millis(100)));
        assert!(pacer.is_background());
    }

    #[test]
    fn test_hidden_window_uses_background_rate() {
        let mut pacer = FramePacer::default();
        pacer.set_background(true);
        assert_eq!(pacer.frame_interval(), BACKGROUND_INTERVAL);
        pacer.set_background(false);
        assert_eq!(pacer.frame_interval(), FRAME_INTERVAL);
    }

    #[test]
    fn test_poll_continues_in_background() {
        let mut pacer = FramePacer::default();
        pacer.set_focus(false);
        let start = Instant::now();
        pacer.mark_polled(start);
        pacer.mark_rendered(start);

        // Polling keeps its own cadence even when frames slow down
        assert_eq!(pacer.next_deadline(start), start + POLL_INTERVAL);
        assert!(pacer.poll_due(start + POLL_INTERVAL));
        assert!(!pacer.frame_due(start + POLL_INTERVAL));
    }
}
