//! Canonical countdown record shared by every viewer.

use crate::state::clock::EpochMs;

/// Authoritative countdown configuration plus the optional prank-freeze sub-state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerState {
    /// True while a countdown is active and not expired.
    pub running: bool,
    /// Duration configured by the last start.
    pub start_seconds: u32,
    /// Instant the countdown reaches zero, absent freezing.
    pub end_at_epoch_ms: Option<EpochMs>,
    /// True while the displayed remaining time is frozen.
    pub pranking: bool,
    /// Instant the current freeze ends.
    pub prank_end_epoch_ms: Option<EpochMs>,
    /// Remaining time displayed while frozen.
    pub freeze_seconds: Option<u32>,
    /// Latch so the threshold prank fires at most once per run.
    pub prank_fired_auto: bool,
    /// Set when the run ended by reaching zero rather than by a stop.
    pub(crate) expired: bool,
}

impl TimerState {
    /// Initial, empty timer: nothing configured and nothing running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining whole seconds as viewers should display them at `now`.
    pub fn remaining_seconds(&self, now: EpochMs) -> u32 {
        if !self.running {
            return if self.expired { 0 } else { self.start_seconds };
        }

        if self.pranking {
            return self.freeze_seconds.unwrap_or(0);
        }

        match self.end_at_epoch_ms {
            Some(end) => ceil_seconds(end - now),
            None => 0,
        }
    }

    /// Begin a fresh run of `seconds` ending relative to `now`.
    pub(crate) fn begin_run(&mut self, seconds: u32, now: EpochMs) {
        *self = Self {
            running: true,
            start_seconds: seconds,
            end_at_epoch_ms: Some(now + i64::from(seconds) * 1_000),
            ..Self::default()
        };
    }

    /// Halt the run in place, keeping its configuration.
    pub(crate) fn halt(&mut self) {
        self.running = false;
        self.expired = false;
        self.clear_freeze();
    }

    /// Freeze the display at `display_seconds` until `until`.
    pub(crate) fn freeze(&mut self, display_seconds: u32, until: EpochMs) {
        self.pranking = true;
        self.prank_end_epoch_ms = Some(until);
        self.freeze_seconds = Some(display_seconds);
    }

    /// Drop every prank field.
    pub(crate) fn clear_freeze(&mut self) {
        self.pranking = false;
        self.prank_end_epoch_ms = None;
        self.freeze_seconds = None;
    }

    /// Check the structural invariants that must hold between transitions.
    pub fn is_consistent(&self) -> bool {
        let freeze_complete =
            !self.pranking || (self.prank_end_epoch_ms.is_some() && self.freeze_seconds.is_some());
        let freeze_only_while_running = self.running || !self.pranking;
        let running_has_end = !self.running || self.end_at_epoch_ms.is_some();
        freeze_complete && freeze_only_while_running && running_has_end
    }
}

/// Whole seconds left in `delta_ms`, rounded up and clamped at zero.
fn ceil_seconds(delta_ms: i64) -> u32 {
    if delta_ms <= 0 {
        return 0;
    }
    u32::try_from((delta_ms + 999) / 1_000).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: EpochMs = 1_700_000_000_000;

    #[test]
    fn initial_state_reports_zero() {
        let state = TimerState::new();
        assert!(!state.running);
        assert_eq!(state.end_at_epoch_ms, None);
        assert_eq!(state.remaining_seconds(NOW), 0);
        assert!(state.is_consistent());
    }

    #[test]
    fn stopped_timer_reports_configured_duration() {
        let mut state = TimerState::new();
        state.begin_run(90, NOW);
        state.halt();
        assert_eq!(state.remaining_seconds(NOW + 30_000), 90);
    }

    #[test]
    fn running_timer_rounds_up_partial_seconds() {
        let mut state = TimerState::new();
        state.begin_run(10, NOW);
        assert_eq!(state.remaining_seconds(NOW), 10);
        assert_eq!(state.remaining_seconds(NOW + 1), 10);
        assert_eq!(state.remaining_seconds(NOW + 1_000), 9);
        assert_eq!(state.remaining_seconds(NOW + 9_001), 1);
        assert_eq!(state.remaining_seconds(NOW + 10_000), 0);
        assert_eq!(state.remaining_seconds(NOW + 60_000), 0);
    }

    #[test]
    fn frozen_timer_ignores_elapsed_time() {
        let mut state = TimerState::new();
        state.begin_run(300, NOW);
        state.freeze(180, NOW + 60_000);
        assert_eq!(state.remaining_seconds(NOW + 250_000), 180);
        assert!(state.is_consistent());
    }

    #[test]
    fn expired_timer_reports_zero() {
        let mut state = TimerState::new();
        state.begin_run(5, NOW);
        state.running = false;
        state.expired = true;
        assert_eq!(state.remaining_seconds(NOW + 5_000), 0);
    }
}
