use std::time::Duration;

use serde::Deserialize;

use crate::state::{clock::EpochMs, timer::TimerState};

/// Default remaining time at which the automatic prank fires.
pub const DEFAULT_PRANK_THRESHOLD_SECONDS: u32 = 180;
/// Default value displayed while frozen.
pub const DEFAULT_FREEZE_DISPLAY_SECONDS: u32 = 180;
/// Default real-time length of a freeze.
pub const DEFAULT_FREEZE_WINDOW: Duration = Duration::from_secs(60);
/// Default duration used by `jumpBack`.
pub const DEFAULT_JUMP_BACK_SECONDS: u32 = 240;
/// Default run length a manual `prank` restarts at in [`ManualPrankMode::JumpTo`].
pub const DEFAULT_MANUAL_JUMP_SECONDS: u32 = 60;

/// What a manual `prank` command does to the countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualPrankMode {
    /// Only the audiovisual cue is sent; the countdown is untouched.
    #[default]
    EffectOnly,
    /// The cue is sent and the display freezes at its current value.
    Freeze,
    /// The cue is sent and a fresh run of `manual_jump_seconds` begins.
    JumpTo,
}

/// Tunables of the prank sub-machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrankRules {
    /// Remaining seconds at or below which the automatic prank fires.
    pub threshold_seconds: u32,
    /// Value pinned on the display during the automatic freeze.
    pub freeze_display_seconds: u32,
    /// Real time a freeze lasts.
    pub freeze_window: Duration,
    /// Length of the run established by `jumpBack`.
    pub jump_back_seconds: u32,
    /// Behaviour of the manual `prank` command.
    pub manual_mode: ManualPrankMode,
    /// Length of the run a manual `prank` restarts at in [`ManualPrankMode::JumpTo`].
    pub manual_jump_seconds: u32,
}

impl Default for PrankRules {
    fn default() -> Self {
        Self {
            threshold_seconds: DEFAULT_PRANK_THRESHOLD_SECONDS,
            freeze_display_seconds: DEFAULT_FREEZE_DISPLAY_SECONDS,
            freeze_window: DEFAULT_FREEZE_WINDOW,
            jump_back_seconds: DEFAULT_JUMP_BACK_SECONDS,
            manual_mode: ManualPrankMode::EffectOnly,
            manual_jump_seconds: DEFAULT_MANUAL_JUMP_SECONDS,
        }
    }
}

impl PrankRules {
    fn freeze_window_ms(&self) -> i64 {
        i64::try_from(self.freeze_window.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Named states of the per-run prank sub-machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrankPhase {
    /// Nothing running (never started, stopped or reset).
    Stopped,
    /// Counting down, automatic prank not fired yet.
    Idle,
    /// Display frozen while real time keeps elapsing.
    Frozen,
    /// Counting down after the freeze lifted and the countdown was spliced.
    Spliced,
    /// Run ended by reaching zero.
    Expired,
}

/// One-shot notice fanned out to viewers, never replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// A run has just been started.
    Start,
    /// The prank gag has just fired.
    Prank,
}

impl Effect {
    /// Event name used on the wire.
    pub fn event_name(self) -> &'static str {
        match self {
            Effect::Start => "start-effect",
            Effect::Prank => "prank-effect",
        }
    }
}

/// Owner of the single [`TimerState`] and the rules used to advance it.
#[derive(Debug, Clone, Default)]
pub struct TimerStateMachine {
    pub(crate) state: TimerState,
    pub(crate) rules: PrankRules,
}

impl TimerStateMachine {
    /// Create a state machine holding an empty timer.
    pub fn new(rules: PrankRules) -> Self {
        Self {
            state: TimerState::new(),
            rules,
        }
    }

    /// Inspect the current timer record.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Rules currently in force.
    pub fn rules(&self) -> &PrankRules {
        &self.rules
    }

    /// Derive the named prank phase from the timer record.
    pub fn phase(&self) -> PrankPhase {
        let state = &self.state;
        match (state.running, state.pranking, state.prank_fired_auto) {
            (false, _, _) if state.expired => PrankPhase::Expired,
            (false, _, _) => PrankPhase::Stopped,
            (true, true, _) => PrankPhase::Frozen,
            (true, false, true) => PrankPhase::Spliced,
            (true, false, false) => PrankPhase::Idle,
        }
    }

    /// Recompute automatic transitions at `now`, returning any effect to broadcast.
    pub fn tick(&mut self, now: EpochMs) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.state.running {
            return effects;
        }

        if self.should_fire_auto_prank(now) {
            let until = now + self.rules.freeze_window_ms();
            self.state.freeze(self.rules.freeze_display_seconds, until);
            self.state.prank_fired_auto = true;
            effects.push(Effect::Prank);
        }

        if self.freeze_elapsed(now) {
            self.splice(now);
        }

        if !self.state.pranking && self.state.end_at_epoch_ms.is_some_and(|end| now >= end) {
            self.state.running = false;
            self.state.expired = true;
        }

        effects
    }

    fn should_fire_auto_prank(&self, now: EpochMs) -> bool {
        if self.state.prank_fired_auto
            || self.state.pranking
            || self.state.start_seconds <= self.rules.threshold_seconds
        {
            return false;
        }
        let left = self.state.remaining_seconds(now);
        left > 0 && left <= self.rules.threshold_seconds
    }

    fn freeze_elapsed(&self, now: EpochMs) -> bool {
        self.state.pranking
            && self
                .state
                .prank_end_epoch_ms
                .is_some_and(|prank_end| now >= prank_end)
    }

    /// Lift the freeze and move the end so the frozen window is cut out of the countdown.
    fn splice(&mut self, now: EpochMs) {
        let frozen_ms = i64::from(self.state.freeze_seconds.unwrap_or(0)) * 1_000;
        let resume_ms = (frozen_ms - self.rules.freeze_window_ms()).max(0);
        self.state.clear_freeze();
        self.state.end_at_epoch_ms = Some(now + resume_ms);
    }

    /// Freeze the display at its current value for one freeze window.
    pub(crate) fn freeze_in_place(&mut self, now: EpochMs) -> bool {
        if !self.state.running || self.state.pranking {
            return false;
        }
        let left = self.state.remaining_seconds(now);
        self.state.freeze(left, now + self.rules.freeze_window_ms());
        true
    }
}
