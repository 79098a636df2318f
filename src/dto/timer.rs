use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::{clock::EpochMs, timer::TimerState};

/// Full timer record as pushed to viewers, stamped with the server time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    /// Whether a countdown is in progress.
    pub running: bool,
    /// Length of the current or last run.
    pub start_seconds: u32,
    /// Wall-clock instant the countdown reaches zero.
    #[schema(value_type = Option<i64>)]
    pub end_at_epoch_ms: Option<EpochMs>,
    /// Freshness marker taken when the snapshot was built.
    #[schema(value_type = i64)]
    pub server_time_epoch_ms: EpochMs,
    /// Whether the display is frozen.
    pub pranking: bool,
    /// Wall-clock instant the freeze lifts.
    #[schema(value_type = Option<i64>)]
    pub prank_end_epoch_ms: Option<EpochMs>,
    /// Value shown while frozen.
    pub freeze_seconds: Option<u32>,
    /// Whether the automatic prank already fired this run.
    pub prank_fired_auto: bool,
}

impl TimerSnapshot {
    /// Capture `state` as seen at `now`.
    pub fn capture(state: &TimerState, now: EpochMs) -> Self {
        Self {
            running: state.running,
            start_seconds: state.start_seconds,
            end_at_epoch_ms: state.end_at_epoch_ms,
            server_time_epoch_ms: now,
            pranking: state.pranking,
            prank_end_epoch_ms: state.prank_end_epoch_ms,
            freeze_seconds: state.freeze_seconds,
            prank_fired_auto: state.prank_fired_auto,
        }
    }
}
