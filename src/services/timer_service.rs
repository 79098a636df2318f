//! Entry points that drive the shared timer: the periodic tick loop and the
//! controller command handler used by both WebSocket and REST callers.

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::{
    dto::command::ControllerMessage,
    error::ServiceError,
    state::{
        SharedState,
        commands::{CommandError, CommandOutcome},
        state_machine::Effect,
    },
};

/// Run the tick engine forever at the configured cadence.
pub async fn run_tick_loop(state: SharedState) {
    let period = state.config().tick_interval;
    info!(period_ms = period.as_millis() as u64, "starting tick engine");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        for effect in state.tick().await {
            if effect == Effect::Prank {
                info!("automatic prank fired; display frozen");
            }
        }
    }
}

/// Process one controller message and log the outcome.
pub async fn handle_command(state: &SharedState, message: &ControllerMessage) -> CommandOutcome {
    let outcome = state.process_command(message).await;
    match &outcome.result {
        Ok(command) => info!(?command, "controller command applied"),
        Err(CommandError::Unauthorized) => warn!("rejected controller command: bad credential"),
        Err(err) => debug!(error = %err, kind = ?message.kind, "rejected controller command"),
    }
    outcome
}

/// Process one controller message for a caller that wants a `Result`.
pub async fn execute_command(
    state: &SharedState,
    message: &ControllerMessage,
) -> Result<CommandOutcome, ServiceError> {
    let outcome = handle_command(state, message).await;
    match &outcome.result {
        Ok(_) => Ok(outcome),
        Err(err) => Err(err.clone().into()),
    }
}
