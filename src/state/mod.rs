/// Injectable time source.
pub mod clock;
/// Controller command parsing and application.
pub mod commands;
mod hub;
/// Prank rules and the tick engine.
pub mod state_machine;
/// The timer record.
pub mod timer;

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::{Mutex, broadcast, mpsc};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::{
        command::ControllerMessage, sse::ServerEvent, timer::TimerSnapshot,
        ws::ViewerOutboundMessage,
    },
    state::{
        clock::{Clock, SystemClock},
        commands::CommandOutcome,
        state_machine::{Effect, TimerStateMachine},
    },
};

pub use self::hub::{ViewerHub, to_server_event};

/// Cheaply clonable handle to the process-wide [`AppState`].
pub type SharedState = Arc<AppState>;

/// Number of SSE events buffered per subscriber before it starts lagging.
const SSE_CAPACITY: usize = 32;

/// Central application state: the single timer, its clock, and the viewer hub.
///
/// Every tick and every command holds `timer` for the whole read-compute-write
/// step, including the resulting broadcast.
pub struct AppState {
    config: AppConfig,
    clock: Arc<dyn Clock>,
    timer: Mutex<TimerStateMachine>,
    hub: ViewerHub,
}

impl AppState {
    /// Construct a new [`AppState`] reading the system clock.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Construct a new [`AppState`] driven by the given clock.
    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> SharedState {
        let timer = TimerStateMachine::new(config.rules.clone());
        Arc::new(Self {
            config,
            clock,
            timer: Mutex::new(timer),
            hub: ViewerHub::new(SSE_CAPACITY),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current time according to the injected clock.
    pub fn now_ms(&self) -> clock::EpochMs {
        self.clock.now_ms()
    }

    /// Snapshot of the timer stamped with the current time.
    pub async fn snapshot(&self) -> TimerSnapshot {
        let sm = self.timer.lock().await;
        TimerSnapshot::capture(sm.state(), self.now_ms())
    }

    /// Whether a countdown is currently running.
    pub async fn is_running(&self) -> bool {
        self.timer.lock().await.state().running
    }

    /// Advance automatic transitions and push the result to every viewer.
    pub async fn tick(&self) -> Vec<Effect> {
        let mut sm = self.timer.lock().await;
        let now = self.now_ms();
        let effects = sm.tick(now);
        self.publish(&sm, &effects, now);
        effects
    }

    /// Apply a controller message and push the resulting state to every viewer.
    ///
    /// The snapshot goes out whether or not the command was accepted.
    pub async fn process_command(&self, message: &ControllerMessage) -> CommandOutcome {
        let mut sm = self.timer.lock().await;
        let now = self.now_ms();
        let outcome = sm.handle_message(message, &self.config.admin_key, now);
        self.publish(&sm, &outcome.effects, now);
        outcome
    }

    /// Register a WebSocket viewer with the current snapshot as its first frame.
    ///
    /// Returns `None` when the viewer's writer is already closed.
    pub async fn connect_viewer(&self, tx: mpsc::UnboundedSender<Message>) -> Option<Uuid> {
        let sm = self.timer.lock().await;
        let snapshot = TimerSnapshot::capture(sm.state(), self.now_ms());
        self.hub.register_with(tx, &ViewerOutboundMessage::State(snapshot))
    }

    /// Remove a WebSocket viewer from the broadcast set.
    pub fn unregister_viewer(&self, id: &Uuid) {
        self.hub.unregister(id);
    }

    /// Subscribe an SSE viewer, returning the snapshot it must see before any broadcast.
    pub async fn subscribe_viewer(&self) -> (broadcast::Receiver<ServerEvent>, TimerSnapshot) {
        let sm = self.timer.lock().await;
        let receiver = self.hub.subscribe();
        (receiver, TimerSnapshot::capture(sm.state(), self.now_ms()))
    }

    /// Number of connected viewers across both transports.
    pub fn viewer_count(&self) -> usize {
        self.hub.socket_count() + self.hub.sse_count()
    }

    fn publish(&self, sm: &TimerStateMachine, effects: &[Effect], now: clock::EpochMs) {
        for effect in effects {
            let message = match effect {
                Effect::Start => ViewerOutboundMessage::StartEffect,
                Effect::Prank => ViewerOutboundMessage::PrankEffect,
            };
            self.hub.publish(&message);
        }
        self.hub.publish(&ViewerOutboundMessage::State(TimerSnapshot::capture(
            sm.state(),
            now,
        )));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::clock::ManualClock;

    const T0: clock::EpochMs = 1_700_000_000_000;

    fn app() -> (SharedState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(T0));
        let config = AppConfig {
            admin_key: "letmein".into(),
            ..AppConfig::default()
        };
        (AppState::with_clock(config, clock.clone()), clock)
    }

    fn frames(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        while let Ok(Message::Text(text)) = rx.try_recv() {
            out.push(serde_json::from_str(text.as_str()).unwrap());
        }
        out
    }

    async fn connect(state: &SharedState) -> (Uuid, mpsc::UnboundedReceiver<Message>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = state.connect_viewer(tx).await.unwrap();
        let initial = frames(&mut rx);
        assert_eq!(initial.len(), 1);
        assert_eq!(initial[0]["type"], "state");
        (id, rx)
    }

    fn start_message(key: &str, seconds: u32) -> ControllerMessage {
        ControllerMessage {
            kind: Some("start".into()),
            key: Some(key.into()),
            seconds: Some(json!(seconds)),
        }
    }

    #[tokio::test]
    async fn start_broadcasts_effect_then_state() {
        let (state, _clock) = app();
        let (_id, mut rx) = connect(&state).await;

        let outcome = state.process_command(&start_message("letmein", 300)).await;
        assert!(outcome.ack().ok);

        let frames = frames(&mut rx);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["type"], "start-effect");
        assert_eq!(frames[1]["type"], "state");
        assert_eq!(frames[1]["running"], true);
        assert_eq!(frames[1]["endAtEpochMs"], T0 + 300_000);
        assert_eq!(frames[1]["serverTimeEpochMs"], T0);
    }

    #[tokio::test]
    async fn rejected_command_still_broadcasts_state() {
        let (state, _clock) = app();
        let (_id, mut rx) = connect(&state).await;

        let outcome = state.process_command(&start_message("nope", 300)).await;
        assert!(!outcome.ack().ok);

        let frames = frames(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "state");
        assert_eq!(frames[0]["running"], false);
        assert!(!state.is_running().await);
    }

    #[tokio::test]
    async fn ticks_drive_prank_and_expiry_through_the_hub() {
        let (state, clock) = app();
        let (_id, mut rx) = connect(&state).await;
        state.process_command(&start_message("letmein", 300)).await;
        frames(&mut rx);

        clock.advance(120_000);
        assert_eq!(state.tick().await, vec![Effect::Prank]);
        let frames_at_threshold = frames(&mut rx);
        assert_eq!(frames_at_threshold[0]["type"], "prank-effect");
        assert_eq!(frames_at_threshold[1]["pranking"], true);
        assert_eq!(frames_at_threshold[1]["freezeSeconds"], 180);

        clock.advance(60_000);
        assert!(state.tick().await.is_empty());
        let snapshot = state.snapshot().await;
        assert!(!snapshot.pranking);
        assert_eq!(snapshot.end_at_epoch_ms, Some(T0 + 300_000));

        clock.advance(120_000);
        state.tick().await;
        assert!(!state.is_running().await);
    }

    #[tokio::test]
    async fn idle_tick_still_broadcasts() {
        let (state, clock) = app();
        let (_id, mut rx) = connect(&state).await;

        clock.advance(200);
        state.tick().await;
        let frames = frames(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["serverTimeEpochMs"], T0 + 200);
    }

    #[tokio::test]
    async fn viewer_count_tracks_both_transports() {
        let (state, _clock) = app();
        let (id, _rx) = connect(&state).await;
        let (sse, _initial) = state.subscribe_viewer().await;
        assert_eq!(state.viewer_count(), 2);

        state.unregister_viewer(&id);
        drop(sse);
        assert_eq!(state.viewer_count(), 0);
    }

    #[tokio::test]
    async fn connecting_viewer_waits_for_in_flight_tick() {
        let (state, clock) = app();
        let busy = state.timer.lock().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connecting = tokio::spawn({
            let state = state.clone();
            async move { state.connect_viewer(tx).await }
        });
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(state.viewer_count(), 0);

        drop(busy);
        connecting.await.unwrap().unwrap();
        clock.advance(200);
        state.tick().await;

        let frames = frames(&mut rx);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["serverTimeEpochMs"], T0);
        assert_eq!(frames[1]["serverTimeEpochMs"], T0 + 200);
    }

    #[tokio::test]
    async fn subscribing_viewer_waits_for_in_flight_tick() {
        let (state, clock) = app();
        let busy = state.timer.lock().await;
        let subscribing = tokio::spawn({
            let state = state.clone();
            async move { state.subscribe_viewer().await }
        });
        tokio::task::yield_now().await;
        assert_eq!(state.viewer_count(), 0);

        drop(busy);
        let (mut receiver, initial) = subscribing.await.unwrap();
        assert_eq!(initial.server_time_epoch_ms, T0);
        clock.advance(200);
        state.tick().await;
        let next = receiver.try_recv().unwrap();
        assert!(next.data.contains(&format!(r#""serverTimeEpochMs":{}"#, T0 + 200)));
    }
}
