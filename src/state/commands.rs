//! Controller command processing: authorization, validation and application to
//! the timer state machine. Every rejected command leaves the timer untouched.

use thiserror::Error;

use crate::{
    dto::{
        command::{CommandAck, ControllerMessage},
        validation::coerce_duration_seconds,
    },
    state::{
        clock::EpochMs,
        state_machine::{Effect, ManualPrankMode, TimerStateMachine},
    },
};

/// Validated controller command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Begin a fresh run of the given length.
    Start {
        /// Countdown length in seconds.
        seconds: u32,
    },
    /// Halt the run in place.
    Stop,
    /// Return to the initial, unconfigured state.
    Reset,
    /// Fire the prank gag on every viewer.
    Prank,
    /// Restart at the fixed recovery duration.
    JumpBack,
}

/// Reasons a controller command is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Missing envelope or credential mismatch.
    #[error("unauthorized")]
    Unauthorized,
    /// Arguments failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// `type` is absent or not one of the known commands.
    #[error("unknown command")]
    UnknownCommand(Option<String>),
}

impl Command {
    /// Authorize `message` against `admin_key`, then decode its command and arguments.
    pub fn authorize_and_parse(
        message: &ControllerMessage,
        admin_key: &str,
    ) -> Result<Self, CommandError> {
        match message.key.as_deref() {
            Some(key) if key == admin_key => {}
            _ => return Err(CommandError::Unauthorized),
        }

        match message.kind.as_deref() {
            Some("start") => {
                let raw = message.seconds.as_ref().ok_or_else(|| {
                    CommandError::InvalidInput("seconds is required for start".into())
                })?;
                let seconds = coerce_duration_seconds(raw).map_err(|err| {
                    CommandError::InvalidInput(
                        err.message
                            .map(|message| message.to_string())
                            .unwrap_or_else(|| err.code.to_string()),
                    )
                })?;
                Ok(Command::Start { seconds })
            }
            Some("stop") => Ok(Command::Stop),
            Some("reset") => Ok(Command::Reset),
            Some("prank") => Ok(Command::Prank),
            Some("jumpBack") => Ok(Command::JumpBack),
            other => Err(CommandError::UnknownCommand(other.map(str::to_owned))),
        }
    }
}

/// Result of processing one controller message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Accepted command or the reason it was rejected.
    pub result: Result<Command, CommandError>,
    /// One-shot notices to fan out to viewers.
    pub effects: Vec<Effect>,
}

impl CommandOutcome {
    fn rejected(err: CommandError) -> Self {
        Self {
            result: Err(err),
            effects: Vec::new(),
        }
    }

    /// Acknowledgement for the issuer.
    pub fn ack(&self) -> CommandAck {
        match &self.result {
            Ok(Command::Start { seconds }) => {
                CommandAck::ok(format!("started {seconds}s countdown"))
            }
            Ok(Command::Stop) => CommandAck::ok("stopped"),
            Ok(Command::Reset) => CommandAck::ok("reset"),
            Ok(Command::Prank) => CommandAck::ok("prank sent"),
            Ok(Command::JumpBack) => CommandAck::ok("jumped back"),
            Err(err) => CommandAck::failed(err.to_string()),
        }
    }
}

impl TimerStateMachine {
    /// Authorize, validate and apply a raw controller message at `now`.
    pub fn handle_message(
        &mut self,
        message: &ControllerMessage,
        admin_key: &str,
        now: EpochMs,
    ) -> CommandOutcome {
        match Command::authorize_and_parse(message, admin_key) {
            Ok(command) => self.apply(command, now),
            Err(err) => CommandOutcome::rejected(err),
        }
    }

    /// Apply an already validated command at `now`.
    pub fn apply(&mut self, command: Command, now: EpochMs) -> CommandOutcome {
        let mut effects = Vec::new();
        match command {
            Command::Start { seconds } => {
                self.state.begin_run(seconds, now);
                effects.push(Effect::Start);
            }
            Command::Stop => self.state.halt(),
            Command::Reset => {
                self.state.halt();
                self.state.start_seconds = 0;
                self.state.end_at_epoch_ms = None;
                self.state.prank_fired_auto = false;
            }
            Command::Prank => {
                match self.rules.manual_mode {
                    ManualPrankMode::EffectOnly => {}
                    ManualPrankMode::Freeze => {
                        self.freeze_in_place(now);
                    }
                    ManualPrankMode::JumpTo => {
                        let seconds = self.rules.manual_jump_seconds;
                        self.state.begin_run(seconds, now);
                    }
                }
                effects.push(Effect::Prank);
            }
            Command::JumpBack => {
                let seconds = self.rules.jump_back_seconds;
                self.state.begin_run(seconds, now);
            }
        }

        CommandOutcome {
            result: Ok(command),
            effects,
        }
    }
}
