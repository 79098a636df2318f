//! DTO definitions for controller commands and their acknowledgements.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Command envelope sent by the controller over WebSocket or REST.
///
/// Every field is optional on the wire so that authorization can be checked
/// before anything else about the message is judged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ControllerMessage {
    /// One of `start`, `stop`, `reset`, `prank`, `jumpBack`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Shared admin secret.
    #[serde(default)]
    pub key: Option<String>,
    /// Countdown length for `start`; a number or numeric string.
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub seconds: Option<Value>,
}

impl ControllerMessage {
    /// Parse a raw JSON payload into a controller message.
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Acknowledgement returned only to the issuer of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CommandAck {
    /// Whether the command was applied.
    pub ok: bool,
    /// Human-readable outcome or rejection reason.
    pub message: String,
}

impl CommandAck {
    /// Positive acknowledgement.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    /// Negative acknowledgement.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}
