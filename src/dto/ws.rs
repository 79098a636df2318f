use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{command::CommandAck, timer::TimerSnapshot};

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Frames pushed to WebSocket clients.
#[serde(tag = "type")]
pub enum ViewerOutboundMessage {
    #[serde(rename = "state")]
    State(TimerSnapshot),
    #[serde(rename = "start-effect")]
    StartEffect,
    #[serde(rename = "prank-effect")]
    PrankEffect,
    /// Reply to a controller command, sent on the issuing socket only.
    #[serde(rename = "ack")]
    Ack(CommandAck),
}
