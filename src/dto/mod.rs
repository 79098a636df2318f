use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::state::clock::EpochMs;

pub mod command;
pub mod health;
pub mod sse;
pub mod timer;
pub mod validation;
pub mod ws;

pub(crate) fn format_epoch_ms(at: EpochMs) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(at) * 1_000_000)
        .ok()
        .and_then(|time| time.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}
