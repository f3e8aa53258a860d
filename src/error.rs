//! Error types for submission, cancellation, and replay.

use crate::types::OrderId;
use thiserror::Error;

/// Errors returned by [`Engine`](crate::Engine) operations. Validation
/// failures leave the engine untouched and append nothing to the log.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Submit with a zero quantity.
    #[error("invalid quantity")]
    InvalidQuantity,

    /// Cancel of an id that is not live in the order index.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// Submit with an id that is still live in the order index.
    #[error("order {0} already exists")]
    DuplicateOrderId(OrderId),

    /// Snapshot requested on an engine constructed without an event log.
    #[error("no event log configured")]
    LogUnavailable,

    /// Event log write failure surfaced by a strict path (snapshot).
    #[error("event log write failed")]
    Log(#[from] std::io::Error),
}

/// Errors that abort a replay. Framing errors carry the byte offset of the
/// record that failed to decode.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("event log i/o failed")]
    Io(#[from] std::io::Error),

    /// The file ended inside a record header or payload.
    #[error("truncated record at offset {offset}")]
    Truncated { offset: u64 },

    /// A record's length prefix exceeds the hard per-record cap.
    #[error("record size {size} exceeds cap at offset {offset}")]
    Oversized { size: u32, offset: u64 },

    #[error("unknown event type {kind} at offset {offset}")]
    UnknownEventType { kind: u8, offset: u64 },

    /// A known record type whose payload does not match its layout.
    #[error("malformed {record} payload at offset {offset}")]
    MalformedPayload { record: &'static str, offset: u64 },
}
