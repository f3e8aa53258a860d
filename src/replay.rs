//! Deterministic replay: reconstruct an engine from an event log.
//!
//! Replay feeds every journaled command through the same state-mutation
//! path the live engine used, with the trade sink wired to a no-op and no
//! log attached, so the reconstructed book is observationally identical to
//! the original. `Trade` records are derived state and skipped without
//! inspection. A truncated tail, an unknown record type, an oversized
//! record, or a malformed payload aborts with the offending record's byte
//! offset; no repair is attempted.

use crate::engine::Engine;
use crate::error::ReplayError;
use crate::event_log::{decode_add, decode_cancel, decode_snapshot, EventKind, MAX_EVENT_SIZE};
use crate::order_book::OrderBook;
use crate::trade::NoopTradeSink;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Replays the log at `path` into a fresh engine.
pub fn replay(path: impl AsRef<Path>) -> Result<Engine, ReplayError> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(1 << 20, file);
    let mut engine = Engine::new(OrderBook::new(), None, Box::new(NoopTradeSink));

    let mut offset: u64 = 0;
    let mut payload = [0u8; MAX_EVENT_SIZE as usize];

    loop {
        let record_offset = offset;

        let mut kind_byte = [0u8; 1];
        match reader.read_exact(&mut kind_byte) {
            Ok(()) => {}
            // EOF on a record boundary is the end of the log.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(ReplayError::Io(e)),
        }
        let kind = EventKind::from_byte(kind_byte[0]);

        let mut len_bytes = [0u8; 4];
        read_or_truncated(&mut reader, &mut len_bytes, record_offset)?;
        let size = u32::from_le_bytes(len_bytes);
        if size > MAX_EVENT_SIZE {
            return Err(ReplayError::Oversized {
                size,
                offset: record_offset,
            });
        }
        let buf = &mut payload[..size as usize];
        read_or_truncated(&mut reader, buf, record_offset)?;
        offset += 1 + 4 + size as u64;

        match kind {
            Some(EventKind::Add) => {
                let order = decode_add(buf).ok_or(ReplayError::MalformedPayload {
                    record: "add",
                    offset: record_offset,
                })?;
                // The clock must not regress behind a replayed timestamp.
                engine.lift_seq(order.ts);
                engine.match_order(order);
            }
            Some(EventKind::Cancel) => {
                let id = decode_cancel(buf).ok_or(ReplayError::MalformedPayload {
                    record: "cancel",
                    offset: record_offset,
                })?;
                // A cancel can target an order this replay already matched
                // away; the original engine journaled it before applying.
                if engine.apply_cancel(id).is_err() {
                    debug!(%id, offset = record_offset, "replayed cancel for unknown order");
                }
            }
            Some(EventKind::Snapshot) => {
                let seq = decode_snapshot(buf).ok_or(ReplayError::MalformedPayload {
                    record: "snapshot",
                    offset: record_offset,
                })?;
                engine.set_seq(seq);
            }
            Some(EventKind::Trade) => {}
            None => {
                return Err(ReplayError::UnknownEventType {
                    kind: kind_byte[0],
                    offset: record_offset,
                });
            }
        }
    }

    debug!(seq = engine.seq(), open_orders = engine.open_orders(), "replay complete");
    Ok(engine)
}

fn read_or_truncated(
    reader: &mut impl Read,
    buf: &mut [u8],
    record_offset: u64,
) -> Result<(), ReplayError> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ReplayError::Truncated {
                offset: record_offset,
            }
        } else {
            ReplayError::Io(e)
        }
    })
}
