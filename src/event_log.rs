//! Append-only event log: framing and the buffered writer.
//!
//! Every record is `[type: u8][length: u32 LE][payload]`, little-endian
//! throughout, with a hard 256-byte payload cap and no checksum, magic, or
//! version field. Three commands are journaled (`Add`, `Cancel`,
//! `Snapshot`); `Trade` records are emitted for consumers but carry derived
//! state and are skipped on replay.
//!
//! Appends are buffered and never flushed implicitly. Callers choose their
//! durability cadence through [`EventLog::flush`] and [`EventLog::sync`];
//! a crash loses whatever the buffer still holds.

use crate::trade::Trade;
use crate::types::{Order, OrderId, OrderType, Side};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Hard per-record payload cap enforced by the decoder.
pub const MAX_EVENT_SIZE: u32 = 256;

pub(crate) const ADD_PAYLOAD_LEN: usize = 40;
pub(crate) const CANCEL_PAYLOAD_LEN: usize = 8;
pub(crate) const TRADE_PAYLOAD_LEN: usize = 40;
pub(crate) const SNAPSHOT_PAYLOAD_LEN: usize = 8;

/// Record type byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum EventKind {
    Add = 0,
    Cancel = 1,
    Trade = 2,
    Snapshot = 3,
}

impl EventKind {
    pub(crate) fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(EventKind::Add),
            1 => Some(EventKind::Cancel),
            2 => Some(EventKind::Trade),
            3 => Some(EventKind::Snapshot),
            _ => None,
        }
    }
}

/// `id, price, quantity, ts` as u64 at offsets 0/8/16/24, `side` at 32,
/// `order_type` at 33, six pad bytes. The buffer is fixed-size 40.
pub(crate) fn encode_add(order: &Order) -> [u8; ADD_PAYLOAD_LEN] {
    let mut buf = [0u8; ADD_PAYLOAD_LEN];
    buf[0..8].copy_from_slice(&order.id.0.to_le_bytes());
    buf[8..16].copy_from_slice(&order.price.to_le_bytes());
    buf[16..24].copy_from_slice(&order.quantity.to_le_bytes());
    buf[24..32].copy_from_slice(&order.ts.to_le_bytes());
    buf[32] = order.side.as_byte();
    buf[33] = order.order_type.as_byte();
    buf
}

pub(crate) fn decode_add(buf: &[u8]) -> Option<Order> {
    if buf.len() != ADD_PAYLOAD_LEN {
        return None;
    }
    let side = Side::from_byte(buf[32])?;
    let order_type = OrderType::from_byte(buf[33])?;
    Some(Order {
        id: OrderId(u64::from_le_bytes(buf[0..8].try_into().expect("8-byte slice"))),
        price: u64::from_le_bytes(buf[8..16].try_into().expect("8-byte slice")),
        quantity: u64::from_le_bytes(buf[16..24].try_into().expect("8-byte slice")),
        ts: u64::from_le_bytes(buf[24..32].try_into().expect("8-byte slice")),
        side,
        order_type,
        canceled: false,
    })
}

pub(crate) fn encode_cancel(id: OrderId) -> [u8; CANCEL_PAYLOAD_LEN] {
    id.0.to_le_bytes()
}

pub(crate) fn decode_cancel(buf: &[u8]) -> Option<OrderId> {
    if buf.len() != CANCEL_PAYLOAD_LEN {
        return None;
    }
    Some(OrderId(u64::from_le_bytes(buf.try_into().expect("8-byte slice"))))
}

/// `buy_id, sell_id, quantity, price, ts` as u64 at offsets 0/8/16/24/32.
pub(crate) fn encode_trade(trade: &Trade) -> [u8; TRADE_PAYLOAD_LEN] {
    let mut buf = [0u8; TRADE_PAYLOAD_LEN];
    buf[0..8].copy_from_slice(&trade.buy_id.0.to_le_bytes());
    buf[8..16].copy_from_slice(&trade.sell_id.0.to_le_bytes());
    buf[16..24].copy_from_slice(&trade.quantity.to_le_bytes());
    buf[24..32].copy_from_slice(&trade.price.to_le_bytes());
    buf[32..40].copy_from_slice(&trade.ts.to_le_bytes());
    buf
}

pub(crate) fn encode_snapshot(seq: u64) -> [u8; SNAPSHOT_PAYLOAD_LEN] {
    seq.to_le_bytes()
}

/// `seq` in the first eight bytes; any trailing bytes are
/// implementation-defined and ignored.
pub(crate) fn decode_snapshot(buf: &[u8]) -> Option<u64> {
    if buf.len() < SNAPSHOT_PAYLOAD_LEN {
        return None;
    }
    Some(u64::from_le_bytes(buf[0..8].try_into().expect("8-byte slice")))
}

/// Buffered append-only writer over one log file.
#[derive(Debug)]
pub struct EventLog {
    writer: BufWriter<File>,
}

impl EventLog {
    /// Opens (creating if absent) the log file for appending.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn append(&mut self, kind: EventKind, payload: &[u8]) -> io::Result<()> {
        debug_assert!(payload.len() as u32 <= MAX_EVENT_SIZE);
        self.writer.write_all(&[kind as u8])?;
        self.writer.write_all(&(payload.len() as u32).to_le_bytes())?;
        self.writer.write_all(payload)
    }

    pub(crate) fn append_add(&mut self, order: &Order) -> io::Result<()> {
        self.append(EventKind::Add, &encode_add(order))
    }

    pub(crate) fn append_cancel(&mut self, id: OrderId) -> io::Result<()> {
        self.append(EventKind::Cancel, &encode_cancel(id))
    }

    pub(crate) fn append_trade(&mut self, trade: &Trade) -> io::Result<()> {
        self.append(EventKind::Trade, &encode_trade(trade))
    }

    pub(crate) fn append_snapshot(&mut self, seq: u64) -> io::Result<()> {
        self.append(EventKind::Snapshot, &encode_snapshot(seq))
    }

    /// Flushes buffered records to the OS.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Flushes and fsyncs. The durable point after this call is the last
    /// appended record.
    pub fn sync(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()
    }
}
