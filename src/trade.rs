//! Trade notifications and the sink they are delivered to.
//!
//! The engine invokes its [`TradeSink`] synchronously, once per executed
//! trade, in execution order, from inside the matching loop. A sink must
//! not re-enter the engine.

use crate::types::{OrderId, Price, Quantity};
use std::sync::{Arc, Mutex};

/// One executed trade. `price` is the resting order's price; `ts` is the
/// sequence timestamp of the aggressing submit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Trade {
    pub buy_id: OrderId,
    pub sell_id: OrderId,
    pub quantity: Quantity,
    pub price: Price,
    pub ts: u64,
}

/// Receiver for trade notifications.
pub trait TradeSink: Send {
    fn on_trade(&self, trade: &Trade);
}

/// Any `Fn(&Trade)` closure is a sink.
impl<F> TradeSink for F
where
    F: Fn(&Trade) + Send,
{
    fn on_trade(&self, trade: &Trade) {
        self(trade)
    }
}

/// Discards every trade. Used by replay, where trades are re-derived state.
pub struct NoopTradeSink;

impl TradeSink for NoopTradeSink {
    fn on_trade(&self, _trade: &Trade) {}
}

/// Buffers trades for later inspection. Clones share the same backing
/// buffer, so a test can hand one clone to the engine and read through
/// another.
#[derive(Clone, Default)]
pub struct RecordingTradeSink {
    trades: Arc<Mutex<Vec<Trade>>>,
}

impl RecordingTradeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trades(&self) -> Vec<Trade> {
        self.trades.lock().expect("lock").clone()
    }

    pub fn clear(&self) {
        self.trades.lock().expect("lock").clear();
    }
}

impl TradeSink for RecordingTradeSink {
    fn on_trade(&self, trade: &Trade) {
        self.trades.lock().expect("lock").push(*trade);
    }
}
