//! Single-entry matching engine facade.
//!
//! The engine owns the book, the order index, and the sequence counter, and
//! holds the trade sink plus an optional event log. All mutation goes
//! through [`Engine::submit`], [`Engine::cancel`], [`Engine::snapshot`],
//! and [`Engine::compact_book`]; the matching loop itself lives in
//! [`crate::matching`].
//!
//! The engine is single-writer and non-reentrant: operations run to
//! completion, and the trade sink is invoked synchronously from inside
//! matching. Log appends in the submit/cancel path are best-effort — a
//! write failure is logged at warn level and the in-memory state still
//! advances. `snapshot` is the strict exception.

use crate::error::EngineError;
use crate::event_log::EventLog;
use crate::order_book::OrderBook;
use crate::trade::TradeSink;
use crate::types::{Order, OrderId, Price, Quantity, RestingOrder};
use std::collections::HashMap;
use tracing::warn;

/// Single-instrument matching engine.
pub struct Engine {
    pub(crate) book: OrderBook,
    /// Live orders by id, holding arena keys into the book. An entry exists
    /// exactly while the order can still trade.
    pub(crate) order_index: HashMap<OrderId, usize>,
    /// Monotonic sequence counter, doubling as the time axis. Incremented
    /// once per accepted submit and stamped as the order's `ts`.
    pub(crate) seq: u64,
    pub(crate) log: Option<EventLog>,
    pub(crate) on_trade: Box<dyn TradeSink>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("book", &self.book)
            .field("order_index", &self.order_index)
            .field("seq", &self.seq)
            .field("log", &self.log)
            .finish()
    }
}

impl Engine {
    /// Builds an engine over `book`. `log` is optional; replay constructs
    /// engines without one.
    pub fn new(book: OrderBook, log: Option<EventLog>, on_trade: Box<dyn TradeSink>) -> Self {
        Self {
            book,
            order_index: HashMap::with_capacity(1 << 16),
            seq: 0,
            log,
            on_trade,
        }
    }

    /// Submits an order: validates, stamps the sequence timestamp, journals
    /// the `Add`, and runs matching. A `Limit` remainder rests on the book;
    /// a `Market` remainder is dropped silently.
    pub fn submit(&mut self, mut order: Order) -> Result<(), EngineError> {
        if order.quantity == 0 {
            return Err(EngineError::InvalidQuantity);
        }
        if self.order_index.contains_key(&order.id) {
            return Err(EngineError::DuplicateOrderId(order.id));
        }

        self.seq += 1;
        order.ts = self.seq;
        order.canceled = false;

        if let Some(log) = self.log.as_mut() {
            if let Err(error) = log.append_add(&order) {
                warn!(%error, id = %order.id, "event log append failed for add");
            }
        }

        self.match_order(order);
        Ok(())
    }

    /// Cancels a live order. The `Cancel` record is journaled before the
    /// state change, so a replayed log can legitimately carry cancels for
    /// orders that were fully matched earlier in that same replay.
    pub fn cancel(&mut self, id: OrderId) -> Result<(), EngineError> {
        if let Some(log) = self.log.as_mut() {
            if let Err(error) = log.append_cancel(id) {
                warn!(%error, %id, "event log append failed for cancel");
            }
        }
        self.apply_cancel(id)
    }

    /// The state-mutation half of cancel, shared with replay: tombstone the
    /// order in place and drop it from the index. The level's FIFO layout
    /// is untouched; the matcher skips the tombstone on next encounter.
    pub(crate) fn apply_cancel(&mut self, id: OrderId) -> Result<(), EngineError> {
        let key = self.order_index.remove(&id).ok_or(EngineError::OrderNotFound(id))?;
        self.book.orders[key].canceled = true;
        Ok(())
    }

    /// Journals a checkpoint record carrying the current sequence counter.
    /// Requires a configured log; write errors are surfaced here, unlike
    /// the submit/cancel path.
    pub fn snapshot(&mut self) -> Result<(), EngineError> {
        let seq = self.seq;
        let log = self.log.as_mut().ok_or(EngineError::LogUnavailable)?;
        log.append_snapshot(seq)?;
        Ok(())
    }

    /// Sweeps both sides of the book, dropping drained levels and the
    /// tombstones they retain. Never required for matching correctness.
    pub fn compact_book(&mut self) {
        self.book.compact();
    }

    /// Flushes and fsyncs the event log, if one is configured. Nothing
    /// flushes implicitly; the durability cadence is the caller's choice.
    pub fn sync_log(&mut self) -> Result<(), EngineError> {
        if let Some(log) = self.log.as_mut() {
            log.sync()?;
        }
        Ok(())
    }

    /// Current sequence counter (the `ts` of the most recent accept).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.book.best_bid()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.book.best_ask()
    }

    /// Number of orders that can still trade.
    pub fn open_orders(&self) -> usize {
        self.order_index.len()
    }

    /// Remaining quantity of a live order.
    pub fn remaining_quantity(&self, id: OrderId) -> Option<Quantity> {
        let key = *self.order_index.get(&id)?;
        Some(self.book.orders[key].quantity)
    }

    /// The book, for read-only inspection.
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Live resting orders in priority order.
    pub fn resting_orders(&self) -> Vec<RestingOrder> {
        self.book.resting_orders()
    }

    /// Lifts the sequence counter so it never regresses past a replayed
    /// order's timestamp.
    pub(crate) fn lift_seq(&mut self, ts: u64) {
        if ts > self.seq {
            self.seq = ts;
        }
    }

    /// Fast-forwards the clock to a snapshot record's value.
    pub(crate) fn set_seq(&mut self, seq: u64) {
        self.seq = seq;
    }
}
