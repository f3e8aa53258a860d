//! # Journal Matching Engine
//!
//! Single-instrument, in-memory limit order-book matching engine with an
//! append-only event log and deterministic replay. Orders match under
//! price-time priority; every state-mutating command is journaled so the
//! book can be reconstructed from the log alone.
//!
//! ## Entry point
//!
//! Use [`Engine`] as the single entry point: create with [`Engine::new`]
//! over an [`OrderBook`], then [`Engine::submit`] and [`Engine::cancel`].
//! Trades are delivered synchronously to the [`TradeSink`] passed at
//! construction. Reconstruct an engine from a log with [`replay::replay`].
//!
//! ## Example
//!
//! ```rust
//! use journal_matching_engine::{Engine, Order, OrderBook, OrderId, RecordingTradeSink, Side};
//!
//! let trades = RecordingTradeSink::new();
//! let mut engine = Engine::new(OrderBook::new(), None, Box::new(trades.clone()));
//! engine.submit(Order::limit(OrderId(1), Side::Sell, 100, 5)).unwrap();
//! engine.submit(Order::limit(OrderId(2), Side::Buy, 100, 5)).unwrap();
//! assert_eq!(trades.trades().len(), 1);
//! assert_eq!(trades.trades()[0].price, 100);
//! ```
//!
//! The engine is single-writer: callers needing concurrent access must
//! serialize externally, e.g. a dedicated engine thread with a command
//! channel.

pub mod engine;
pub mod error;
pub mod event_log;
pub mod matching;
pub mod order_book;
pub mod order_gen;
pub mod replay;
pub mod trade;
pub mod types;

pub use engine::Engine;
pub use error::{EngineError, ReplayError};
pub use event_log::EventLog;
pub use order_book::OrderBook;
pub use trade::{NoopTradeSink, RecordingTradeSink, Trade, TradeSink};
pub use types::{Order, OrderId, OrderType, Price, Quantity, RestingOrder, Side};
