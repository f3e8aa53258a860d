//! Core types for the matching engine.
//!
//! All monetary and count quantities are unsigned 64-bit tick counts; there
//! is no floating point anywhere in the engine. [`Order`] is the submission
//! message and the resting-book record in one: the engine stamps `ts` and
//! flips `canceled`, clients set the rest.

/// Price in ticks. Ignored by the matcher for market orders.
pub type Price = u64;

/// Quantity in units.
pub type Quantity = u64;

/// Unique order identifier, chosen by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub u64);

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Wire encoding used by the event log.
    pub(crate) fn as_byte(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    pub(crate) fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }
}

/// Order type: limit (rests at its price) or market (takes any price,
/// remainder dropped).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    Limit,
    Market,
}

impl OrderType {
    pub(crate) fn as_byte(self) -> u8 {
        match self {
            OrderType::Limit => 0,
            OrderType::Market => 1,
        }
    }

    pub(crate) fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(OrderType::Limit),
            1 => Some(OrderType::Market),
            _ => None,
        }
    }
}

/// An order, both as submitted and as it rests on the book.
///
/// `ts` is assigned by the engine from its sequence counter at submission;
/// client-supplied values are overwritten. `canceled` is a tombstone flag:
/// once set it is never cleared, and the matcher skips the order in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
    pub ts: u64,
    pub canceled: bool,
}

impl Order {
    /// Builds an order ready for submission. `ts` starts at zero and is
    /// stamped by the engine.
    pub fn new(id: OrderId, side: Side, order_type: OrderType, price: Price, quantity: Quantity) -> Self {
        Self {
            id,
            side,
            order_type,
            price,
            quantity,
            ts: 0,
            canceled: false,
        }
    }

    /// Limit order shorthand.
    pub fn limit(id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self::new(id, side, OrderType::Limit, price, quantity)
    }

    /// Market order shorthand. The price field is unused by the matcher.
    pub fn market(id: OrderId, side: Side, quantity: Quantity) -> Self {
        Self::new(id, side, OrderType::Market, 0, quantity)
    }

    /// True once the order can no longer trade.
    pub fn is_tombstone(&self) -> bool {
        self.canceled || self.quantity == 0
    }
}

/// One live resting order as exported by
/// [`OrderBook::resting_orders`](crate::OrderBook::resting_orders), in
/// priority order. Used by the replay CLI summary and equivalence tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RestingOrder {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub ts: u64,
}
