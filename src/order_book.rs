//! Single-instrument order book: bids and asks, price-time priority.
//!
//! Each side is a map from price to [`PriceLevel`] plus a sorted price
//! vector (bids descending, asks ascending) that the matcher walks
//! best-first. Orders live in a slab arena; levels and the engine's order
//! index both refer to them by arena key, so a cancel or a fill is visible
//! through every view without copying.
//!
//! Cancels and fills never remove anything here. A dead order stays in its
//! level's FIFO as a tombstone until [`OrderBook::compact`] sweeps the
//! level; the matcher steps over tombstones by advancing the level `head`.

use crate::types::{Order, Price, RestingOrder, Side};
use slab::Slab;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// All resting orders on one side at one price.
///
/// `orders` is a FIFO of arena keys in arrival order. Entries before `head`
/// are tombstones that have been stepped over; they are physically retained
/// until compaction. `exhausted` is a hint set when a matching sweep drains
/// the level; nothing reads it to make a correctness decision.
#[derive(Debug)]
pub struct PriceLevel {
    pub(crate) price: Price,
    pub(crate) orders: Vec<usize>,
    pub(crate) head: usize,
    pub(crate) exhausted: bool,
}

impl PriceLevel {
    fn new(price: Price) -> Self {
        Self {
            price,
            orders: Vec::new(),
            head: 0,
            exhausted: false,
        }
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.head == self.orders.len()
    }

    /// Hint that a matching sweep drained this level. Goes stale as soon
    /// as a new order arrives at the price; informational only.
    pub fn exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Single-instrument order book.
#[derive(Debug, Default)]
pub struct OrderBook {
    pub(crate) orders: Slab<Order>,
    pub(crate) bids: HashMap<Price, PriceLevel>,
    pub(crate) asks: HashMap<Price, PriceLevel>,
    /// Strictly decreasing; mirrors the key set of `bids`.
    pub(crate) bid_prices: Vec<Price>,
    /// Strictly increasing; mirrors the key set of `asks`.
    pub(crate) ask_prices: Vec<Price>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocates the arena and the side maps for `orders` resting orders.
    pub fn with_capacity(orders: usize) -> Self {
        Self {
            orders: Slab::with_capacity(orders),
            bids: HashMap::with_capacity(orders.min(1 << 15)),
            asks: HashMap::with_capacity(orders.min(1 << 15)),
            bid_prices: Vec::new(),
            ask_prices: Vec::new(),
        }
    }

    /// Rests `order` on the bid side at its limit price. Returns the arena
    /// key for the engine's order index.
    pub(crate) fn insert_bid(&mut self, order: Order) -> usize {
        let price = order.price;
        let key = self.orders.insert(order);
        match self.bids.entry(price) {
            Entry::Occupied(mut level) => level.get_mut().orders.push(key),
            Entry::Vacant(slot) => {
                let mut level = PriceLevel::new(price);
                level.orders.push(key);
                slot.insert(level);
                insert_price_desc(&mut self.bid_prices, price);
            }
        }
        key
    }

    /// Rests `order` on the ask side at its limit price. Returns the arena
    /// key for the engine's order index.
    pub(crate) fn insert_ask(&mut self, order: Order) -> usize {
        let price = order.price;
        let key = self.orders.insert(order);
        match self.asks.entry(price) {
            Entry::Occupied(mut level) => level.get_mut().orders.push(key),
            Entry::Vacant(slot) => {
                let mut level = PriceLevel::new(price);
                level.orders.push(key);
                slot.insert(level);
                insert_price_asc(&mut self.ask_prices, price);
            }
        }
        key
    }

    /// Best bid price (None if the side is empty of levels).
    ///
    /// Levels survive until compaction, so a best price may belong to a
    /// level holding only tombstones.
    pub fn best_bid(&self) -> Option<Price> {
        self.bid_prices.first().copied()
    }

    /// Best ask price (None if the side is empty of levels).
    pub fn best_ask(&self) -> Option<Price> {
        self.ask_prices.first().copied()
    }

    /// Bid prices, best (highest) first.
    pub fn bid_prices(&self) -> &[Price] {
        &self.bid_prices
    }

    /// Ask prices, best (lowest) first.
    pub fn ask_prices(&self) -> &[Price] {
        &self.ask_prices
    }

    /// Number of bid levels. Always equal to `bid_prices().len()`.
    pub fn bid_level_count(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask levels. Always equal to `ask_prices().len()`.
    pub fn ask_level_count(&self) -> usize {
        self.asks.len()
    }

    /// Drops every level whose FIFO has been fully stepped over and frees
    /// the tombstones it retained. Price ordering is preserved; live levels
    /// are untouched. Idempotent, and never required for matching
    /// correctness.
    pub fn compact(&mut self) {
        Self::compact_side(&mut self.bids, &mut self.bid_prices, &mut self.orders);
        Self::compact_side(&mut self.asks, &mut self.ask_prices, &mut self.orders);
    }

    fn compact_side(
        levels: &mut HashMap<Price, PriceLevel>,
        prices: &mut Vec<Price>,
        arena: &mut Slab<Order>,
    ) {
        prices.retain(|price| {
            let drained = levels
                .get(price)
                .expect("price vector entry without a level")
                .is_drained();
            if drained {
                // head == len means every entry is a tombstone.
                let level = levels.remove(price).expect("level vanished during compaction");
                for key in level.orders {
                    arena.remove(key);
                }
            }
            !drained
        });
    }

    /// Exports the live resting orders in priority order: bids best-first,
    /// then asks best-first, FIFO within each level, tombstones skipped.
    pub fn resting_orders(&self) -> Vec<RestingOrder> {
        let mut out = Vec::new();
        for &price in &self.bid_prices {
            self.export_level(&self.bids[&price], Side::Buy, &mut out);
        }
        for &price in &self.ask_prices {
            self.export_level(&self.asks[&price], Side::Sell, &mut out);
        }
        out
    }

    fn export_level(&self, level: &PriceLevel, side: Side, out: &mut Vec<RestingOrder>) {
        for &key in &level.orders[level.head..] {
            let order = &self.orders[key];
            if order.is_tombstone() {
                continue;
            }
            out.push(RestingOrder {
                id: order.id,
                side,
                price: level.price,
                quantity: order.quantity,
                ts: order.ts,
            });
        }
    }
}

/// Splices `price` into a strictly-decreasing vector, keeping it sorted.
/// A price already present is left alone; the level map lookup makes that
/// unreachable from insertion.
fn insert_price_desc(prices: &mut Vec<Price>, price: Price) {
    let mut i = 0;
    while i < prices.len() && prices[i] > price {
        i += 1;
    }
    if i < prices.len() && prices[i] == price {
        return;
    }
    prices.insert(i, price);
}

/// Splices `price` into a strictly-increasing vector, keeping it sorted.
fn insert_price_asc(prices: &mut Vec<Price>, price: Price) {
    let mut i = 0;
    while i < prices.len() && prices[i] < price {
        i += 1;
    }
    if i < prices.len() && prices[i] == price {
        return;
    }
    prices.insert(i, price);
}
