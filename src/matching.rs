//! Price-time priority matching.
//!
//! The matcher walks the opposite side's price vector best-first and each
//! crossable level's FIFO from its `head`. Price priority comes from the
//! vector order, time priority from the FIFO; ties in `ts` cannot occur
//! because the sequence counter is strictly monotonic. Tombstones
//! (canceled or zero-quantity orders) are stepped over in place by
//! advancing `head`, never removed here.
//!
//! Trades execute at the resting order's price, so aggressive orders get
//! price improvement. A limit remainder rests on its own side afterwards;
//! a market remainder is dropped.

use crate::engine::Engine;
use crate::trade::Trade;
use crate::types::{Order, OrderType, Price, Side};
use tracing::warn;

impl Engine {
    /// Runs one stamped order through the book, then rests any limit
    /// remainder. Shared by the live submit path and replay.
    pub(crate) fn match_order(&mut self, mut order: Order) {
        match order.side {
            Side::Buy => self.match_buy(&mut order),
            Side::Sell => self.match_sell(&mut order),
        }
        if order.quantity > 0 && order.order_type == OrderType::Limit {
            let key = match order.side {
                Side::Buy => self.book.insert_bid(order),
                Side::Sell => self.book.insert_ask(order),
            };
            self.order_index.insert(order.id, key);
        }
    }

    /// Walks the asks, lowest first. A level is crossable while its price
    /// does not exceed the order's limit; market orders ignore price
    /// entirely and cross until their quantity is exhausted.
    fn match_buy(&mut self, order: &mut Order) {
        let mut i = 0;
        while i < self.book.ask_prices.len() {
            let price = self.book.ask_prices[i];
            if order.quantity == 0 {
                break;
            }
            if order.order_type == OrderType::Limit && price > order.price {
                break;
            }
            self.sweep_level(order, Side::Sell, price);
            i += 1;
        }
    }

    /// Walks the bids, highest first. Mirror of [`Engine::match_buy`].
    fn match_sell(&mut self, order: &mut Order) {
        let mut i = 0;
        while i < self.book.bid_prices.len() {
            let price = self.book.bid_prices[i];
            if order.quantity == 0 {
                break;
            }
            if order.order_type == OrderType::Limit && price < order.price {
                break;
            }
            self.sweep_level(order, Side::Buy, price);
            i += 1;
        }
    }

    /// Matches `order` against one resting level until either side is done.
    /// `resting_side` names the side the level lives on.
    fn sweep_level(&mut self, order: &mut Order, resting_side: Side, price: Price) {
        loop {
            if order.quantity == 0 {
                break;
            }
            let key = {
                let level = match resting_side {
                    Side::Buy => self.book.bids.get_mut(&price),
                    Side::Sell => self.book.asks.get_mut(&price),
                }
                .expect("price vector entry without a level");
                let Some(&key) = level.orders.get(level.head) else {
                    break;
                };
                if self.book.orders[key].is_tombstone() {
                    level.head += 1;
                    continue;
                }
                key
            };
            self.execute_trade(order, key, price);
            if self.book.orders[key].quantity == 0 {
                self.advance_head(resting_side, price);
            }
        }
        let level = match resting_side {
            Side::Buy => self.book.bids.get_mut(&price),
            Side::Sell => self.book.asks.get_mut(&price),
        }
        .expect("price vector entry without a level");
        if level.is_drained() {
            level.exhausted = true;
        }
    }

    fn advance_head(&mut self, resting_side: Side, price: Price) {
        let level = match resting_side {
            Side::Buy => self.book.bids.get_mut(&price),
            Side::Sell => self.book.asks.get_mut(&price),
        }
        .expect("price vector entry without a level");
        level.head += 1;
    }

    /// Executes one trade between the incoming order and the resting order
    /// at `resting_key`, at the resting price. Notifies the sink, journals
    /// the record, then applies the quantity decrements. A fully filled
    /// resting order leaves the index; the incoming order was never in it.
    fn execute_trade(&mut self, incoming: &mut Order, resting_key: usize, price: Price) {
        let resting = &self.book.orders[resting_key];
        let quantity = incoming.quantity.min(resting.quantity);
        let (buy_id, sell_id) = match incoming.side {
            Side::Buy => (incoming.id, resting.id),
            Side::Sell => (resting.id, incoming.id),
        };
        let resting_id = resting.id;
        let trade = Trade {
            buy_id,
            sell_id,
            quantity,
            price,
            ts: self.seq,
        };

        self.on_trade.on_trade(&trade);
        if let Some(log) = self.log.as_mut() {
            if let Err(error) = log.append_trade(&trade) {
                warn!(%error, "event log append failed for trade");
            }
        }

        incoming.quantity -= quantity;
        let resting = &mut self.book.orders[resting_key];
        resting.quantity -= quantity;
        if resting.quantity == 0 {
            self.order_index.remove(&resting_id);
        }
    }
}
