//! Synthetic command-stream generator.
//!
//! Deterministic, configurable stream of submits and cancels for property
//! tests, replay tests, and benchmarks. Same config (including seed) ⇒
//! same stream. Cancels target previously generated ids and may hit orders
//! that have since filled, which exercises the engine's tolerated-cancel
//! path end to end.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::types::{Order, OrderId, OrderType, Price, Quantity, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One engine command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Submit(Order),
    Cancel(OrderId),
}

/// Configuration for the generator. All ranges are inclusive.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// RNG seed. Same seed ⇒ same command stream.
    pub seed: u64,
    /// Number of commands to generate.
    pub num_commands: usize,
    /// Probability of Buy (0.0..=1.0). Sell otherwise.
    pub buy_ratio: f64,
    /// Probability of a Limit order (0.0..=1.0). Market otherwise.
    pub limit_ratio: f64,
    /// Probability a command is a cancel of an earlier id, once any exist.
    pub cancel_ratio: f64,
    /// Limit price range in ticks.
    pub price_min: Price,
    pub price_max: Price,
    /// Quantity range in units.
    pub quantity_min: Quantity,
    pub quantity_max: Quantity,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            num_commands: 1000,
            buy_ratio: 0.5,
            limit_ratio: 0.9,
            cancel_ratio: 0.1,
            price_min: 95,
            price_max: 105,
            quantity_min: 1,
            quantity_max: 100,
        }
    }
}

/// Deterministic command stream. Create with [`Generator::new`]; pull
/// commands with [`Generator::next_command`] or [`Generator::all_commands`].
pub struct Generator {
    rng: StdRng,
    config: GeneratorConfig,
    next_order_id: u64,
    submitted: Vec<OrderId>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            rng,
            config,
            next_order_id: 1,
            submitted: Vec::new(),
        }
    }

    /// Generates the next command, advancing the RNG and id counter.
    pub fn next_command(&mut self) -> Command {
        if !self.submitted.is_empty() && self.rng.gen::<f64>() < self.config.cancel_ratio {
            let target = self.submitted[self.rng.gen_range(0..self.submitted.len())];
            return Command::Cancel(target);
        }

        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        self.submitted.push(id);

        let side = if self.rng.gen::<f64>() < self.config.buy_ratio {
            Side::Buy
        } else {
            Side::Sell
        };
        let order = if self.rng.gen::<f64>() < self.config.limit_ratio {
            let price = self.rng.gen_range(self.config.price_min..=self.config.price_max);
            let quantity = self.rng.gen_range(self.config.quantity_min..=self.config.quantity_max);
            Order::limit(id, side, price, quantity)
        } else {
            let quantity = self.rng.gen_range(self.config.quantity_min..=self.config.quantity_max);
            Order::new(id, side, OrderType::Market, 0, quantity)
        };
        Command::Submit(order)
    }

    /// The full stream, as sized by `config.num_commands`.
    pub fn all_commands(&mut self) -> Vec<Command> {
        (0..self.config.num_commands).map(|_| self.next_command()).collect()
    }
}

/// Applies a command stream to the engine. Cancels of ids that have already
/// filled or been canceled are expected in generated streams and ignored;
/// submit failures are surfaced.
pub fn drive(engine: &mut Engine, commands: impl IntoIterator<Item = Command>) -> Result<(), EngineError> {
    for command in commands {
        match command {
            Command::Submit(order) => engine.submit(order)?,
            Command::Cancel(id) => match engine.cancel(id) {
                Ok(()) | Err(EngineError::OrderNotFound(_)) => {}
                Err(e) => return Err(e),
            },
        }
    }
    Ok(())
}
