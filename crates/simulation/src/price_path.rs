use clmm_vault_domain::Price;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Source of target prices for a trading simulation.
pub trait PricePathGenerator {
    fn generate(&mut self, steps: usize) -> Vec<Price>;
}

/// Geometric Brownian motion with a seeded generator, so runs repeat.
pub struct GeometricBrownianMotion {
    pub initial_price: Decimal,
    pub drift: f64,      // annualized drift (mu)
    pub volatility: f64, // annualized volatility (sigma)
    pub time_step: f64,  // time step in years (dt) e.g. 1/365 for daily
    rng: StdRng,
}

impl GeometricBrownianMotion {
    pub fn new(initial_price: Decimal, drift: f64, volatility: f64, time_step: f64, seed: u64) -> Self {
        Self {
            initial_price,
            drift,
            volatility,
            time_step,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PricePathGenerator for GeometricBrownianMotion {
    fn generate(&mut self, steps: usize) -> Vec<Price> {
        let mut prices = Vec::with_capacity(steps + 1);
        prices.push(Price::new(self.initial_price));

        let Ok(normal) = Normal::new(0.0, 1.0) else {
            return prices;
        };

        let dt = self.time_step;
        let drift_term = (self.drift - 0.5 * self.volatility.powi(2)) * dt;
        let vol_term = self.volatility * dt.sqrt();

        let mut current_price = self.initial_price.to_f64().unwrap_or(0.0);

        for _ in 0..steps {
            let z: f64 = normal.sample(&mut self.rng);
            current_price *= (drift_term + vol_term * z).exp();

            let p = Decimal::from_f64(current_price).unwrap_or(Decimal::ZERO);
            prices.push(Price::new(p));
        }

        prices
    }
}
