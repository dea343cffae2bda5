//! Monte Carlo terminal-value simulation.
//!
//! Each run draws a uniform annual return centered on the expected return
//! with a spread of one tier-volatility, compounds it over the horizon and
//! records the terminal value. The summary reports percentiles taken at
//! `floor(n * p)` over the sorted terminal values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::profile::RiskLevel;
use crate::projection::project_value;

pub const MIN_SIMULATIONS: usize = 1_000;
pub const MAX_SIMULATIONS: usize = 10_000;

/// Longest horizon the compounding stays numerically meaningful for.
pub const MAX_HORIZON_YEARS: u32 = 50;

#[derive(Debug, Clone, Copy)]
pub struct MonteCarloConfig {
    pub simulations: usize,
    pub horizon_years: u32,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        MonteCarloConfig {
            simulations: MIN_SIMULATIONS,
            horizon_years: 10,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Percentiles {
    #[serde(rename = "5th")]
    pub p5: f64,
    #[serde(rename = "25th")]
    pub p25: f64,
    #[serde(rename = "50th")]
    pub p50: f64,
    #[serde(rename = "75th")]
    pub p75: f64,
    #[serde(rename = "95th")]
    pub p95: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloSummary {
    pub percentiles: Percentiles,
    /// Share of runs ending below the invested amount, in percent.
    pub probability_of_loss: f64,
    pub expected_value: f64,
    pub min_value: f64,
    pub max_value: f64,
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    let idx = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

pub fn run_monte_carlo(
    amount: f64,
    expected_return: f64,
    risk: RiskLevel,
    config: &MonteCarloConfig,
) -> MonteCarloSummary {
    let volatility = risk.volatility();
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut finals: Vec<f64> = (0..config.simulations)
        .map(|_| {
            let annual_return = expected_return + (rng.random::<f64>() - 0.5) * volatility;
            project_value(amount, annual_return, config.horizon_years)
        })
        .collect();

    finals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = finals.len();
    let losses = finals.iter().filter(|&&v| v < amount).count();

    MonteCarloSummary {
        percentiles: Percentiles {
            p5: percentile(&finals, 0.05),
            p25: percentile(&finals, 0.25),
            p50: percentile(&finals, 0.50),
            p75: percentile(&finals, 0.75),
            p95: percentile(&finals, 0.95),
        },
        probability_of_loss: losses as f64 / n as f64 * 100.0,
        expected_value: finals.iter().sum::<f64>() / n as f64,
        min_value: finals.first().copied().unwrap_or(amount),
        max_value: finals.last().copied().unwrap_or(amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> MonteCarloConfig {
        MonteCarloConfig {
            simulations: MIN_SIMULATIONS,
            horizon_years: 10,
            seed: Some(seed),
        }
    }

    #[test]
    fn same_seed_same_summary() {
        let a = run_monte_carlo(100_000.0, 10.0, RiskLevel::Medium, &config(42));
        let b = run_monte_carlo(100_000.0, 10.0, RiskLevel::Medium, &config(42));
        assert_eq!(a.percentiles.p50, b.percentiles.p50);
        assert_eq!(a.expected_value, b.expected_value);
        assert_eq!(a.probability_of_loss, b.probability_of_loss);
    }

    #[test]
    fn terminal_values_stay_within_return_bounds() {
        let cfg = config(7);
        let summary = run_monte_carlo(100_000.0, 10.0, RiskLevel::Medium, &cfg);
        // Annual draw is bounded by expected +/- volatility/2 = 10 +/- 6.
        let lo = project_value(100_000.0, 4.0, cfg.horizon_years);
        let hi = project_value(100_000.0, 16.0, cfg.horizon_years);
        assert!(summary.min_value >= lo - 1e-6);
        assert!(summary.max_value <= hi + 1e-6);
    }

    #[test]
    fn percentiles_are_monotonic() {
        let s = run_monte_carlo(50_000.0, 12.0, RiskLevel::High, &config(99));
        let p = s.percentiles;
        assert!(p.p5 <= p.p25 && p.p25 <= p.p50 && p.p50 <= p.p75 && p.p75 <= p.p95);
        assert!(s.min_value <= p.p5 && p.p95 <= s.max_value);
        assert!((0.0..=100.0).contains(&s.probability_of_loss));
    }

    #[test]
    fn positive_drift_rarely_loses_over_long_horizons() {
        // 10% expected with 8-point spread cannot produce a losing decade.
        let s = run_monte_carlo(100_000.0, 10.0, RiskLevel::Low, &config(1));
        assert_eq!(s.probability_of_loss, 0.0);
        assert!(s.expected_value > 100_000.0);
    }
}
