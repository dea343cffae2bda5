//! Stored portfolios and the reports derived from them: holdings breakdown,
//! performance figures and rebalancing plans.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use uuid::Uuid;

use crate::allocation::Allocation;
use crate::profile::{Goal, RiskLevel};

// Indicative annual return per bucket used in the holdings breakdown.
const BUCKET_RETURNS: [(&str, f64); 4] = [
    ("Equity Mutual Funds", 12.0),
    ("Debt Funds", 7.0),
    ("Gold ETF", 8.0),
    ("Cash", 0.0),
];

// Brokerage assumption applied to rebalancing turnover.
const TRADE_COST_RATE: f64 = 0.0025;

// Reference market return for the alpha figure.
const MARKET_RETURN: f64 = 10.0;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: Uuid,
    #[serde(skip)]
    pub owner: Uuid,
    pub name: String,
    pub risk_tolerance: RiskLevel,
    pub investment_amount: f64,
    pub goals: Vec<Goal>,
    pub time_horizon: u32,
    pub allocation: Allocation,
    pub expected_return: f64,
    pub created_at: String,
}

impl Portfolio {
    pub fn create(
        owner: Uuid,
        name: String,
        risk: RiskLevel,
        investment_amount: f64,
        goals: Vec<Goal>,
        time_horizon: Option<u32>,
    ) -> Self {
        Portfolio {
            id: Uuid::new_v4(),
            owner,
            name,
            risk_tolerance: risk,
            investment_amount,
            goals,
            time_horizon: time_horizon.unwrap_or(10),
            allocation: Allocation::for_tier(risk),
            expected_return: risk.base_expected_return(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    fn seed(&self) -> u64 {
        self.id.as_u128() as u64
    }

    pub fn holdings(&self) -> Vec<Holding> {
        let shares = [
            self.allocation.equity,
            self.allocation.debt,
            self.allocation.gold,
            self.allocation.cash,
        ];
        BUCKET_RETURNS
            .iter()
            .zip(shares)
            .map(|((asset, bucket_return), pct)| Holding {
                asset,
                allocation: pct,
                value: (self.investment_amount * pct as f64 / 100.0).round(),
                annual_return: *bucket_return,
            })
            .collect()
    }

    /// Deterministic performance report. The monthly series compounds the
    /// expected return with a volatility-scaled jitter seeded from the
    /// portfolio id, so repeated calls agree.
    pub fn performance(&self) -> PerformanceReport {
        let mut rng = StdRng::seed_from_u64(self.seed());
        let volatility = self.risk_tolerance.volatility();
        let monthly_rate = self.expected_return / 12.0;

        let mut value = self.investment_amount;
        let mut history = Vec::with_capacity(6);
        let start = Utc::now().format("%Y").to_string();
        history.push(HistoryPoint {
            date: format!("{start}-01"),
            value: value.round(),
            monthly_return: 0.0,
        });
        for month in 2..=6u32 {
            let jitter = (rng.random::<f64>() - 0.5) * volatility / 6.0;
            let r = monthly_rate + jitter;
            value *= 1.0 + r / 100.0;
            history.push(HistoryPoint {
                date: format!("{start}-{month:02}"),
                value: value.round(),
                monthly_return: (r * 100.0).round() / 100.0,
            });
        }

        let total_return = (value / self.investment_amount - 1.0) * 100.0;
        let beta = match self.risk_tolerance {
            RiskLevel::Low => 0.6,
            RiskLevel::Medium => 0.95,
            RiskLevel::High => 1.25,
        };
        let round2 = |v: f64| (v * 100.0).round() / 100.0;

        PerformanceReport {
            total_return: round2(total_return),
            annualized_return: self.expected_return,
            volatility,
            sharpe_ratio: round2(self.expected_return / volatility),
            max_drawdown: self.risk_tolerance.max_drawdown(),
            beta,
            alpha: round2(self.expected_return - beta * MARKET_RETURN),
            historical_data: history,
        }
    }

    /// Plan the trades that bring the (drifted) allocation back to target.
    /// When no target is given the portfolio's own allocation is the target.
    pub fn rebalance(&self, target: Option<Allocation>) -> RebalancePlan {
        let target = target.unwrap_or(self.allocation);
        let current = self.drifted_allocation();

        let pairs = [
            ("Equity", current.equity as i64, target.equity as i64),
            ("Debt", current.debt as i64, target.debt as i64),
            ("Gold", current.gold as i64, target.gold as i64),
            ("Cash", current.cash as i64, target.cash as i64),
        ];

        let mut trades = Vec::new();
        let mut turnover = 0.0;
        for (asset, cur, tgt) in pairs {
            let diff = cur - tgt;
            if diff == 0 {
                continue;
            }
            let amount = (self.investment_amount * diff.unsigned_abs() as f64 / 100.0).round();
            turnover += amount;
            trades.push(Trade {
                asset,
                action: if diff > 0 { "sell" } else { "buy" },
                amount,
                percentage: diff.unsigned_abs() as u32,
            });
        }

        RebalancePlan {
            portfolio_id: self.id,
            current_allocation: current,
            target_allocation: target,
            required_trades: trades,
            estimated_cost: (turnover * TRADE_COST_RATE).round(),
            estimated_time: "1-2 business days",
        }
    }

    /// Market drift since creation, modelled as a small deterministic shift
    /// between equity and debt seeded from the portfolio id.
    fn drifted_allocation(&self) -> Allocation {
        let mut rng = StdRng::seed_from_u64(self.seed());
        let drift = rng.random_range(-3i64..=3);
        let mut current = self.allocation;
        let equity = (current.equity as i64 + drift).clamp(0, 100);
        let debt = (current.debt as i64 - drift).clamp(0, 100);
        // Only apply the drift if both legs stay representable.
        if equity + debt == (current.equity + current.debt) as i64 {
            current.equity = equity as u32;
            current.debt = debt as u32;
        }
        current
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub asset: &'static str,
    pub allocation: u32,
    pub value: f64,
    #[serde(rename = "return")]
    pub annual_return: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub date: String,
    pub value: f64,
    #[serde(rename = "return")]
    pub monthly_return: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub beta: f64,
    pub alpha: f64,
    pub historical_data: Vec<HistoryPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub asset: &'static str,
    pub action: &'static str,
    pub amount: f64,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancePlan {
    pub portfolio_id: Uuid,
    pub current_allocation: Allocation,
    pub target_allocation: Allocation,
    pub required_trades: Vec<Trade>,
    pub estimated_cost: f64,
    pub estimated_time: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portfolio() -> Portfolio {
        Portfolio::create(
            Uuid::new_v4(),
            "My Investment Portfolio".into(),
            RiskLevel::Medium,
            100_000.0,
            vec![Goal::Retirement, Goal::House],
            Some(10),
        )
    }

    #[test]
    fn create_applies_tier_table() {
        let p = portfolio();
        assert_eq!(p.allocation, Allocation { equity: 50, debt: 40, gold: 5, cash: 5 });
        assert!((p.expected_return - 10.0).abs() < 1e-9);
        assert_eq!(p.time_horizon, 10);
    }

    #[test]
    fn holdings_cover_the_full_amount() {
        let p = portfolio();
        let holdings = p.holdings();
        assert_eq!(holdings.len(), 4);
        let total: f64 = holdings.iter().map(|h| h.value).sum();
        assert!((total - p.investment_amount).abs() < 2.0);
    }

    #[test]
    fn performance_is_deterministic_per_portfolio() {
        let p = portfolio();
        let a = p.performance();
        let b = p.performance();
        assert_eq!(a.total_return, b.total_return);
        assert_eq!(a.historical_data.len(), 6);
        assert_eq!(a.historical_data[0].monthly_return, 0.0);
    }

    #[test]
    fn rebalance_trades_offset_each_other() {
        let p = portfolio();
        let plan = p.rebalance(None);
        assert_eq!(plan.target_allocation, p.allocation);
        let bought: f64 = plan
            .required_trades
            .iter()
            .filter(|t| t.action == "buy")
            .map(|t| t.amount)
            .sum();
        let sold: f64 = plan
            .required_trades
            .iter()
            .filter(|t| t.action == "sell")
            .map(|t| t.amount)
            .sum();
        assert!((bought - sold).abs() < 1e-9);
        assert!(plan.estimated_cost >= 0.0);
    }

    #[test]
    fn rebalance_toward_explicit_target() {
        let p = portfolio();
        let target = Allocation { equity: 60, debt: 30, gold: 5, cash: 5 };
        let plan = p.rebalance(Some(target));
        assert_eq!(plan.target_allocation, target);
        // Drift is at most 3 points, so equity must be bought to reach 60.
        assert!(plan
            .required_trades
            .iter()
            .any(|t| t.asset == "Equity" && t.action == "buy"));
    }
}
