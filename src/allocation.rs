//! The allocation rule engine.
//!
//! One implementation of the rules that used to be duplicated across the
//! recommendation endpoint, the planner pages and the dashboard widgets:
//! age/risk driven four-bucket splits, six-bucket planner tables, goal
//! adjustments and the weighted-average expected return.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::profile::{Goal, RiskLevel};

// Per-bucket annual return assumptions (percent).
const EQUITY_RETURN: f64 = 12.0;
const DEBT_RETURN: f64 = 7.0;
const GOLD_RETURN: f64 = 8.0;
const CASH_RETURN: f64 = 4.0;

// Bounds on the age-based equity share.
const MIN_EQUITY: f64 = 20.0;
const MAX_EQUITY: f64 = 80.0;

// The planner invests a six-month buffer of monthly savings.
const INVESTABLE_MONTHS: f64 = 6.0;

/// Coarse four-bucket split in whole percent, summing to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub equity: u32,
    pub debt: u32,
    pub gold: u32,
    pub cash: u32,
}

impl Allocation {
    /// Tier-table allocation used when a portfolio is created without an
    /// age-specific recommendation.
    pub fn for_tier(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::High => Allocation { equity: 70, debt: 20, gold: 5, cash: 5 },
            RiskLevel::Medium => Allocation { equity: 50, debt: 40, gold: 5, cash: 5 },
            RiskLevel::Low => Allocation { equity: 30, debt: 60, gold: 5, cash: 5 },
        }
    }

    /// Allocation-weighted average of the per-bucket return assumptions,
    /// rounded to two decimals.
    pub fn expected_return(&self) -> f64 {
        let raw = (self.equity as f64 * EQUITY_RETURN
            + self.debt as f64 * DEBT_RETURN
            + self.gold as f64 * GOLD_RETURN
            + self.cash as f64 * CASH_RETURN)
            / 100.0;
        (raw * 100.0).round() / 100.0
    }

    pub fn total(&self) -> u32 {
        self.equity + self.debt + self.gold + self.cash
    }
}

/// Additive percentage-point shift applied per goal.
fn goal_delta(goal: Goal) -> (f64, f64, f64) {
    // (equity, debt, cash)
    match goal {
        Goal::Retirement => (5.0, -5.0, 0.0),
        Goal::House => (-5.0, 5.0, 0.0),
        Goal::Education => (-3.0, 3.0, 0.0),
        Goal::Emergency => (-10.0, 0.0, 10.0),
        Goal::Wealth | Goal::Other => (0.0, 0.0, 0.0),
    }
}

/// Build the age/risk/goal-driven four-bucket recommendation.
///
/// Equity starts from the `100 - age` rule clamped to [20, 80], is scaled by
/// the tier multiplier and capped at 80. Debt floors at 10, gold is pinned
/// at 5 and cash absorbs the remainder (floor 5). Goal deltas are applied
/// additively before the vector is normalized back to 100%.
pub fn recommend(age: u32, risk: RiskLevel, goals: &[Goal]) -> Allocation {
    let equity_base = (100.0 - age as f64).clamp(MIN_EQUITY, MAX_EQUITY);
    let m = risk.equity_multiplier();

    let mut equity = (equity_base * m).round().min(MAX_EQUITY);
    let mut debt = ((100.0 - equity_base) * (2.0 - m)).round().max(10.0);
    let gold = 5.0;
    let mut cash = (100.0 - (equity + debt + gold)).max(5.0);

    for goal in goals {
        let (de, dd, dc) = goal_delta(*goal);
        equity += de;
        debt += dd;
        cash += dc;
    }

    normalize([equity, debt, gold, cash])
}

/// Scale a possibly-skewed vector back to whole percents summing to 100.
/// The rounding residual lands on the equity bucket when it can absorb it,
/// otherwise on the largest bucket.
fn normalize(buckets: [f64; 4]) -> Allocation {
    let clamped: Vec<f64> = buckets.iter().map(|v| v.max(0.0)).collect();
    let total: f64 = clamped.iter().sum();
    if total <= 0.0 {
        warn!("allocation vector degenerated to zero, falling back to tier table");
        return Allocation::for_tier(RiskLevel::Medium);
    }

    let mut rounded: Vec<i64> = clamped
        .iter()
        .map(|v| (v / total * 100.0).round() as i64)
        .collect();
    let residual = 100 - rounded.iter().sum::<i64>();
    let sink = if rounded[0] + residual >= 0 {
        0
    } else {
        rounded
            .iter()
            .enumerate()
            .max_by_key(|(_, v)| **v)
            .map(|(i, _)| i)
            .unwrap_or(0)
    };
    rounded[sink] += residual;

    Allocation {
        equity: rounded[0] as u32,
        debt: rounded[1] as u32,
        gold: rounded[2] as u32,
        cash: rounded[3] as u32,
    }
}

/// Fine-grained six-bucket weights used by the planner report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanWeights {
    pub equity: f64,
    pub mutual_funds: f64,
    pub gold: f64,
    pub government_bonds: f64,
    pub high_liquid_fund: f64,
    pub savings_balance: f64,
}

impl PlanWeights {
    fn for_tier(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::Low => PlanWeights {
                equity: 0.20,
                mutual_funds: 0.30,
                gold: 0.15,
                government_bonds: 0.25,
                high_liquid_fund: 0.05,
                savings_balance: 0.05,
            },
            RiskLevel::Medium => PlanWeights {
                equity: 0.35,
                mutual_funds: 0.25,
                gold: 0.10,
                government_bonds: 0.20,
                high_liquid_fund: 0.05,
                savings_balance: 0.05,
            },
            RiskLevel::High => PlanWeights {
                equity: 0.50,
                mutual_funds: 0.20,
                gold: 0.10,
                government_bonds: 0.10,
                high_liquid_fund: 0.05,
                savings_balance: 0.05,
            },
        }
    }

    /// Goal nudges move five points between two buckets.
    fn adjust_for_goal(mut self, goal: Goal) -> Self {
        match goal {
            Goal::Retirement => {
                self.equity += 0.05;
                self.government_bonds -= 0.05;
            }
            Goal::House => {
                self.high_liquid_fund += 0.05;
                self.equity -= 0.05;
            }
            Goal::Education => {
                self.mutual_funds += 0.05;
                self.government_bonds -= 0.05;
            }
            Goal::Emergency | Goal::Wealth | Goal::Other => {}
        }
        self
    }

    pub fn total(&self) -> f64 {
        self.equity
            + self.mutual_funds
            + self.gold
            + self.government_bonds
            + self.high_liquid_fund
            + self.savings_balance
    }
}

/// Rupee amounts for each planner bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAmounts {
    pub equity: i64,
    pub mutual_funds: i64,
    pub gold: i64,
    pub government_bonds: i64,
    pub high_liquid_fund: i64,
    pub savings_balance: i64,
}

/// Indicative return range strings shown per horizon on the planner page.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReturnRange {
    #[serde(rename = "1y")]
    pub one_year: &'static str,
    #[serde(rename = "3y")]
    pub three_years: &'static str,
    #[serde(rename = "5y")]
    pub five_years: &'static str,
}

fn return_range(risk: RiskLevel) -> ReturnRange {
    match risk {
        RiskLevel::Low => ReturnRange { one_year: "6-8%", three_years: "8-10%", five_years: "10-12%" },
        RiskLevel::Medium => ReturnRange { one_year: "8-12%", three_years: "10-15%", five_years: "12-18%" },
        RiskLevel::High => ReturnRange { one_year: "12-18%", three_years: "15-22%", five_years: "18-25%" },
    }
}

/// Full planner output for one investor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPlan {
    pub total_investment: i64,
    pub amounts: PlanAmounts,
    pub allocation: PlanWeights,
    pub risk_level: &'static str,
    pub goal: &'static str,
    pub expected_returns: ReturnRange,
}

/// Six-bucket planner: invest six months of savings according to the tier
/// table, nudged for the stated goal.
pub fn plan_portfolio(monthly_savings: f64, risk: RiskLevel, goal: Goal) -> PortfolioPlan {
    let total = monthly_savings * INVESTABLE_MONTHS;
    let weights = PlanWeights::for_tier(risk).adjust_for_goal(goal);

    let amounts = PlanAmounts {
        equity: (total * weights.equity).round() as i64,
        mutual_funds: (total * weights.mutual_funds).round() as i64,
        gold: (total * weights.gold).round() as i64,
        government_bonds: (total * weights.government_bonds).round() as i64,
        high_liquid_fund: (total * weights.high_liquid_fund).round() as i64,
        savings_balance: (total * weights.savings_balance).round() as i64,
    };

    PortfolioPlan {
        total_investment: total.round() as i64,
        amounts,
        allocation: weights,
        risk_level: risk.tier_name(),
        goal: goal.as_str(),
        expected_returns: return_range(risk),
    }
}
