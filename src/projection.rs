//! Compound-growth projections, what-if scenarios and strategy comparison.

use serde::{Deserialize, Serialize};

use crate::allocation::Allocation;
use crate::profile::{Goal, RiskLevel};

/// Value of `amount` compounded at `rate_pct` percent per year for `years`.
pub fn project_value(amount: f64, rate_pct: f64, years: u32) -> f64 {
    amount * (1.0 + rate_pct / 100.0).powi(years as i32)
}

/// Projections at the standard reporting horizons.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProjectedValue {
    #[serde(rename = "1_year")]
    pub one_year: f64,
    #[serde(rename = "3_years")]
    pub three_years: f64,
    #[serde(rename = "5_years")]
    pub five_years: f64,
    #[serde(rename = "10_years")]
    pub ten_years: f64,
}

impl ProjectedValue {
    pub fn of(amount: f64, rate_pct: f64) -> Self {
        ProjectedValue {
            one_year: project_value(amount, rate_pct, 1),
            three_years: project_value(amount, rate_pct, 3),
            five_years: project_value(amount, rate_pct, 5),
            ten_years: project_value(amount, rate_pct, 10),
        }
    }
}

/// Tier-derived risk figures reported alongside every projection.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub volatility: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
}

impl RiskMetrics {
    pub fn for_tier(risk: RiskLevel, expected_return: f64) -> Self {
        let volatility = risk.volatility();
        RiskMetrics {
            volatility,
            max_drawdown: risk.max_drawdown(),
            sharpe_ratio: expected_return / volatility,
        }
    }
}

/// The portfolio a scenario starts from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePortfolio {
    #[serde(default)]
    pub name: Option<String>,
    pub investment_amount: f64,
    pub expected_return: f64,
    #[serde(default)]
    pub risk_tolerance: RiskLevel,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

/// What-if scenario kinds. Unknown kinds are rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    SalaryChange,
    MarketCrash,
    GoalChange,
    RiskAdjustment,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioParams {
    /// Salary change in percent (positive or negative).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(rename = "type")]
    pub scenario_type: ScenarioType,
    #[serde(default)]
    pub parameters: ScenarioParams,
}

/// Result of applying one scenario to the base portfolio.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub scenario_id: usize,
    pub scenario_type: ScenarioType,
    pub parameters: ScenarioParams,
    pub modified_portfolio: BasePortfolio,
    pub projected_value: ProjectedValue,
    pub risk_metrics: RiskMetrics,
}

/// Apply each scenario to a copy of the base portfolio.
///
/// The adjustments are the planner's coarse rules: a salary change scales
/// the invested amount and shifts the return by +0.5/-0.3, a market crash
/// knocks 15 points off the return and forces the high-risk tier, goal and
/// risk changes shift the return by the fixed deltas.
pub fn run_scenarios(base: &BasePortfolio, scenarios: &[Scenario]) -> Vec<ScenarioOutcome> {
    scenarios
        .iter()
        .enumerate()
        .map(|(index, scenario)| {
            let mut modified = base.clone();
            let mut expected_return = base.expected_return;
            let mut risk = base.risk_tolerance;

            match scenario.scenario_type {
                ScenarioType::SalaryChange => {
                    let change = scenario.parameters.change.unwrap_or(0.0);
                    modified.investment_amount *= 1.0 + change / 100.0;
                    expected_return += if change > 0.0 { 0.5 } else { -0.3 };
                }
                ScenarioType::MarketCrash => {
                    expected_return -= 15.0;
                    risk = RiskLevel::High;
                }
                ScenarioType::GoalChange => {
                    if let Some(goal) = scenario.parameters.goal {
                        modified.goals.push(goal);
                        match goal {
                            Goal::Retirement => expected_return += 1.0,
                            Goal::House => expected_return -= 0.5,
                            _ => {}
                        }
                    }
                }
                ScenarioType::RiskAdjustment => {
                    if let Some(new_risk) = scenario.parameters.new_risk_level {
                        risk = new_risk;
                        match new_risk {
                            RiskLevel::High => expected_return += 2.0,
                            RiskLevel::Low => expected_return -= 2.0,
                            RiskLevel::Medium => {}
                        }
                    }
                }
            }

            modified.expected_return = expected_return;
            modified.risk_tolerance = risk;

            ScenarioOutcome {
                scenario_id: index + 1,
                scenario_type: scenario.scenario_type,
                parameters: scenario.parameters.clone(),
                projected_value: ProjectedValue::of(modified.investment_amount, expected_return),
                risk_metrics: RiskMetrics::for_tier(risk, expected_return),
                modified_portfolio: modified,
            }
        })
        .collect()
}

/// Share of the allocation held in tax-efficient instruments.
pub fn tax_efficiency(alloc: &Allocation) -> f64 {
    (alloc.equity as f64 * 0.8 + alloc.gold as f64 * 0.6).min(100.0)
}

/// How quickly the allocation can be turned into cash.
pub fn liquidity_score(alloc: &Allocation) -> f64 {
    (alloc.cash as f64 + alloc.equity as f64 * 0.9 + alloc.debt as f64 * 0.7).min(100.0)
}

/// A named strategy submitted for comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub name: String,
    pub allocation: Allocation,
    pub expected_return: f64,
    #[serde(default)]
    pub risk_tolerance: RiskLevel,
    pub investment_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyReport {
    pub portfolio_id: usize,
    pub name: String,
    pub allocation: Allocation,
    pub expected_return: f64,
    pub risk_tolerance: RiskLevel,
    pub projected_value: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub risk_adjusted_return: f64,
    pub tax_efficiency: f64,
    pub liquidity_score: f64,
}

/// Score each strategy over `horizon` years and rank by Sharpe ratio,
/// best first.
pub fn compare_strategies(strategies: &[Strategy], horizon: u32) -> Vec<StrategyReport> {
    let mut reports: Vec<StrategyReport> = strategies
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let volatility = s.risk_tolerance.volatility();
            let sharpe = s.expected_return / volatility;
            StrategyReport {
                portfolio_id: index + 1,
                name: s.name.clone(),
                allocation: s.allocation,
                expected_return: s.expected_return,
                risk_tolerance: s.risk_tolerance,
                projected_value: project_value(s.investment_amount, s.expected_return, horizon),
                volatility,
                sharpe_ratio: sharpe,
                risk_adjusted_return: sharpe,
                tax_efficiency: tax_efficiency(&s.allocation),
                liquidity_score: liquidity_score(&s.allocation),
            }
        })
        .collect();

    reports.sort_by(|a, b| {
        b.sharpe_ratio
            .partial_cmp(&a.sharpe_ratio)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    reports
}
