//! Rule-based advisory: recommendation assembly, keyword-routed chat and
//! portfolio optimization.

use serde::{Deserialize, Serialize};

use crate::allocation::{recommend, Allocation};
use crate::market::{Instrument, CATALOG};
use crate::profile::{parse_brief, Goal, InvestorProfile, RiskLevel};
use crate::projection::{liquidity_score, tax_efficiency};

/// A goal as submitted to the recommendation endpoint; extra fields such as
/// target amounts are accepted and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialGoal {
    #[serde(rename = "type")]
    pub goal_type: Goal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_years: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reasoning {
    pub age_based: String,
    pub risk_based: String,
    pub goal_based: String,
    pub constraints: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestedFunds {
    pub equity: Vec<Instrument>,
    pub debt: Vec<Instrument>,
    pub gold: Vec<Instrument>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxOptimization {
    pub suggestions: Vec<&'static str>,
    pub tax_efficient_allocation: TaxEfficientAllocation,
}

/// The base allocation with an ELSS carve-out from the equity share.
#[derive(Debug, Clone, Serialize)]
pub struct TaxEfficientAllocation {
    #[serde(flatten)]
    pub allocation: Allocation,
    pub elss: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub allocation: Allocation,
    pub expected_return: f64,
    pub risk_level: RiskLevel,
    pub reasoning: Reasoning,
    pub suggested_funds: SuggestedFunds,
    pub rebalancing_schedule: &'static str,
    pub tax_optimization: TaxOptimization,
}

/// Assemble the full recommendation for a profile and its goals.
pub fn recommend_portfolio(
    profile: &InvestorProfile,
    goals: &[FinancialGoal],
    constraints: &serde_json::Map<String, serde_json::Value>,
) -> Recommendation {
    let goal_types: Vec<Goal> = goals.iter().map(|g| g.goal_type).collect();
    let allocation = recommend(profile.age, profile.risk_tolerance, &goal_types);
    let equity_base = (100.0 - profile.age as f64).clamp(20.0, 80.0);

    let goal_names: Vec<&str> = goal_types.iter().map(|g| g.as_str()).collect();
    let constraint_names: Vec<&str> = constraints.keys().map(String::as_str).collect();

    Recommendation {
        expected_return: allocation.expected_return(),
        risk_level: profile.risk_tolerance,
        reasoning: Reasoning {
            age_based: format!(
                "Based on your age ({}), we recommend {}% equity allocation",
                profile.age, equity_base as u32
            ),
            risk_based: format!(
                "Your {} risk tolerance adjusts this by {}x",
                profile.risk_tolerance.as_str(),
                profile.risk_tolerance.equity_multiplier()
            ),
            goal_based: format!("Goals: {}", goal_names.join(", ")),
            constraints: format!("Considering your constraints: {}", constraint_names.join(", ")),
        },
        suggested_funds: SuggestedFunds {
            equity: CATALOG.equity.clone(),
            debt: CATALOG.debt.clone(),
            gold: CATALOG.gold.clone(),
        },
        rebalancing_schedule: "Quarterly",
        tax_optimization: TaxOptimization {
            suggestions: vec![
                "Consider ELSS for tax-saving under Section 80C",
                "Use index funds for lower tax on capital gains",
                "Hold equity funds for more than 1 year for LTCG benefits",
            ],
            tax_efficient_allocation: TaxEfficientAllocation {
                allocation,
                elss: (allocation.equity as f64 * 0.2).min(10.0),
            },
        },
        allocation,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub suggestions: Vec<String>,
    pub confidence: f64,
}

/// Keyword-routed advisor reply. Profile hints parsed out of the message
/// (age, savings, explicit risk words) sharpen the suggestions.
pub fn chat_reply(message: &str) -> ChatReply {
    let lower = message.to_lowercase();
    let hints = parse_brief(message);

    let mut reply = if lower.contains("risk") || lower.contains("safe") {
        ChatReply {
            message: "Based on your profile, I recommend a balanced approach. Consider \
                      diversifying across asset classes to manage risk while maintaining \
                      growth potential."
                .to_string(),
            suggestions: vec![
                "Review your risk tolerance assessment".to_string(),
                "Consider adding debt funds for stability".to_string(),
            ],
            confidence: 0.85,
        }
    } else if lower.contains("return") || lower.contains("profit") {
        ChatReply {
            message: "Expected returns depend on your asset allocation. Generally, higher \
                      equity exposure means higher potential returns but also higher risk."
                .to_string(),
            suggestions: vec![
                "Check your current allocation".to_string(),
                "Consider rebalancing if needed".to_string(),
            ],
            confidence: 0.90,
        }
    } else if lower.contains("tax") || lower.contains("saving") {
        ChatReply {
            message: "Tax optimization is crucial for maximizing returns. Consider ELSS \
                      funds, index funds, and holding periods for better tax efficiency."
                .to_string(),
            suggestions: vec![
                "Explore ELSS options".to_string(),
                "Review your holding periods".to_string(),
            ],
            confidence: 0.88,
        }
    } else {
        ChatReply {
            message: "I'm here to help with your investment decisions. Could you please \
                      provide more specific details about your question?"
                .to_string(),
            suggestions: vec![
                "Ask about risk management".to_string(),
                "Inquire about tax optimization".to_string(),
                "Get portfolio recommendations".to_string(),
            ],
            confidence: 0.70,
        }
    };

    if let Some(age) = hints.age {
        let tier = hints.risk.unwrap_or_else(|| RiskLevel::from_age(age));
        reply.suggestions.push(format!(
            "At {} a {} allocation is a common starting point",
            age,
            tier.tier_name()
        ));
    }
    if let Some(amount) = hints.monthly_amount {
        reply.suggestions.push(format!(
            "Investing ₹{:.0} monthly builds a ₹{:.0} buffer over six months",
            amount,
            amount * 6.0
        ));
    }

    reply
}

/// Optimization goal kinds understood by `optimize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationKind {
    TaxOptimization,
    RiskReduction,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationGoal {
    #[serde(rename = "type")]
    pub kind: OptimizationKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvements {
    pub expected_return_improvement: f64,
    pub risk_reduction: f64,
    pub tax_efficiency_improvement: f64,
    pub liquidity_improvement: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub action: &'static str,
    pub priority: &'static str,
    pub timeline: &'static str,
    pub impact: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimization {
    pub current_allocation: Allocation,
    pub optimized_allocation: Allocation,
    pub improvements: Improvements,
    pub action_plan: Vec<ActionItem>,
}

/// Shift the allocation toward each optimization goal and report the
/// resulting score deltas.
pub fn optimize(current: Allocation, goals: &[OptimizationGoal]) -> Optimization {
    let mut optimized = current;

    for goal in goals {
        match goal.kind {
            OptimizationKind::TaxOptimization => {
                optimized.equity = (current.equity + 5).min(80);
                optimized.debt = current.debt.saturating_sub(5).max(10);
            }
            OptimizationKind::RiskReduction => {
                optimized.equity = current.equity.saturating_sub(10).max(20);
                optimized.debt = (current.debt + 10).min(70);
            }
            OptimizationKind::Other => {}
        }
    }

    let round2 = |v: f64| (v * 100.0).round() / 100.0;
    let improvements = Improvements {
        expected_return_improvement: round2(
            optimized.expected_return() - current.expected_return(),
        ),
        // Equity points shed is the coarse risk proxy used everywhere else.
        risk_reduction: current.equity.saturating_sub(optimized.equity) as f64,
        tax_efficiency_improvement: round2(tax_efficiency(&optimized) - tax_efficiency(&current)),
        liquidity_improvement: round2(liquidity_score(&optimized) - liquidity_score(&current)),
    };

    Optimization {
        current_allocation: current,
        optimized_allocation: optimized,
        improvements,
        action_plan: vec![
            ActionItem { action: "Rebalance portfolio", priority: "High", timeline: "1 week", impact: "Medium" },
            ActionItem { action: "Add tax-efficient funds", priority: "Medium", timeline: "2 weeks", impact: "High" },
            ActionItem { action: "Review risk allocation", priority: "Low", timeline: "1 month", impact: "Medium" },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> InvestorProfile {
        InvestorProfile {
            name: Some("Demo User".into()),
            age: 30,
            income: 800_000.0,
            savings: 25_000.0,
            risk_tolerance: RiskLevel::Medium,
            investment_horizon: 10,
            goals: vec![],
        }
    }

    #[test]
    fn recommendation_carries_reasoning_and_funds() {
        let goals = vec![FinancialGoal {
            goal_type: Goal::Retirement,
            target_amount: None,
            horizon_years: None,
        }];
        let rec = recommend_portfolio(&profile(), &goals, &serde_json::Map::new());
        assert_eq!(rec.allocation.total(), 100);
        assert!(rec.reasoning.age_based.contains("30"));
        assert!(rec.reasoning.goal_based.contains("retirement"));
        assert!(!rec.suggested_funds.equity.is_empty());
        assert_eq!(rec.rebalancing_schedule, "Quarterly");
        assert!(rec.tax_optimization.tax_efficient_allocation.elss <= 10.0);
    }

    #[test]
    fn chat_routes_risk_questions() {
        let reply = chat_reply("Is my portfolio safe enough?");
        assert!(reply.message.contains("balanced approach"));
        assert!((reply.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn chat_routes_tax_questions() {
        let reply = chat_reply("How can I pay less tax?");
        assert!(reply.message.contains("ELSS"));
    }

    #[test]
    fn chat_falls_back_on_unknown_topics() {
        let reply = chat_reply("what's the weather like");
        assert!((reply.confidence - 0.70).abs() < 1e-9);
        assert_eq!(reply.suggestions.len(), 3);
    }

    #[test]
    fn chat_picks_up_profile_hints() {
        let reply = chat_reply("I'm a 28-year-old, how risky should I be?");
        assert!(reply
            .suggestions
            .iter()
            .any(|s| s.contains("28") && s.contains("aggressive")));
    }

    #[test]
    fn risk_reduction_sheds_equity() {
        let current = Allocation { equity: 60, debt: 30, gold: 5, cash: 5 };
        let goals = vec![OptimizationGoal { kind: OptimizationKind::RiskReduction }];
        let opt = optimize(current, &goals);
        assert_eq!(opt.optimized_allocation.equity, 50);
        assert_eq!(opt.optimized_allocation.debt, 40);
        assert_eq!(opt.improvements.risk_reduction, 10.0);
        // Less equity means a lower weighted return.
        assert!(opt.improvements.expected_return_improvement < 0.0);
    }

    #[test]
    fn tax_optimization_respects_caps() {
        let current = Allocation { equity: 78, debt: 12, gold: 5, cash: 5 };
        let goals = vec![OptimizationGoal { kind: OptimizationKind::TaxOptimization }];
        let opt = optimize(current, &goals);
        assert_eq!(opt.optimized_allocation.equity, 80);
        assert_eq!(opt.optimized_allocation.debt, 10);
    }
}
