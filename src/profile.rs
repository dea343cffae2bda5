//! Investor profiles: risk tiers, financial goals and free-text brief parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Risk tolerance tier. The wire vocabulary is `low`/`medium`/`high`; the
/// planner pages historically used `conservative`/`moderate`/`aggressive`,
/// accepted here as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[serde(alias = "conservative")]
    Low,
    #[default]
    #[serde(alias = "moderate", alias = "balanced")]
    Medium,
    #[serde(alias = "aggressive")]
    High,
}

impl RiskLevel {
    /// Annualized volatility assumption in percent.
    pub fn volatility(self) -> f64 {
        match self {
            RiskLevel::Low => 8.0,
            RiskLevel::Medium => 12.0,
            RiskLevel::High => 18.0,
        }
    }

    /// Worst historical drawdown assumption in percent.
    pub fn max_drawdown(self) -> f64 {
        match self {
            RiskLevel::Low => -8.0,
            RiskLevel::Medium => -15.0,
            RiskLevel::High => -25.0,
        }
    }

    /// Baseline expected annual return for a tier-table portfolio.
    pub fn base_expected_return(self) -> f64 {
        match self {
            RiskLevel::Low => 8.0,
            RiskLevel::Medium => 10.0,
            RiskLevel::High => 12.0,
        }
    }

    /// Multiplier applied to the age-based equity share.
    pub fn equity_multiplier(self) -> f64 {
        match self {
            RiskLevel::Low => 0.7,
            RiskLevel::Medium => 1.0,
            RiskLevel::High => 1.3,
        }
    }

    /// Planner-page vocabulary for this tier.
    pub fn tier_name(self) -> &'static str {
        match self {
            RiskLevel::Low => "conservative",
            RiskLevel::Medium => "moderate",
            RiskLevel::High => "aggressive",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Age-based fallback when no explicit tolerance is given.
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=39 => RiskLevel::High,
            40..=59 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

/// A financial goal. Unknown goal strings deserialize to `Other` and carry
/// no allocation adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Retirement,
    House,
    Education,
    Emergency,
    Wealth,
    #[serde(other)]
    Other,
}

impl Goal {
    pub fn as_str(self) -> &'static str {
        match self {
            Goal::Retirement => "retirement",
            Goal::House => "house",
            Goal::Education => "education",
            Goal::Emergency => "emergency",
            Goal::Wealth => "wealth",
            Goal::Other => "other",
        }
    }
}

/// Everything the engines need to know about an investor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorProfile {
    #[serde(default)]
    pub name: Option<String>,
    pub age: u32,
    /// Annual income in rupees.
    pub income: f64,
    /// Monthly savings in rupees.
    pub savings: f64,
    #[serde(default)]
    pub risk_tolerance: RiskLevel,
    /// Years until the money is needed.
    #[serde(default = "default_horizon")]
    pub investment_horizon: u32,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

fn default_horizon() -> u32 {
    10
}

static AGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)[\s-]*(?:year[\s-]*old|years?\s+old)").unwrap());
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:save|saves|saving|invest|investing)\D{0,20}?[₹$]?\s*([0-9][0-9,]*)").unwrap()
});

/// Pull profile hints out of a free-text brief such as an advisor chat
/// message. Anything the text does not mention stays `None`.
#[derive(Debug, Default, PartialEq)]
pub struct BriefHints {
    pub age: Option<u32>,
    pub monthly_amount: Option<f64>,
    pub risk: Option<RiskLevel>,
}

pub fn parse_brief(text: &str) -> BriefHints {
    let lower = text.to_lowercase();

    let age = AGE_RE
        .captures(&lower)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    let monthly_amount = AMOUNT_RE
        .captures(&lower)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok());

    // Explicit mentions win over the age heuristic.
    let risk = if lower.contains("conservative")
        || lower.contains("risk averse")
        || lower.contains("risk-averse")
        || lower.contains("low risk")
    {
        Some(RiskLevel::Low)
    } else if lower.contains("aggressive")
        || lower.contains("high risk")
        || lower.contains("risk seeking")
        || lower.contains("risk-seeking")
    {
        Some(RiskLevel::High)
    } else if lower.contains("moderate") || lower.contains("balanced") || lower.contains("medium risk")
    {
        Some(RiskLevel::Medium)
    } else {
        age.map(RiskLevel::from_age)
    };

    BriefHints {
        age,
        monthly_amount,
        risk,
    }
}
