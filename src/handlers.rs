//! Request handlers and wire DTOs for every endpoint.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::advisor::{self, FinancialGoal, OptimizationGoal};
use crate::allocation::{self, Allocation};
use crate::auth::{self, CurrentUser, User};
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::market::CATALOG;
use crate::portfolio::Portfolio;
use crate::profile::{Goal, InvestorProfile, RiskLevel};
use crate::projection::{self, BasePortfolio, Scenario, Strategy};
use crate::simulation::{self, MonteCarloConfig, MAX_HORIZON_YEARS, MAX_SIMULATIONS, MIN_SIMULATIONS};
use crate::state::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "finvo", "timestamp": Utc::now().to_rfc3339() }))
}

// ---- auth ----

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

fn validate_register(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }
    if !req.email.contains('@') || !req.email.contains('.') {
        errors.push("Please include a valid email".to_string());
    }
    if req.password.len() < 6 {
        errors.push("Please enter a password with 6 or more characters".to_string());
    }
    if req.phone.trim().is_empty() {
        errors.push("Phone number is required".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn public_user(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "phone": user.phone,
    })
}

/// Profile a brand-new user starts with until they fill in their own.
fn starter_profile(name: &str) -> InvestorProfile {
    InvestorProfile {
        name: Some(name.to_string()),
        age: 30,
        income: 800_000.0,
        savings: 200_000.0,
        risk_tolerance: RiskLevel::Medium,
        investment_horizon: 10,
        goals: vec![Goal::Retirement, Goal::House],
    }
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> ApiResult<Json<Value>> {
    validate_register(&req)?;
    let email = req.email.trim().to_lowercase();

    if state.users.read().await.contains_key(&email) {
        return Err(ApiError::BadRequest("user already exists".to_string()));
    }

    // Argon2 is deliberately slow; keep it off the async workers and
    // outside the store lock.
    let password = req.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))??;

    let user = User {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        email: email.clone(),
        phone: req.phone.trim().to_string(),
        password_hash,
        profile: starter_profile(req.name.trim()),
        created_at: Utc::now().to_rfc3339(),
    };
    let token = auth::issue_token(&user, &state.config.jwt_secret, state.config.token_ttl_hours)?;
    let body = json!({ "success": true, "token": token, "user": public_user(&user) });

    let mut users = state.users.write().await;
    // Re-check: another registration may have landed while hashing.
    if users.contains_key(&email) {
        return Err(ApiError::BadRequest("user already exists".to_string()));
    }
    users.insert(email.clone(), user);
    info!(%email, "registered new user");

    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let email = req.email.trim().to_lowercase();
    let user = state
        .users
        .read()
        .await
        .get(&email)
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;

    // Verification is as slow as hashing; run it off the lock and off the
    // async workers.
    let password = req.password;
    let hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("verification task failed: {e}")))?;
    if !verified {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    let token = auth::issue_token(&user, &state.config.jwt_secret, state.config.token_ttl_hours)?;
    Ok(Json(json!({ "success": true, "token": token, "user": public_user(&user) })))
}

pub async fn current_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Value>> {
    let user = state
        .user_by_id(current.id)
        .await
        .ok_or_else(|| ApiError::NotFound("user no longer exists".to_string()))?;
    Ok(Json(json!({ "user": public_user(&user) })))
}

// ---- users ----

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Value>> {
    let user = state
        .user_by_id(current.id)
        .await
        .ok_or_else(|| ApiError::NotFound("user no longer exists".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "profile": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "phone": user.phone,
            "age": user.profile.age,
            "income": user.profile.income,
            "savings": user.profile.savings,
            "riskTolerance": user.profile.risk_tolerance,
            "investmentHorizon": user.profile.investment_horizon,
            "goals": user.profile.goals,
            "createdAt": user.created_at,
        }
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u32>,
    pub income: Option<f64>,
    pub savings: Option<f64>,
    pub risk_tolerance: Option<RiskLevel>,
    pub investment_horizon: Option<u32>,
    pub goals: Option<Vec<Goal>>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> ApiResult<Json<Value>> {
    if let Some(age) = req.age {
        if age == 0 || age > 120 {
            return Err(ApiError::validation("Age must be between 1 and 120"));
        }
    }

    let mut users = state.users.write().await;
    let user = users
        .get_mut(&current.email)
        .ok_or_else(|| ApiError::NotFound("user no longer exists".to_string()))?;

    if let Some(name) = req.name {
        user.name = name;
    }
    if let Some(phone) = req.phone {
        user.phone = phone;
    }
    if let Some(age) = req.age {
        user.profile.age = age;
    }
    if let Some(income) = req.income {
        user.profile.income = income;
    }
    if let Some(savings) = req.savings {
        user.profile.savings = savings;
    }
    if let Some(risk) = req.risk_tolerance {
        user.profile.risk_tolerance = risk;
    }
    if let Some(horizon) = req.investment_horizon {
        user.profile.investment_horizon = horizon;
    }
    if let Some(goals) = req.goals {
        user.profile.goals = goals;
    }

    Ok(Json(json!({ "success": true, "message": "Profile updated successfully" })))
}

// ---- portfolio ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioRequest {
    pub name: String,
    pub risk_tolerance: RiskLevel,
    pub investment_amount: f64,
    pub goals: Vec<Goal>,
    pub time_horizon: Option<u32>,
}

pub async fn create_portfolio(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(req): JsonBody<CreatePortfolioRequest>,
) -> ApiResult<Json<Value>> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("Portfolio name is required".to_string());
    }
    if !req.investment_amount.is_finite() || req.investment_amount <= 0.0 {
        errors.push("Investment amount must be positive".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let portfolio = Portfolio::create(
        current.id,
        req.name.trim().to_string(),
        req.risk_tolerance,
        req.investment_amount,
        req.goals,
        req.time_horizon,
    );
    let body = json!({ "success": true, "portfolio": &portfolio });
    state.portfolios.write().await.insert(portfolio.id, portfolio);

    Ok(Json(body))
}

async fn owned_portfolio(
    state: &AppState,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<Portfolio> {
    state
        .portfolios
        .read()
        .await
        .get(&id)
        .filter(|p| p.owner == current.id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("portfolio {id}")))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let portfolio = owned_portfolio(&state, &current, id).await?;
    let performance = portfolio.performance();
    let current_value = performance
        .historical_data
        .last()
        .map(|p| p.value)
        .unwrap_or(portfolio.investment_amount);
    let monthly_return = performance
        .historical_data
        .last()
        .map(|p| p.monthly_return)
        .unwrap_or(0.0);

    let mut body = serde_json::to_value(&portfolio)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    body["holdings"] = serde_json::to_value(portfolio.holdings())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    body["performance"] = json!({
        "currentValue": current_value,
        "totalReturn": performance.total_return,
        "monthlyReturn": monthly_return,
    });

    Ok(Json(json!({ "success": true, "portfolio": body })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortfolioRequest {
    pub name: Option<String>,
    pub risk_tolerance: Option<RiskLevel>,
    pub investment_amount: Option<f64>,
    pub goals: Option<Vec<Goal>>,
    pub time_horizon: Option<u32>,
}

pub async fn update_portfolio(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<UpdatePortfolioRequest>,
) -> ApiResult<Json<Value>> {
    if let Some(amount) = req.investment_amount {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ApiError::validation("Investment amount must be positive"));
        }
    }

    let mut portfolios = state.portfolios.write().await;
    let portfolio = portfolios
        .get_mut(&id)
        .filter(|p| p.owner == current.id)
        .ok_or_else(|| ApiError::NotFound(format!("portfolio {id}")))?;

    if let Some(name) = req.name {
        portfolio.name = name;
    }
    if let Some(amount) = req.investment_amount {
        portfolio.investment_amount = amount;
    }
    if let Some(goals) = req.goals {
        portfolio.goals = goals;
    }
    if let Some(horizon) = req.time_horizon {
        portfolio.time_horizon = horizon;
    }
    if let Some(risk) = req.risk_tolerance {
        // Changing tier re-derives the allocation and the return estimate.
        portfolio.risk_tolerance = risk;
        portfolio.allocation = Allocation::for_tier(risk);
        portfolio.expected_return = risk.base_expected_return();
    }

    Ok(Json(json!({
        "success": true,
        "message": "Portfolio updated successfully",
        "portfolioId": id,
    })))
}

pub async fn portfolio_performance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let portfolio = owned_portfolio(&state, &current, id).await?;
    Ok(Json(json!({ "success": true, "performance": portfolio.performance() })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceRequest {
    pub target_allocation: Option<Allocation>,
}

pub async fn rebalance_portfolio(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<RebalanceRequest>,
) -> ApiResult<Json<Value>> {
    if let Some(target) = req.target_allocation {
        if target.total() != 100 {
            return Err(ApiError::validation("Target allocation must sum to 100"));
        }
    }
    let portfolio = owned_portfolio(&state, &current, id).await?;
    Ok(Json(json!({ "success": true, "rebalancePlan": portfolio.rebalance(req.target_allocation) })))
}

// ---- market ----

pub async fn market_instruments() -> Json<Value> {
    Json(json!({ "success": true, "instruments": &*CATALOG }))
}

#[derive(Debug, Default, Deserialize)]
pub struct QuotesQuery {
    /// Optional comma-separated symbol filter.
    pub symbols: Option<String>,
}

pub async fn market_quotes(
    State(state): State<AppState>,
    Query(query): Query<QuotesQuery>,
) -> Json<Value> {
    let quotes = state.quotes.read().await;
    let filtered: serde_json::Map<String, Value> = match &query.symbols {
        Some(list) => {
            let wanted: Vec<String> = list
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            quotes
                .iter()
                .filter(|(sym, _)| wanted.contains(&sym.to_uppercase()))
                .map(|(sym, q)| (sym.clone(), json!(q)))
                .collect()
        }
        None => quotes.iter().map(|(sym, q)| (sym.clone(), json!(q))).collect(),
    };

    Json(json!({ "success": true, "quotes": filtered }))
}

// ---- advisor ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub user_profile: InvestorProfile,
    pub financial_goals: Vec<FinancialGoal>,
    #[serde(default)]
    pub constraints: serde_json::Map<String, Value>,
}

pub async fn recommend_portfolio(
    JsonBody(req): JsonBody<RecommendRequest>,
) -> ApiResult<Json<Value>> {
    if req.user_profile.age == 0 || req.user_profile.age > 120 {
        return Err(ApiError::validation("Age must be between 1 and 120"));
    }
    let recommendation =
        advisor::recommend_portfolio(&req.user_profile, &req.financial_goals, &req.constraints);
    Ok(Json(json!({ "success": true, "recommendation": recommendation })))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: serde_json::Map<String, Value>,
}

pub async fn chat(JsonBody(req): JsonBody<ChatRequest>) -> ApiResult<Json<Value>> {
    if req.message.trim().is_empty() {
        return Err(ApiError::validation("Message is required"));
    }
    let reply = advisor::chat_reply(&req.message);
    Ok(Json(json!({
        "success": true,
        "response": {
            "message": reply.message,
            "suggestions": reply.suggestions,
            "confidence": reply.confidence,
            "timestamp": Utc::now().to_rfc3339(),
        }
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPortfolio {
    pub allocation: Allocation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub current_portfolio: CurrentPortfolio,
    pub optimization_goals: Vec<OptimizationGoal>,
}

pub async fn optimize(JsonBody(req): JsonBody<OptimizeRequest>) -> ApiResult<Json<Value>> {
    let optimization = advisor::optimize(req.current_portfolio.allocation, &req.optimization_goals);
    Ok(Json(json!({ "success": true, "optimization": optimization })))
}

// ---- simulation ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRequest {
    pub base_portfolio: BasePortfolio,
    pub scenarios: Vec<Scenario>,
}

pub async fn run_scenarios(JsonBody(req): JsonBody<ScenarioRequest>) -> ApiResult<Json<Value>> {
    if req.scenarios.is_empty() {
        return Err(ApiError::validation("Scenarios array is required"));
    }
    let results = projection::run_scenarios(&req.base_portfolio, &req.scenarios);
    Ok(Json(json!({
        "success": true,
        "basePortfolio": req.base_portfolio,
        "simulationResults": results,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub portfolios: Vec<Strategy>,
    #[serde(default = "default_horizon")]
    pub time_horizon: u32,
}

fn default_horizon() -> u32 {
    10
}

fn validate_horizon(years: u32) -> Result<(), ApiError> {
    if !(1..=MAX_HORIZON_YEARS).contains(&years) {
        return Err(ApiError::validation(format!(
            "Time horizon must be between 1 and {MAX_HORIZON_YEARS} years"
        )));
    }
    Ok(())
}

pub async fn compare(JsonBody(req): JsonBody<CompareRequest>) -> ApiResult<Json<Value>> {
    if req.portfolios.len() < 2 {
        return Err(ApiError::validation("At least two portfolios are required"));
    }
    validate_horizon(req.time_horizon)?;
    let comparison = projection::compare_strategies(&req.portfolios, req.time_horizon);

    let most_conservative = comparison.iter().find(|p| p.risk_tolerance == RiskLevel::Low);
    let most_aggressive = comparison.iter().find(|p| p.risk_tolerance == RiskLevel::High);

    Ok(Json(json!({
        "success": true,
        "comparison": comparison,
        "timeHorizon": req.time_horizon,
        "recommendations": {
            "bestRiskAdjusted": comparison.first(),
            "mostConservative": most_conservative,
            "mostAggressive": most_aggressive,
        }
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloRequest {
    pub portfolio: BasePortfolio,
    pub simulations: usize,
    #[serde(default = "default_horizon")]
    pub time_horizon: u32,
    /// Optional fixed seed for reproducible results.
    pub seed: Option<u64>,
}

pub async fn monte_carlo(JsonBody(req): JsonBody<MonteCarloRequest>) -> ApiResult<Json<Value>> {
    if !(MIN_SIMULATIONS..=MAX_SIMULATIONS).contains(&req.simulations) {
        return Err(ApiError::validation(format!(
            "Number of simulations must be between {MIN_SIMULATIONS} and {MAX_SIMULATIONS}"
        )));
    }
    validate_horizon(req.time_horizon)?;
    if req.portfolio.investment_amount <= 0.0 {
        return Err(ApiError::validation("Investment amount must be positive"));
    }

    let config = MonteCarloConfig {
        simulations: req.simulations,
        horizon_years: req.time_horizon,
        seed: req.seed,
    };
    let results = simulation::run_monte_carlo(
        req.portfolio.investment_amount,
        req.portfolio.expected_return,
        req.portfolio.risk_tolerance,
        &config,
    );

    Ok(Json(json!({
        "success": true,
        "portfolio": req.portfolio,
        "simulations": req.simulations,
        "timeHorizon": req.time_horizon,
        "results": results,
    })))
}

// ---- planner ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    /// Monthly savings in rupees.
    pub savings: f64,
    #[serde(default)]
    pub risk: RiskLevel,
    #[serde(default = "default_goal")]
    pub goals: Goal,
}

fn default_goal() -> Goal {
    Goal::Wealth
}

/// The six-bucket planner report that the legacy static pages computed
/// client-side.
pub async fn plan(JsonBody(req): JsonBody<PlanRequest>) -> ApiResult<Json<Value>> {
    if !req.savings.is_finite() || req.savings <= 0.0 {
        return Err(ApiError::validation("Monthly savings must be positive"));
    }
    let plan = allocation::plan_portfolio(req.savings, req.risk, req.goals);
    Ok(Json(json!({ "success": true, "portfolio": plan })))
}
