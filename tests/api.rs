//! End-to-end tests against the router, no network involved.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use finvo::{config::Config, routes::create_router, state::AppState};

fn app() -> Router {
    create_router(AppState::new(Config::default()))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register_and_login(app: &Router) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/auth/register",
            json!({
                "name": "Demo User",
                "email": "demo@finvo.com",
                "password": "secret99",
                "phone": "+91-9876543210",
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_validates_fields() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/register",
            json!({ "name": "", "email": "nope", "password": "123", "phone": "" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn malformed_bodies_use_the_error_envelope() {
    let app = app();

    // Missing required fields must come back as a 400 validation envelope,
    // not axum's plain-text 422.
    let (status, body) = send(
        &app,
        post_json("/api/auth/register", json!({ "name": "x" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0]["msg"].is_string());

    // Same for bodies that are not JSON at all.
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0]["msg"].is_string());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = app();
    register_and_login(&app).await;
    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/register",
            json!({
                "name": "Demo User",
                "email": "demo@finvo.com",
                "password": "secret99",
                "phone": "+91-9876543210",
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_round_trip() {
    let app = app();
    register_and_login(&app).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({ "email": "demo@finvo.com", "password": "secret99" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({ "email": "demo@finvo.com", "password": "wrong" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn private_routes_require_a_token() {
    let app = app();
    let (status, _) = send(&app, get("/api/users/profile", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/users/profile", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_round_trip() {
    let app = app();
    let token = register_and_login(&app).await;

    let (status, _) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri("/api/users/profile")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(
                json!({ "age": 42, "riskTolerance": "high", "goals": ["retirement"] }).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/api/users/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["age"], 42);
    assert_eq!(body["profile"]["riskTolerance"], "high");
}

#[tokio::test]
async fn portfolio_lifecycle() {
    let app = app();
    let token = register_and_login(&app).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/portfolio/create",
            json!({
                "name": "My Investment Portfolio",
                "riskTolerance": "medium",
                "investmentAmount": 100000,
                "goals": ["retirement", "house"],
            }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let portfolio = &body["portfolio"];
    assert_eq!(portfolio["allocation"]["equity"], 50);
    assert_eq!(portfolio["expectedReturn"], 10.0);
    let id = portfolio["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get(&format!("/api/portfolio/{id}"), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["portfolio"]["holdings"].as_array().unwrap().len(), 4);
    assert!(body["portfolio"]["performance"]["currentValue"].is_number());

    let (status, _) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri(format!("/api/portfolio/{id}"))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(json!({ "riskTolerance": "high" }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get(&format!("/api/portfolio/{id}"), Some(&token))).await;
    assert_eq!(body["portfolio"]["allocation"]["equity"], 70);

    let (status, body) = send(
        &app,
        post_json(&format!("/api/portfolio/{id}/rebalance"), json!({}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rebalancePlan"]["estimatedTime"], "1-2 business days");

    let (status, body) = send(
        &app,
        get(&format!("/api/portfolio/{id}/performance"), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["performance"]["historicalData"].as_array().unwrap().len(),
        6
    );
}

#[tokio::test]
async fn unknown_portfolio_is_404() {
    let app = app();
    let token = register_and_login(&app).await;
    let (status, _) = send(
        &app,
        get(
            "/api/portfolio/00000000-0000-0000-0000-000000000000",
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn market_endpoints_are_public() {
    let app = app();
    let (status, body) = send(&app, get("/api/market/instruments", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["instruments"]["equity"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, get("/api/market/quotes?symbols=NIFTY50", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["quotes"]["NIFTY50"]["price"].is_number());
    assert!(body["quotes"].get("SENSEX").is_none());
}

#[tokio::test]
async fn recommendation_allocation_sums_to_100() {
    let app = app();
    let token = register_and_login(&app).await;
    let (status, body) = send(
        &app,
        post_json(
            "/api/ai/recommend-portfolio",
            json!({
                "userProfile": {
                    "age": 30,
                    "income": 800000,
                    "savings": 25000,
                    "riskTolerance": "medium",
                    "investmentHorizon": 10,
                },
                "financialGoals": [{ "type": "retirement" }, { "type": "emergency" }],
                "constraints": { "liquidity": "high" },
            }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let alloc = &body["recommendation"]["allocation"];
    let total = alloc["equity"].as_u64().unwrap()
        + alloc["debt"].as_u64().unwrap()
        + alloc["gold"].as_u64().unwrap()
        + alloc["cash"].as_u64().unwrap();
    assert_eq!(total, 100);
    assert_eq!(body["recommendation"]["rebalancingSchedule"], "Quarterly");
}

#[tokio::test]
async fn chat_requires_a_message() {
    let app = app();
    let token = register_and_login(&app).await;
    let (status, _) = send(
        &app,
        post_json("/api/ai/chat", json!({ "message": "  " }), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        post_json(
            "/api/ai/chat",
            json!({ "message": "how risky is my plan?" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["response"]["confidence"].is_number());
}

#[tokio::test]
async fn scenario_and_compare_endpoints() {
    let app = app();
    let token = register_and_login(&app).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/simulation/scenario",
            json!({
                "basePortfolio": {
                    "investmentAmount": 100000,
                    "expectedReturn": 10,
                    "riskTolerance": "medium",
                    "goals": [],
                },
                "scenarios": [
                    { "type": "market_crash" },
                    { "type": "salary_change", "parameters": { "change": 10 } },
                ],
            }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["simulationResults"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["riskMetrics"]["volatility"], 18.0);

    let strategy = |name: &str, risk: &str, ret: f64| {
        json!({
            "name": name,
            "allocation": { "equity": 50, "debt": 40, "gold": 5, "cash": 5 },
            "expectedReturn": ret,
            "riskTolerance": risk,
            "investmentAmount": 100000,
        })
    };

    let (status, _) = send(
        &app,
        post_json(
            "/api/simulation/compare",
            json!({ "portfolios": [strategy("solo", "low", 8.0)] }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        post_json(
            "/api/simulation/compare",
            json!({
                "portfolios": [
                    strategy("cautious", "low", 8.0),
                    strategy("punchy", "high", 12.0),
                ],
            }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // 8/8 beats 12/18 on Sharpe.
    assert_eq!(body["comparison"][0]["name"], "cautious");
    assert_eq!(body["recommendations"]["bestRiskAdjusted"]["name"], "cautious");
    assert_eq!(body["recommendations"]["mostAggressive"]["name"], "punchy");
}

#[tokio::test]
async fn monte_carlo_validates_simulation_count() {
    let app = app();
    let token = register_and_login(&app).await;

    let portfolio = json!({
        "investmentAmount": 100000,
        "expectedReturn": 10,
        "riskTolerance": "medium",
    });

    let (status, _) = send(
        &app,
        post_json(
            "/api/simulation/monte-carlo",
            json!({ "portfolio": portfolio, "simulations": 100 }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // An absurd horizon would overflow the compounding into infinity.
    let (status, _) = send(
        &app,
        post_json(
            "/api/simulation/monte-carlo",
            json!({ "portfolio": portfolio, "simulations": 1000, "timeHorizon": 1_000_000_000 }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        post_json(
            "/api/simulation/monte-carlo",
            json!({ "portfolio": portfolio, "simulations": 1000, "seed": 42 }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let p = &body["results"]["percentiles"];
    assert!(p["5th"].as_f64().unwrap() <= p["95th"].as_f64().unwrap());
    assert!(body["results"]["probabilityOfLoss"].is_number());

    // Same seed, same numbers.
    let (_, body2) = send(
        &app,
        post_json(
            "/api/simulation/monte-carlo",
            json!({ "portfolio": portfolio, "simulations": 1000, "seed": 42 }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(body["results"], body2["results"]);
}

#[tokio::test]
async fn planner_reports_six_buckets() {
    let app = app();
    let token = register_and_login(&app).await;
    let (status, body) = send(
        &app,
        post_json(
            "/api/portfolio/plan",
            json!({ "savings": 25000, "risk": "moderate", "goals": "wealth" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["portfolio"]["totalInvestment"], 150000);
    assert_eq!(body["portfolio"]["amounts"]["equity"], 52500);
    assert_eq!(body["portfolio"]["riskLevel"], "moderate");
}
