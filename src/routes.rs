use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // Everything behind a bearer token.
    let private = Router::new()
        .route("/api/auth/user", get(handlers::current_user))
        .route("/api/users/profile", get(handlers::get_profile))
        .route("/api/users/profile", put(handlers::update_profile))
        .route("/api/portfolio/create", post(handlers::create_portfolio))
        .route("/api/portfolio/plan", post(handlers::plan))
        .route("/api/portfolio/{id}", get(handlers::get_portfolio))
        .route("/api/portfolio/{id}", put(handlers::update_portfolio))
        .route("/api/portfolio/{id}/performance", get(handlers::portfolio_performance))
        .route("/api/portfolio/{id}/rebalance", post(handlers::rebalance_portfolio))
        .route("/api/ai/recommend-portfolio", post(handlers::recommend_portfolio))
        .route("/api/ai/chat", post(handlers::chat))
        .route("/api/ai/optimize", post(handlers::optimize))
        .route("/api/simulation/scenario", post(handlers::run_scenarios))
        .route("/api/simulation/compare", post(handlers::compare))
        .route("/api/simulation/monte-carlo", post(handlers::monte_carlo))
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/market/instruments", get(handlers::market_instruments))
        .route("/api/market/quotes", get(handlers::market_quotes))
        .merge(private)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}
