//! finvo: a rule-based portfolio planning service.
//!
//! The engines live in [`allocation`], [`projection`] and [`simulation`];
//! everything else is the HTTP surface and its supporting state.

pub mod advisor;
pub mod allocation;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod market;
pub mod portfolio;
pub mod profile;
pub mod projection;
pub mod routes;
pub mod server;
pub mod simulation;
pub mod state;
