//! Library entrypoint for the Artista admin API.
//!
//! Kept separate from `main.rs` so integration tests under `tests/` can build
//! the app state, routers, controllers and services directly.

pub mod config;
pub mod error;
pub mod models;

#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub settings: config::Settings,
    pub rates: services::exchange_rate::ExchangeRateClient,
}
