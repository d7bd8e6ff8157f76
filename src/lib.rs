pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod idempotency;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;
