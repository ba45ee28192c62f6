pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod merge;
pub mod middleware;
pub mod models;
pub mod state;
pub mod store;
