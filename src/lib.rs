pub mod api;
pub mod app;
pub mod client;
pub mod common;
pub mod config;
pub mod handlers;
pub mod log;
pub mod models;
pub mod notifications;
pub mod payments;
