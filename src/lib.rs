pub mod app;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod iprange;
pub mod middleware;
pub mod reports;
pub mod services;
