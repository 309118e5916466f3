//! Core domain types and logic.

pub mod price_series;
pub mod indicator;
pub mod prepared;
pub mod position;
pub mod strategy;
pub mod simulation;
pub mod metrics;
pub mod optimizer;
pub mod backtest;
pub mod config_validation;
pub mod error;
