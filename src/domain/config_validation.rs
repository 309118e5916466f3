//! Configuration validation.
//!
//! Validates config sections before a run and provides the typed key
//! parsers the CLI builds its run configs from.

use crate::domain::error::FimateError;
use crate::domain::optimizer::{Objective, ParamRange, ParameterGrid};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_START_DATE: &str = "2020-01-01";
pub const DEFAULT_END_DATE: &str = "2024-01-01";

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), FimateError> {
    require(config, "data", "ticker")?;
    parse_date_range(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), FimateError> {
    parse_window(config, "strategy", "sma_fast")?;
    parse_window(config, "strategy", "sma_slow")?;
    Ok(())
}

pub fn validate_optimize_config(config: &dyn ConfigPort) -> Result<(), FimateError> {
    let fast = parse_range(config, "optimize", "sma_fast_range")?;
    let slow = parse_range(config, "optimize", "sma_slow_range")?;
    ParameterGrid::new(fast, slow).validate().map_err(|e| match e {
        FimateError::InvalidParameter { reason, .. } => {
            FimateError::config_invalid("optimize", "sma_slow_range", reason)
        }
        other => other,
    })?;
    parse_objective(config)?;
    Ok(())
}

pub fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, FimateError> {
    config
        .get_non_empty(section, key)
        .ok_or_else(|| FimateError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

/// `[data] start_date` and `end_date`, defaulting when absent. The start
/// must precede the end.
pub fn parse_date_range(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), FimateError> {
    let start = parse_date(config, "start_date", DEFAULT_START_DATE)?;
    let end = parse_date(config, "end_date", DEFAULT_END_DATE)?;
    if start >= end {
        return Err(FimateError::config_invalid(
            "data",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok((start, end))
}

fn parse_date(config: &dyn ConfigPort, key: &str, default: &str) -> Result<NaiveDate, FimateError> {
    let value = config
        .get_non_empty("data", key)
        .unwrap_or_else(|| default.to_string());
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
        FimateError::config_invalid(
            "data",
            key,
            format!("invalid {} format, expected YYYY-MM-DD", key),
        )
    })
}

pub fn parse_window(config: &dyn ConfigPort, section: &str, key: &str) -> Result<usize, FimateError> {
    let raw = require(config, section, key)?;
    match raw.parse::<usize>() {
        Ok(w) if w >= 1 => Ok(w),
        _ => Err(FimateError::config_invalid(
            section,
            key,
            format!("window must be a positive integer, got '{}'", raw),
        )),
    }
}

pub fn parse_range(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<ParamRange, FimateError> {
    let raw = require(config, section, key)?;
    let range: ParamRange = raw
        .parse()
        .map_err(|reason: String| FimateError::config_invalid(section, key, reason))?;
    range.validate(key).map_err(|e| match e {
        FimateError::InvalidParameter { reason, .. } => {
            FimateError::config_invalid(section, key, reason)
        }
        other => other,
    })?;
    Ok(range)
}

/// `[optimize] objective`, absolute when absent.
pub fn parse_objective(config: &dyn ConfigPort) -> Result<Objective, FimateError> {
    match config.get_non_empty("optimize", "objective") {
        None => Ok(Objective::default()),
        Some(raw) => raw
            .parse()
            .map_err(|reason: String| FimateError::config_invalid("optimize", "objective", reason)),
    }
}
