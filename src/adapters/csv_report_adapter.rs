//! CSV report adapter.
//!
//! Writes one file per report kind into an output directory:
//! `<TICKER>_simulation.csv`, `<TICKER>_indicators.csv` and
//! `<TICKER>_candidates.csv`. Undefined values are written as empty cells.

use crate::domain::backtest::BacktestOutcome;
use crate::domain::error::FimateError;
use crate::domain::optimizer::OptimizationResult;
use crate::domain::prepared::PreparedSeries;
use crate::ports::report_port::ReportPort;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub struct CsvReportAdapter {
    output_dir: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn report_path(&self, ticker: &str, kind: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{}.csv", ticker, kind))
    }

    fn writer(&self, ticker: &str, kind: &str) -> Result<(csv::Writer<File>, PathBuf), FimateError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| FimateError::Report {
            reason: format!("failed to create {}: {}", self.output_dir.display(), e),
        })?;
        let path = self.report_path(ticker, kind);
        let writer = csv::Writer::from_path(&path).map_err(|e| report_error(&path, e))?;
        Ok((writer, path))
    }
}

fn report_error(path: &Path, e: impl std::fmt::Display) -> FimateError {
    FimateError::Report {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ReportPort for CsvReportAdapter {
    fn write_backtest(&self, ticker: &str, outcome: &BacktestOutcome) -> Result<(), FimateError> {
        let (mut wtr, path) = self.writer(ticker, "simulation")?;
        wtr.write_record([
            "date",
            "close",
            "log_return",
            "sma_fast",
            "sma_slow",
            "position",
            "strategy_return",
            "cumulative_market_return",
            "cumulative_strategy_return",
        ])
        .map_err(|e| report_error(&path, e))?;

        for row in outcome.simulation.rows() {
            wtr.write_record([
                row.date.format("%Y-%m-%d").to_string(),
                row.close.to_string(),
                row.log_return.to_string(),
                row.sma_fast.to_string(),
                row.sma_slow.to_string(),
                row.position.to_string(),
                row.strategy_return.to_string(),
                row.cumulative_market_return.to_string(),
                row.cumulative_strategy_return.to_string(),
            ])
            .map_err(|e| report_error(&path, e))?;
        }

        wtr.flush().map_err(|e| report_error(&path, e))?;
        tracing::info!(path = %path.display(), rows = outcome.simulation.len(), "wrote simulation report");
        Ok(())
    }

    fn write_indicators(&self, ticker: &str, prepared: &PreparedSeries) -> Result<(), FimateError> {
        let (mut wtr, path) = self.writer(ticker, "indicators")?;
        wtr.write_record([
            "date".to_string(),
            "close".to_string(),
            prepared.log_return().indicator_type.to_string(),
            prepared.sma_fast().indicator_type.to_string(),
            prepared.sma_slow().indicator_type.to_string(),
        ])
        .map_err(|e| report_error(&path, e))?;

        for (i, (date, close)) in prepared.dates().iter().zip(prepared.closes()).enumerate() {
            wtr.write_record([
                date.format("%Y-%m-%d").to_string(),
                close.to_string(),
                cell(prepared.log_return().get(i)),
                cell(prepared.sma_fast().get(i)),
                cell(prepared.sma_slow().get(i)),
            ])
            .map_err(|e| report_error(&path, e))?;
        }

        wtr.flush().map_err(|e| report_error(&path, e))?;
        tracing::info!(path = %path.display(), rows = prepared.len(), "wrote indicator report");
        Ok(())
    }

    fn write_optimization(
        &self,
        ticker: &str,
        result: &OptimizationResult,
    ) -> Result<(), FimateError> {
        let (mut wtr, path) = self.writer(ticker, "candidates")?;
        wtr.write_record(["sma_fast", "sma_slow", "score", "best"])
            .map_err(|e| report_error(&path, e))?;

        for candidate in &result.candidates {
            let best = if candidate.params == result.best { "1" } else { "" };
            wtr.write_record([
                candidate.params.fast.to_string(),
                candidate.params.slow.to_string(),
                cell(candidate.score),
                best.to_string(),
            ])
            .map_err(|e| report_error(&path, e))?;
        }

        wtr.flush().map_err(|e| report_error(&path, e))?;
        tracing::info!(path = %path.display(), candidates = result.candidates.len(), "wrote candidate report");
        Ok(())
    }
}
