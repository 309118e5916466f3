//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestConfig, BacktestOutcome, SmaBacktester};
use crate::domain::config_validation::{
    parse_date_range, parse_objective, parse_range, parse_window, require, validate_data_config,
    validate_optimize_config, validate_strategy_config,
};
use crate::domain::error::FimateError;
use crate::domain::metrics::PerformanceScore;
use crate::domain::optimizer::{OptimizationResult, OptimizeConfig, ParamRange, ParameterGrid};
use crate::domain::strategy::SmaParams;
use crate::logging::{self, LogFormat};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_PATH: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "fimate", about = "SMA crossover backtester and window optimizer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one SMA crossover backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        /// Fast SMA window
        #[arg(long)]
        fast: Option<usize>,
        /// Slow SMA window
        #[arg(long)]
        slow: Option<usize>,
        /// Directory for CSV reports
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Grid-search the SMA windows
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        /// low,high,step
        #[arg(long)]
        fast_range: Option<ParamRange>,
        /// low,high,step
        #[arg(long)]
        slow_range: Option<ParamRange>,
        #[arg(long)]
        parallel: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            ticker,
            fast,
            slow,
            output,
        } => run_backtest(&config, ticker.as_deref(), fast, slow, output.as_deref()),
        Command::Optimize {
            config,
            ticker,
            fast_range,
            slow_range,
            parallel,
            output,
        } => run_optimize(
            &config,
            ticker.as_deref(),
            fast_range,
            slow_range,
            parallel,
            output.as_deref(),
        ),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: FimateError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = FileConfigAdapter::from_file(path).map_err(fail)?;
    logging::init_from_config(&adapter).map_err(fail)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(adapter)
}

fn run_backtest(
    config_path: &Path,
    ticker: Option<&str>,
    fast: Option<usize>,
    slow: Option<usize>,
    output: Option<&Path>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter, ticker, fast, slow) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let data_port = build_data_port(&adapter);
    let report_port = build_report_port(&adapter, output);

    match run_backtest_pipeline(
        &data_port,
        report_port.as_ref().map(|r| r as &dyn ReportPort),
        &bt_config,
    ) {
        Ok(outcome) => {
            print_backtest(&bt_config, &outcome);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_optimize(
    config_path: &Path,
    ticker: Option<&str>,
    fast_range: Option<ParamRange>,
    slow_range: Option<ParamRange>,
    parallel: bool,
    output: Option<&Path>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let opt_config = match build_optimize_config(&adapter, fast_range, slow_range, parallel) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let bt_config = match build_search_config(&adapter, ticker, &opt_config.grid) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let data_port = build_data_port(&adapter);
    let report_port = build_report_port(&adapter, output);

    match run_optimize_pipeline(
        &data_port,
        report_port.as_ref().map(|r| r as &dyn ReportPort),
        &bt_config,
        &opt_config,
    ) {
        Ok((result, outcome)) => {
            print_optimization(&bt_config, &opt_config, &result);
            print_backtest(&bt_config, &outcome);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_config(&adapter) {
        Ok(()) => {
            eprintln!("Config validated successfully");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

/// Validates `[data]`, `[logging]` and whichever of `[strategy]` and
/// `[optimize]` are present. At least one of the two is required.
pub fn validate_config(adapter: &FileConfigAdapter) -> Result<(), FimateError> {
    validate_data_config(adapter)?;
    LogFormat::parse(&adapter.get_non_empty("logging", "format").unwrap_or_default())?;

    let has_strategy = adapter.has_section("strategy");
    let has_optimize = adapter.has_section("optimize");
    if has_strategy || !has_optimize {
        validate_strategy_config(adapter)?;
    }
    if has_optimize {
        validate_optimize_config(adapter)?;
    }
    Ok(())
}

/// Single-run settings from `[data]` and `[strategy]`, with CLI overrides
/// taking precedence.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    ticker: Option<&str>,
    fast: Option<usize>,
    slow: Option<usize>,
) -> Result<BacktestConfig, FimateError> {
    let ticker = resolve_ticker(ticker, config)?;
    let (start_date, end_date) = parse_date_range(config)?;
    let fast = match fast {
        Some(w) => w,
        None => parse_window(config, "strategy", "sma_fast")?,
    };
    let slow = match slow {
        Some(w) => w,
        None => parse_window(config, "strategy", "sma_slow")?,
    };

    Ok(BacktestConfig {
        ticker,
        start_date,
        end_date,
        params: SmaParams::new(fast, slow)?,
    })
}

/// Data settings for a search, starting from the first grid candidate.
pub fn build_search_config(
    config: &dyn ConfigPort,
    ticker: Option<&str>,
    grid: &ParameterGrid,
) -> Result<BacktestConfig, FimateError> {
    let ticker = resolve_ticker(ticker, config)?;
    let (start_date, end_date) = parse_date_range(config)?;
    let params = grid.first_candidate()?;

    Ok(BacktestConfig {
        ticker,
        start_date,
        end_date,
        params,
    })
}

/// Search settings from `[optimize]`, with CLI overrides taking precedence.
/// `--parallel` can only switch parallel search on.
pub fn build_optimize_config(
    config: &dyn ConfigPort,
    fast_range: Option<ParamRange>,
    slow_range: Option<ParamRange>,
    parallel: bool,
) -> Result<OptimizeConfig, FimateError> {
    let fast = resolve_range(fast_range, config, "sma_fast_range")?;
    let slow = resolve_range(slow_range, config, "sma_slow_range")?;

    let grid = ParameterGrid::new(fast, slow);
    grid.validate()?;

    Ok(OptimizeConfig {
        grid,
        objective: parse_objective(config)?,
        parallel: parallel || config.get_bool("optimize", "parallel", false),
    })
}

fn resolve_range(
    range: Option<ParamRange>,
    config: &dyn ConfigPort,
    key: &str,
) -> Result<ParamRange, FimateError> {
    match range {
        Some(r) => {
            r.validate(key)?;
            Ok(r)
        }
        None => parse_range(config, "optimize", key),
    }
}

pub fn resolve_ticker(ticker: Option<&str>, config: &dyn ConfigPort) -> Result<String, FimateError> {
    match ticker.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => Ok(t.to_string()),
        None => require(config, "data", "ticker"),
    }
}

pub fn build_data_port(config: &dyn ConfigPort) -> CsvPriceAdapter {
    let path = config
        .get_non_empty("data", "path")
        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
    CsvPriceAdapter::new(PathBuf::from(path))
}

/// `-o` wins over `[report] output_dir`; no directory means no files.
pub fn build_report_port(config: &dyn ConfigPort, output: Option<&Path>) -> Option<CsvReportAdapter> {
    output
        .map(Path::to_path_buf)
        .or_else(|| config.get_non_empty("report", "output_dir").map(PathBuf::from))
        .map(CsvReportAdapter::new)
}

pub fn run_backtest_pipeline(
    data_port: &dyn PriceDataPort,
    report_port: Option<&dyn ReportPort>,
    bt_config: &BacktestConfig,
) -> Result<BacktestOutcome, FimateError> {
    let series = data_port.fetch_prices(&bt_config.ticker, bt_config.start_date, bt_config.end_date)?;
    tracing::info!(
        ticker = %bt_config.ticker,
        bars = series.len(),
        params = %bt_config.params,
        "running backtest"
    );

    let backtester = SmaBacktester::new(series, bt_config.params)?;
    let outcome = backtester.run_strategy()?;

    if let Some(report) = report_port {
        report.write_backtest(&bt_config.ticker, &outcome)?;
        report.write_indicators(&bt_config.ticker, backtester.prepared())?;
    }
    Ok(outcome)
}

/// Searches the grid, then re-runs the winning pair on the same session.
pub fn run_optimize_pipeline(
    data_port: &dyn PriceDataPort,
    report_port: Option<&dyn ReportPort>,
    bt_config: &BacktestConfig,
    opt_config: &OptimizeConfig,
) -> Result<(OptimizationResult, BacktestOutcome), FimateError> {
    let series = data_port.fetch_prices(&bt_config.ticker, bt_config.start_date, bt_config.end_date)?;
    tracing::info!(
        ticker = %bt_config.ticker,
        bars = series.len(),
        objective = %opt_config.objective,
        parallel = opt_config.parallel,
        "running optimization"
    );

    let mut backtester = SmaBacktester::new(series, bt_config.params)?;
    let result =
        backtester.optimize_parameters(&opt_config.grid, opt_config.objective, opt_config.parallel)?;
    let outcome = backtester.run_strategy()?;

    if let Some(report) = report_port {
        report.write_optimization(&bt_config.ticker, &result)?;
        report.write_backtest(&bt_config.ticker, &outcome)?;
        report.write_indicators(&bt_config.ticker, backtester.prepared())?;
    }
    Ok((result, outcome))
}

fn print_backtest(bt_config: &BacktestConfig, outcome: &BacktestOutcome) {
    let score: PerformanceScore = outcome.score.rounded();
    let m = &outcome.metrics;
    let params = outcome.simulation.params();

    println!(
        "{} {} to {} ({})",
        bt_config.ticker, bt_config.start_date, bt_config.end_date, params
    );
    println!("Performance:      {}", score);
    println!("Bars:             {}", m.bars);
    println!("Position changes: {}", m.position_changes);
    println!("Annualized:       {:.2}%", m.annualized_return * 100.0);
    println!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    println!("Max Drawdown:     -{:.1}%", m.max_drawdown * 100.0);
    println!("Drawdown Bars:    {}", m.max_drawdown_duration);
}

fn print_optimization(bt_config: &BacktestConfig, opt_config: &OptimizeConfig, result: &OptimizationResult) {
    println!(
        "{} grid fast={} slow={} objective={}",
        bt_config.ticker, opt_config.grid.fast, opt_config.grid.slow, opt_config.objective
    );
    println!(
        "Candidates:       {} evaluated, {} skipped",
        result.evaluated(),
        result.skipped()
    );
    println!(
        "Best:             {} ({:.2})",
        result.best, result.performance
    );
}
