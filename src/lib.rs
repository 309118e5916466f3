//! fimate: SMA crossover backtester with a window grid search.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. The [`cli`] module wires them
//! together for the `fimate` binary and [`logging`] installs its tracing
//! subscriber.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;
