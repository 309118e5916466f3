use clap::Parser;
use fimate::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
