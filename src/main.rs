use anchorsignal::cli::{Cli, init_logging, run};
use clap::Parser;

fn main() -> std::process::ExitCode {
    init_logging();
    run(Cli::parse())
}
