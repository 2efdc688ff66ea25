//! main entry point

use clap::Parser as _;
use lamp_setup::Cli;

fn main() {
    env_logger::builder().init();

    if let Err(error) = run() {
        log::error!("{error:?}");
        std::process::exit(1);
    }
}

/// Wrappable "main" to catch errors.
fn run() -> anyhow::Result<()> {
    Cli::parse().run()
}
