#[cfg(feature = "cli")]
pub mod cli;
pub mod svg;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(feature = "cli")]
pub fn run() -> Result<(), crate::error::AppError> {
    use crate::adapters::cli::{Args, parse_inputs};
    use crate::stiff::render;

    let args = Args::parse();
    init_tracing(args.verbose);
    let (table, config) = parse_inputs(&args)?;

    let out = render(&table, &config)?;

    crate::adapters::cli::print_output(&out, &config, &args)?;

    Ok(())
}
