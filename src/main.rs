use astat::cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag; stdout is reserved for the report
    let filter = if cli.verbose {
        EnvFilter::new("astat=debug,info")
    } else {
        EnvFilter::new("astat=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    cli::estimate::run(cli.args, cli.format, cli.verbose)
}
