use clap::Parser;
use protoroute::cli::{run_cli, Cli};
use protoroute::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env().verbose(cli.verbose))?;
    run_cli(cli)
}
