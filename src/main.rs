//! Wine quality - Main Entry Point

use clap::Parser;
use tracing_subscriber::util::SubscriberInitExt;
use wine_quality::cli::{cmd_explore, cmd_info, cmd_run, log_subscriber, Cli, Commands, RunOverrides};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr, step output to stdout
    log_subscriber(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            config,
            test_fraction,
            seed,
            trees,
            max_depth,
            scaling,
            drop,
            json,
        } => {
            let overrides = RunOverrides {
                test_fraction,
                seed,
                trees,
                max_depth,
                scaling,
                drop,
            };
            cmd_run(&data, config.as_deref(), overrides, json.as_deref())?;
        }
        Commands::Explore { data, config } => {
            cmd_explore(&data, config.as_deref())?;
        }
        Commands::Info { data } => {
            cmd_info(&data)?;
        }
    }

    Ok(())
}
