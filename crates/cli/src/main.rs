use clap::{Parser, Subcommand};

mod commands;

use commands::{RunArgs, ShowConfigArgs};

#[derive(Parser)]
#[command(name = "straddle")]
#[command(about = "Intraday short straddle simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one trading session against the synthetic market
    Run(RunArgs),
    /// Print the effective configuration after merging file, profile and environment
    ShowConfig(ShowConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so report output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => {
            commands::run_session(args).await?;
        }
        Commands::ShowConfig(args) => {
            commands::run_show_config(&args)?;
        }
    }

    Ok(())
}
