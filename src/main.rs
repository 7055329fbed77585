pub mod types;
pub mod config;
pub mod style;
pub mod legend;
pub mod overlay;
pub mod picking;
pub mod tooltip;
pub mod indicator;
pub mod surface;
pub mod workflow;
pub mod client;
pub mod session;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive overlay session against the scoring service
    Run {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Print the color legend derived from the score ramp
    Legend,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Run { config } => {
            println!("Starting session with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;
            session::run(app_config).await?;
        }
        Commands::Legend => {
            let legend = legend::Legend::from_ramp();
            println!("{}", legend.title);
            println!("{}", legend.formula);
            for entry in &legend.entries {
                println!("  {}  {}", entry.color, entry.label);
            }
            println!("{}", legend.note);
        }
    }

    Ok(())
}
