#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Green cover dashboard server binary.

use clap::Parser;
use green_cover_dashboard::config::{ConfigArgs, DashboardConfig};

#[derive(Parser)]
#[command(name = "green_cover_dashboard", about = "Sector green cover dashboard")]
struct Cli {
    /// Prompt for bind address, port and backend URL before starting
    #[arg(long, short)]
    interactive: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    if cli.interactive {
        green_cover_dashboard::interactive::run(&cli.config).await?;
    } else {
        let config = DashboardConfig::load(&cli.config)?;
        green_cover_dashboard::run_server(config).await?;
    }

    Ok(())
}
