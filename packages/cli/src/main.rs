#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the bikeshare catchment map.
//!
//! Lists configured cities, builds a city's catchment polygons as
//! `GeoJSON`, replays a hover over one station's catchment, or starts the
//! API server.

mod commands;

use std::path::PathBuf;

use bikeshare_map_catchment::{CatchmentOptions, DEFAULT_RADIUS_KM};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bikeshare_map", about = "Bikeshare catchment map toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all configured cities
    Cities,
    /// Build a city's catchment polygons and write them as `GeoJSON`
    Catchments {
        /// City identifier (e.g., "dc")
        #[arg(long)]
        city: String,
        /// Output file. Writes to stdout if not specified.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Catchment radius around each station, in kilometres
        #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
        radius_km: f64,
    },
    /// Print the catchment styles and info panel while a station is hovered
    Hover {
        /// City identifier (e.g., "dc")
        #[arg(long)]
        city: String,
        /// Name of the hovered station
        #[arg(long)]
        station: String,
        /// Catchment radius around each station, in kilometres
        #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
        radius_km: f64,
    },
    /// Start the API server (configured via `BIND_ADDR`, `PORT`, `DATA_DIR`)
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Cities => commands::list_cities(),
        Commands::Catchments {
            city,
            output,
            radius_km,
        } => {
            commands::write_catchments(&city, output.as_deref(), &CatchmentOptions { radius_km })
                .await?;
        }
        Commands::Hover {
            city,
            station,
            radius_km,
        } => commands::hover(&city, &station, &CatchmentOptions { radius_km }).await?,
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            let config = bikeshare_map_server::ServerConfig::from_env();
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(bikeshare_map_server::run_server(config))
            })
            .await??;
        }
    }

    Ok(())
}
