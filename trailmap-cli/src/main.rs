//! Trailmap CLI - command-line host for the trailmap library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::common::LayerArg;
use commands::config::ConfigCommands;

#[derive(Debug, Parser)]
#[command(name = "trailmap", version, about = "Record, review and summarize GPS tracks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Summarize a track stored as JSON
    Stats {
        /// Track file (a track object or a bare array of points)
        file: PathBuf,
    },

    /// Fetch a track from the data service and summarize it
    Track {
        /// Track id
        id: i64,
    },

    /// List tracks on the data service with totals
    Tracks,

    /// Replay recorded fixes as a live session and save the track
    Record {
        /// JSON array of position fixes
        file: PathBuf,

        /// Name for the saved track
        #[arg(long)]
        name: String,

        /// Optional description
        #[arg(long)]
        description: Option<String>,

        /// Delay between replayed fixes in milliseconds
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,

        /// Record and report without saving the track
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the tile URL covering a coordinate
    TileUrl {
        /// Latitude (defaults to the configured map center)
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude (defaults to the configured map center)
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Zoom level (defaults to the configured zoom)
        #[arg(long)]
        zoom: Option<u8>,

        /// Tile layer (defaults to the configured layer)
        #[arg(long, value_enum)]
        layer: Option<LayerArg>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config { command } => commands::config::run(command),
        Commands::Stats { file } => commands::stats::run(&file),
        Commands::Track { id } => commands::track::run(id),
        Commands::Tracks => commands::track::run_list(),
        Commands::Record {
            file,
            name,
            description,
            interval_ms,
            dry_run,
        } => commands::record::run(commands::record::RecordArgs {
            file,
            name,
            description,
            interval_ms,
            dry_run,
        }),
        Commands::TileUrl {
            lat,
            lon,
            zoom,
            layer,
        } => commands::tile_url::run(lat, lon, zoom, layer),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
