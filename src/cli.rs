use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clocktower::types::ImageQuality;

/// Track MANGA Plus titles and download their chapters
#[derive(Parser)]
#[command(name = "clocktower")]
#[command(about = "A MANGA Plus client for tracking and downloading chapters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a title and its chapter listing
    Title {
        /// Title id
        id: i64,
        /// Print the mapped record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the viewer data of a chapter
    Chapter {
        /// Chapter id
        id: i64,
        /// Image quality (low, high, super_high)
        #[arg(short, long, default_value_t = ImageQuality::SuperHigh)]
        quality: ImageQuality,
        /// Print the mapped record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download and decode every page of a chapter
    Download {
        /// Chapter id
        id: i64,
        /// Image quality (low, high, super_high)
        #[arg(short, long, default_value_t = ImageQuality::SuperHigh)]
        quality: ImageQuality,
        /// Output directory, defaults to `<title>/<chapter>`
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite pages that already exist
        #[arg(long)]
        force: bool,
    },
    /// Download new chapters of every tracked title
    Sync {
        /// Config file, defaults to the user config directory
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Base directory for titles without a `downloadDir`
        #[arg(short, long, default_value = "downloads")]
        output: PathBuf,
        /// Re-download chapters that already exist
        #[arg(long)]
        force: bool,
    },
    /// Validate and print the config
    Config {
        /// Config file, defaults to the user config directory
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
