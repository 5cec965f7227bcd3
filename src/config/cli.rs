use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "shipment-sync")]
#[command(about = "Tracks shipments harvested from the ticketing portal and polls carrier status")]
pub struct Cli {
    /// Directory holding the shipment data file
    #[arg(long, default_value = "./data")]
    pub data_dir: String,

    /// Optional TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Harvest new tracking numbers from the ticketing portal inbox
    Harvest {
        /// Portal login email (falls back to the config file)
        #[arg(long)]
        email: Option<String>,

        /// Portal login password (falls back to the config file)
        #[arg(long)]
        password: Option<String>,
    },
    /// Poll the carrier and refresh every shipment's status
    Sync,
    /// Print all tracked shipments
    List,
    /// Add a shipment by hand
    Add {
        tracking_number: String,

        #[arg(long, default_value = "")]
        store_id: String,

        #[arg(long, default_value = "")]
        subject: String,
    },
    /// Delete one shipment
    Remove { tracking_number: String },
    /// Delete every shipment
    Clear,
}
