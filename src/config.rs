use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Estimate microplastics in food photos", long_about = None)]
pub struct Config {
    /// Base URL of the food classification service
    #[arg(long, env = "PLASTY_API_URL", default_value = "http://localhost:5000")]
    pub api_url: String,

    /// Request timeout in seconds (transport default when unset)
    #[arg(long, env = "PLASTY_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check whether the classifier has its model loaded
    Health,
    /// Classify food photos and estimate their particle counts
    Scan {
        /// Image files to analyze, in order
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
}

impl Config {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
