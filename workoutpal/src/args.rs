use std::path::PathBuf;

use clap::Parser;

/// WorkoutPal API server
#[derive(Debug, Parser)]
#[command(name = "workoutpal", about = "Fitness tracking API with user-safe error responses")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "workoutpal.toml", env = "WORKOUTPAL_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "WORKOUTPAL_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
