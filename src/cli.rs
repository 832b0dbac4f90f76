//! CLI argument parsing for the hos-planner binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hos-planner", about = "Hours-of-Service trip planning worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the NATS worker (default if no subcommand given)
    Serve,
    /// Plan one trip offline and print the plan as JSON
    Plan {
        /// Trip request JSON (same shape as the hos.trip.plan payload)
        #[arg(long)]
        trip: PathBuf,
        /// OSRM route response JSON to use instead of calling a router
        #[arg(long)]
        route: Option<PathBuf>,
    },
}
