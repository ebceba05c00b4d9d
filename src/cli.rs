use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "NeuroPulse",
    version,
    about = "An interactive action potential and synapse model",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply one stimulus headlessly and print the resulting timeline
    Run(RunArgs),
    /// Open the interactive viewer
    Gui,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Stimulus strength, 0-100
    #[arg(short, long, default_value_t = 20.0)]
    pub strength: f64,

    /// Clock step in seconds
    #[arg(long, default_value_t = 0.01)]
    pub dt: f64,

    /// Emit the timeline as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Write an HTML chart of the membrane voltage
    #[arg(long, value_name = "FILE")]
    pub plot: Option<PathBuf>,
}
