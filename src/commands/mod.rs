//! Command-line interface.
//!
//! Each subcommand lives in its own module with a `cmd` entry point.

pub mod init;
pub mod interval;
pub mod probe;
pub mod watch;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Interactive configuration setup")]
    Init(init::InitArgs),
    #[command(about = "Run the rest reminder agent in this terminal")]
    Watch,
    #[command(about = "Set the reminder interval in minutes", arg_required_else_help = true)]
    Interval(interval::IntervalArgs),
    #[command(about = "Print live idle and audio probe readings")]
    Probe(probe::ProbeArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Watch => watch::cmd().await,
            Commands::Interval(args) => interval::cmd(args),
            Commands::Probe(args) => probe::cmd(args),
        }
    }
}
