//! Eddy CLI - Command-line interface
//!
//! Runs the media server and inspects the video catalog.

mod commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "eddy")]
#[command(about = "A minimal video upload and streaming server")]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::handle_command(cli.command).await
}
