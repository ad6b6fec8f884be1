use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

mod commands;

use commands::{inspect::InspectCommand, vlq::VlqCommand};

#[derive(Parser)]
#[command(name = "srcmap", version, about = "Inspect and verify Source Map v3 documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode or decode Base64 VLQ text
    Vlq(VlqCommand),
    /// Decode a source map and print its segments
    Inspect(InspectCommand),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Vlq(cmd) => cmd.run()?,
        Commands::Inspect(cmd) => cmd.run()?,
    }

    Ok(())
}
