//! klang CLI - play the wavetable synthesizer from the terminal.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "klang")]
#[command(author, version, about = "Polyphonic wavetable synthesizer CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the synthesizer with the computer keyboard
    Play(commands::play::PlayArgs),

    /// Play a built-in demo sequence
    Demo(commands::demo::DemoArgs),

    /// List available audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Demo(args) => commands::demo::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
