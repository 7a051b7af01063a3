use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use player::cli::{Cli, Command};
use player::commands;
use player::config::PlayerConfig;

fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let config = PlayerConfig::from_env().with_base_url(cli.base_url.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    run(cli.command, config)
}

fn run(command: Command, config: PlayerConfig) -> anyhow::Result<()> {
    match command {
        Command::Speak { text, voice, device } => {
            let config = config.with_device(device.as_deref());
            info!("Speaking via {}", config.client.base_url);
            let outcome = commands::speak(&config, &text, &voice.overrides())?;
            info!("Result: {:?}", outcome);
        }
        Command::Save { text, output, voice } => {
            commands::save(&config, &text, &output, &voice.overrides())
                .with_context(|| format!("Failed to save synthesized audio to {}", output.display()))?;
        }
        Command::PlayFile { path, device } => {
            let config = config.with_device(device.as_deref());
            let outcome = commands::play_file(&config, &path)
                .with_context(|| format!("Failed to play {}", path.display()))?;
            info!("Result: {:?}", outcome);
        }
        Command::Devices => {
            let devices = commands::devices().context("Failed to list output devices")?;
            if devices.is_empty() {
                println!("No output devices found");
            }
            for name in devices {
                println!("{}", name);
            }
        }
    }
    Ok(())
}
