mod cli;
mod headless;

use std::io::BufRead;

use clap::Parser;
use crossbeam_channel::Sender;
use quiver_core::{EffectConfig, Preset};
use quiver_ui::{ui_channels, UiCommand, UiEvent};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Init logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    info!("Quiver starting");
    if let Err(e) = run(&cli) {
        eprintln!("Quiver error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (config, preset) = cli.effect()?;
    if let Some(frames) = cli.headless {
        let reports = headless::run(config, cli.size, frames)?;
        headless::write_reports(&reports, std::io::stdout().lock())?;
        return Ok(());
    }
    run_windowed(config, preset)
}

fn run_windowed(
    config: EffectConfig,
    preset: Option<Preset>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (handles, run_ui) = ui_channels();
    spawn_stdin_control(handles.command_sender);

    let event_receiver = handles.event_receiver;
    std::thread::spawn(move || {
        while let Ok(event) = event_receiver.recv() {
            match event {
                UiEvent::EffectChanged(name) => info!("effect is now {name}"),
                UiEvent::SessionStopped => warn!("render session stopped"),
            }
        }
    });

    run_ui(config, preset)
}

/// Lets a terminal switch effects: one preset name, `show`, or a TOML path per line.
fn spawn_stdin_control(commands: Sender<UiCommand>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let command = if line == "show" {
                UiCommand::Show
            } else if let Some(preset) = Preset::from_name(line) {
                UiCommand::SelectPreset(preset)
            } else {
                match EffectConfig::load(line) {
                    Ok(config) => UiCommand::LoadConfig(Box::new(config)),
                    Err(e) => {
                        warn!("ignoring {line:?}: {e}");
                        continue;
                    }
                }
            };
            if commands.send(command).is_err() {
                break;
            }
        }
    });
}
