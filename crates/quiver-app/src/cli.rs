use std::path::PathBuf;

use clap::Parser;
use quiver_core::{EffectConfig, EngineResult, Preset};

/// `quiver` - pointer-reactive arrow, line and point fields.
///
/// Opens a window running one effect, or renders a scripted pointer sweep
/// headlessly and prints a JSON summary per frame.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Built-in effect to run.
    #[arg(long, env = "QUIVER_PRESET", default_value = "arrows", value_parser = parse_preset)]
    pub preset: Preset,

    /// TOML effect description; overrides `--preset`.
    #[arg(long, env = "QUIVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Render this many frames without a window and exit.
    #[arg(long)]
    pub headless: Option<u64>,

    /// Viewport used by headless runs, as WIDTHxHEIGHT.
    #[arg(long, default_value = "800x600", value_parser = parse_size)]
    pub size: (f64, f64),

    /// Log filter, e.g. `info` or `quiver_core=debug`.
    #[arg(long, env = "QUIVER_LOG", default_value = "info")]
    pub log: String,
}

impl Cli {
    /// The selected preset, or a validated TOML config when one is given.
    pub fn effect(&self) -> EngineResult<(EffectConfig, Option<Preset>)> {
        match &self.config {
            Some(path) => Ok((EffectConfig::load(path)?, None)),
            None => Ok((self.preset.config(), Some(self.preset))),
        }
    }
}

fn parse_preset(s: &str) -> Result<Preset, String> {
    s.parse::<Preset>().map_err(|e| {
        let names: Vec<_> = Preset::ALL.iter().map(|p| p.name()).collect();
        format!("{e}; expected one of {}", names.join(", "))
    })
}

fn parse_size(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("bad dimension {v:?}: {e}"))
    };
    Ok((parse(w)?, parse(h)?))
}
