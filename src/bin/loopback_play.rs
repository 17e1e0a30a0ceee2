use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use loopback_player::config::AppConfig;
use loopback_player::driver::CpalDriver;
use loopback_player::{init_logging, run_playback};

#[derive(Parser, Debug)]
#[command(
    name = "loopback_play",
    about = "Play a short test tone through the software loopback renderer"
)]
struct Cli {
    /// Override path to the playback config file (built-in defaults apply
    /// when the file is absent)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load);

    let driver = CpalDriver::new();
    let report = run_playback(&driver, &config)?;

    println!(
        "Played {} Hz tone as {}, {}, {} Hz; source settled in state {:?}",
        config.tone.frequency_hz,
        report.render_format.layout.name(),
        report.render_format.sample_type.name(),
        report.render_format.sample_rate,
        report.final_state
    );
    Ok(())
}
