use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use memprobe::commands::{dispatch, Session};
use memprobe::config::{validate_config, ConfigLoader};
use memprobe::render::stdout_sink;
use memprobe::snapshot::SnapshotImage;

#[derive(Parser)]
#[command(
    name = "memprobe",
    about = "Inspect intrusive structures in a memory snapshot"
)]
struct Cli {
    /// Layout catalog (TOML: types, symbols, image base)
    #[arg(long)]
    layout: PathBuf,

    /// Raw memory dump mapped at the catalog's base address
    #[arg(long)]
    dump: PathBuf,

    /// Configuration file
    #[arg(long, default_value = "memprobe.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new(&cli.config).load_or_default();
    validate_config(&config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_target(false)
        .init();

    info!("memprobe v{}", env!("CARGO_PKG_VERSION"));

    let image = SnapshotImage::load(&cli.layout, &cli.dump)
        .with_context(|| format!("loading snapshot from {}", cli.dump.display()))?;
    let target = image.target();
    let mut watches = image.watch_controller();

    let mut session =
        Session::new(&image, &image, &config, target).with_watches(&mut watches);

    // One synchronous command at a time; a finished (or failed) invocation
    // leaves nothing behind but its printed lines.
    let stdin = std::io::stdin();
    let mut sink = stdout_sink();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "q" {
            break;
        }
        dispatch(&mut session, line, &mut sink);
    }

    Ok(())
}
