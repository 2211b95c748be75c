//! Binary entrypoint for texture-compressor.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use texture_compressor::config::Configuration;
use texture_compressor::processing::path_policy;
use texture_compressor::progress::TracingObserver;
use texture_compressor::tasks::driver;
use texture_compressor::{CompressionService, TextureCompressor};

#[derive(Debug, Parser)]
#[command(
    name = "texture-compressor",
    version,
    about = "Downscale oversized model textures into cached siblings"
)]
struct Cli {
    /// Path to YAML config file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Model file whose directory textures are resolved against
    #[arg(value_name = "MODEL")]
    model: PathBuf,

    /// Texture file names relative to the model directory
    #[arg(value_name = "TEXTURE", required = true)]
    textures: Vec<PathBuf>,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(format!("texture_compressor={level}").parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    }
    .validated()
    .context("invalid configuration values")?;

    let (service, pipeline) = CompressionService::new(&cfg);
    service.init(&cli.model, Arc::new(TracingObserver));

    let cancel = CancellationToken::new();
    let driver = tokio::spawn(driver::run(pipeline, cfg.tick_interval, cancel.clone()));

    let mut requests = JoinSet::new();
    for texture in cli.textures {
        if path_policy::is_compressed(&texture) {
            warn!(path = %texture.display(), "already a compressed variant; skipping");
            continue;
        }
        let service = service.clone();
        requests.spawn(async move {
            let result = service.try_compress(&texture).await;
            (texture, result)
        });
    }

    let mut failures = 0usize;
    while let Some(joined) = requests.join_next().await {
        let (texture, result) = joined.context("compression request task panicked")?;
        match result {
            Ok(path) => println!("{} -> {}", texture.display(), path.display()),
            Err(err) => {
                failures += 1;
                error!(path = %texture.display(), "{:#}", anyhow::Error::from(err));
            }
        }
    }

    cancel.cancel();
    driver.await.context("compression driver panicked")??;

    if let Some(progress) = service.progress() {
        info!(
            total = progress.texture_total,
            loaded = progress.texture_loaded,
            "import finished"
        );
    }
    if failures > 0 {
        bail!("{failures} texture(s) failed to compress");
    }
    Ok(())
}
