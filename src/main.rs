use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::{info, warn};

use audiolog::{
    format, Config, FileCatalog, MicCaptureDevice, QualityProfile, RecordingController,
    SymphoniaProbe, RECORDING_FILE_EXT,
};

#[derive(Parser)]
#[command(name = "audiolog", about = "Local audio recorder with a browsable file catalog")]
struct Cli {
    /// Config file name (without extension)
    #[arg(long, default_value = "config/audiolog")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record from the default microphone until Ctrl-C
    Record {
        /// Override the configured quality preset
        #[arg(long, value_enum)]
        quality: Option<QualityProfile>,
    },
    /// List cataloged recordings, most recent first
    List {
        /// Emit the catalog as JSON instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Rename a recording (display name; the extension is preserved)
    Rename { path: PathBuf, new_name: String },
    /// Delete a recording
    Delete { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load_or_default(&cli.config);
    let storage = PathBuf::from(&cfg.storage.recordings_path);

    match cli.command {
        Command::Record { quality } => {
            let profile = quality.unwrap_or(cfg.recording.quality);
            record(&storage, profile).await?;
        }
        Command::List { json } => {
            let catalog = new_catalog(storage);
            match catalog.refresh().await {
                Ok(recordings) if json => {
                    println!("{}", serde_json::to_string_pretty(&recordings)?);
                }
                Ok(recordings) if recordings.is_empty() => info!("no recordings found"),
                Ok(recordings) => {
                    for rec in recordings {
                        println!(
                            "{}  {:>9}  {:>8}  {}",
                            rec.modified_display(),
                            rec.size_display(),
                            rec.duration_display(),
                            rec.name
                        );
                    }
                }
                Err(e) => warn!("scan failed: {}", e),
            }
        }
        Command::Rename { path, new_name } => {
            let catalog = new_catalog(storage);
            if let Err(e) = catalog.refresh().await {
                warn!("scan failed: {}", e);
            }
            let renamed = catalog.rename(&path, &new_name).await?;
            info!("renamed to {}", renamed.path.display());
        }
        Command::Delete { path } => {
            if cfg.recording.confirm_delete && !confirm(&format!("Delete {}?", path.display()))? {
                info!("delete cancelled");
                return Ok(());
            }
            let catalog = new_catalog(storage);
            if let Err(e) = catalog.refresh().await {
                warn!("scan failed: {}", e);
            }
            if catalog.delete(&path).await {
                info!("deleted {}", path.display());
            } else {
                warn!(
                    "could not delete {} from disk; removed from catalog",
                    path.display()
                );
            }
        }
    }

    Ok(())
}

fn new_catalog(storage: PathBuf) -> FileCatalog {
    FileCatalog::new(storage, RECORDING_FILE_EXT, Arc::new(SymphoniaProbe))
}

async fn record(storage: &std::path::Path, profile: QualityProfile) -> Result<()> {
    let device = MicCaptureDevice::new();
    let controller = Arc::new(Mutex::new(RecordingController::new(Box::new(device))));

    let path = controller.lock().await.start(storage, profile).await?;
    info!("recording to {} (Ctrl-C to stop)", path.display());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    let mut guard = controller.lock().await;
    let elapsed = guard.elapsed();
    let finished = guard.stop().await?;
    info!(
        "saved {} ({})",
        finished.display(),
        format::human_duration_short(elapsed.as_millis() as u64)
    );
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush().context("failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
