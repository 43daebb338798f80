use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::DEFAULT_SETTINGS_PATH, load_settings, CadenceTracker, ChannelSensor,
    PlaylistBuildClient, PlaylistSession, Settings, TempoTargetController,
};
use shared::error::UiError;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod replay;

#[derive(Parser, Debug)]
#[command(about = "Tempo-matched playlist builder and cadence monitor")]
struct Args {
    /// Settings file; missing files fall back to defaults.
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    config: PathBuf,
    #[arg(long)]
    service_url: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the playlist service to build a playlist for a tempo band.
    Build {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        min_bpm: String,
        #[arg(long)]
        max_bpm: String,
        #[arg(long)]
        user_id: Option<String>,
        /// Search query; repeat for several. Defaults come from settings.
        #[arg(long = "query")]
        queries: Vec<String>,
        /// Print the stored playlist as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Check that the playlist service is up.
    Ping,
    /// Replay recorded step-counter samples (`steps,millis` per line) and
    /// print the cadence after each one. `-` reads stdin.
    Cadence {
        samples: PathBuf,
        /// Behave as if the device had no step counter.
        #[arg(long)]
        unsupported: bool,
    },
    /// Show the target tempo the slider would settle on.
    Target { bpm: i64 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut settings = load_settings(&args.config)?;
    if let Some(url) = args.service_url {
        settings.service_url = client_core::config::normalize_service_url(&url);
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout_secs = secs;
    }

    match args.command {
        Command::Build {
            name,
            min_bpm,
            max_bpm,
            user_id,
            queries,
            json,
        } => run_build(&settings, name, min_bpm, max_bpm, user_id, queries, json).await,
        Command::Ping => {
            let client = PlaylistBuildClient::from_settings(&settings)?;
            client
                .ping()
                .await
                .map_err(|err| anyhow::anyhow!(UiError::from(err)))?;
            println!("Playlist service at {} is up", client.base_url());
            Ok(())
        }
        Command::Cadence {
            samples,
            unsupported,
        } => run_cadence(samples, unsupported).await,
        Command::Target { bpm } => {
            let mut controller = TempoTargetController::new();
            controller.set_target(bpm);
            println!("Target: {}", controller.target_label());
            Ok(())
        }
    }
}

async fn run_build(
    settings: &Settings,
    name: String,
    min_bpm: String,
    max_bpm: String,
    user_id: Option<String>,
    queries: Vec<String>,
    json: bool,
) -> Result<()> {
    let user_id = user_id
        .or_else(|| settings.user_id.clone())
        .context("no user id; pass --user-id or set TEMPO_USER_ID")?;
    let queries = if queries.is_empty() {
        settings.default_queries.clone()
    } else {
        queries
    };

    let client = PlaylistBuildClient::from_settings(settings)?;
    let mut session = PlaylistSession::new(client, user_id);
    let playlist = match session.submit(&name, &min_bpm, &max_bpm, &queries).await {
        Ok(playlist) => playlist,
        Err(err) => {
            let ui = UiError::from(err);
            println!("Build failed ({:?}): {}", ui.kind, ui.message);
            if ui.kind.is_retryable() {
                println!("You can submit again.");
            }
            return Err(anyhow::anyhow!(ui));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(playlist)?);
        return Ok(());
    }

    println!("Playlist Created: \"{}\" has been added!", playlist.name);
    println!("  {}", playlist.bpm_range_label());
    if let Some(remote) = &playlist.remote {
        println!(
            "  service playlist {} with {} tracks",
            remote.playlist_id, remote.added_count
        );
        if remote.fell_back {
            println!("  not enough tracks matched the band; the service relaxed the tempo filter");
        }
    }

    println!();
    println!("Saved playlists:");
    println!("{}", session.store().render());
    Ok(())
}

async fn run_cadence(path: PathBuf, unsupported: bool) -> Result<()> {
    let samples = replay::read_samples(&path)?;
    let sensor = if unsupported {
        ChannelSensor::unavailable()
    } else {
        ChannelSensor::available()
    };
    let mut tracker = CadenceTracker::start(Arc::new(sensor.clone())).await?;

    if !tracker.is_supported() {
        println!("{}", UiError::sensor_unavailable().message);
        println!("steps / min: {}", tracker.display().label());
        return Ok(());
    }

    for sample in samples {
        sensor.publish(sample).await;
        // let the consumer task take the sample before reading the display
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        println!(
            "{:>8} steps @ {:>10} ms -> {} steps / min",
            sample.cumulative_steps,
            sample.observed_at_millis,
            tracker.display().label()
        );
    }

    tracker.set_enabled(false).await?;
    println!("final: {} steps / min", tracker.display().label());
    Ok(())
}
