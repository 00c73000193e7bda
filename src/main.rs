mod client;
mod history;
mod poller;
mod tracker;
mod types;

use clap::{Parser, Subcommand};
use client::DashboardClient;
use env_logger::Env;
use failure::Error;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process;
use tokio::sync::mpsc::channel;
use types::{render_search_failure, SearchOutcome};

#[macro_use]
extern crate failure;

#[derive(Parser)]
#[command(
    name = "plate-watch",
    about = "Client agent for a plate-recognition dashboard backend"
)]
struct Cli {
    /// Backend host, e.g. "localhost:5000"
    #[arg(long, env = "PLATE_WATCH_HOST", default_value = "localhost:5000")]
    host: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll for detections and track the history (the default)
    Watch,
    /// Look up owner details for a plate
    Search { plate: String },
    /// Point the backend at a new RTSP source
    SetRtsp { url: String },
    /// Submit a still image for recognition
    UploadImage { path: PathBuf },
    /// Submit a video file for recognition
    UploadVideo { path: PathBuf },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let client = match DashboardClient::new(&cli.host) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    // The search and stream routes sit behind the backend's session login.
    if let Err(e) = client.login().await {
        error!("{}", e);
        process::exit(1);
    }

    let result = match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => {
            watch(client).await;
            Ok(())
        }
        Command::Search { plate } => search(&client, &plate).await,
        Command::SetRtsp { url } => set_rtsp(&client, &url).await,
        Command::UploadImage { path } => upload_image(&client, &path).await,
        Command::UploadVideo { path } => upload_video(&client, &path).await,
    };
    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}

async fn watch(client: DashboardClient) {
    info!("Starting plate-watch");
    let (tx, rx) = channel(8);
    let poller_task = tokio::spawn(poller::run(client.clone(), tx));
    let tracker_task = tokio::spawn(tracker::run(rx, client));
    tokio::select! {
        result = poller_task => {
            if let Err(e) = result {
                error!("Poller task failed: {}", e);
            }
        }
        result = tracker_task => {
            if let Err(e) = result {
                error!("Tracker task failed: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }
    // Returning drops the runtime, which tears down whichever task is
    // still looping.
    info!("Exiting watch");
}

async fn search(client: &DashboardClient, plate: &str) -> Result<(), Error> {
    match client.search(plate).await {
        Ok(outcome @ SearchOutcome::Found { .. }) => info!("{}", outcome.render(plate)),
        Ok(outcome) => warn!("{}", outcome.render(plate)),
        Err(e) => return Err(format_err!("{}", render_search_failure(plate, &e))),
    }
    Ok(())
}

async fn set_rtsp(client: &DashboardClient, url: &str) -> Result<(), Error> {
    client.set_rtsp(url).await?;
    info!("RTSP source updated to {}", url);
    client.refresh_stream().await
}

async fn upload_image(client: &DashboardClient, path: &Path) -> Result<(), Error> {
    client.upload_image(path).await?;
    info!("Uploaded image {:?}", path);
    client.refresh_stream().await
}

async fn upload_video(client: &DashboardClient, path: &Path) -> Result<(), Error> {
    client.upload_video(path).await?;
    info!("Uploaded video {:?}", path);
    client.refresh_stream().await
}
