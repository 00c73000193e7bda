use crate::client::DashboardClient;
use log::{debug, error, info};
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::time::delay_for;

const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls the backend for the latest detected plate and forwards hits to the
/// tracker. Each response is awaited before the next poll is scheduled, so
/// there is never more than one request in flight and a slow response cannot
/// be overtaken by a fresher one. Poll failures get a log line; the next
/// cycle is the retry.
pub async fn run(client: DashboardClient, mut tx: Sender<String>) {
    info!(
        "Polling for detections every {} seconds",
        POLL_INTERVAL.as_secs()
    );
    loop {
        match client.latest_plate().await {
            Ok(Some(plate)) => {
                if tx.send(plate).await.is_err() {
                    // Tracker is gone; nothing left to feed.
                    info!("Detection channel closed, stopping poller");
                    return;
                }
            }
            Ok(None) => debug!("No plate reported yet"),
            Err(e) => error!("Error fetching latest plate: {}", e),
        }
        delay_for(POLL_INTERVAL).await;
    }
}
