use crate::client::DashboardClient;
use crate::history::{DetectionHistory, MAX_HISTORY};
use crate::types::{render_search_failure, SearchOutcome};
use log::{error, info, warn};
use tokio::sync::mpsc::Receiver;

/// Consumes polled plates: admits them to the history, re-renders it after
/// every change, and looks up owner details for each newly recorded plate.
/// Sole owner of the `DetectionHistory`.
pub async fn run(mut rx: Receiver<String>, client: DashboardClient) {
    let mut history = DetectionHistory::new();
    while let Some(plate) = rx.recv().await {
        if !history.record_detection(&plate) {
            continue;
        }
        render(&history);
        lookup_owner(&client, &plate).await;
    }
    info!("Detection channel closed, stopping tracker");
}

fn render(history: &DetectionHistory) {
    info!("Detection history ({} of {}):", history.len(), MAX_HISTORY);
    for line in history.render() {
        info!("  {}", line);
    }
}

/// Search failures never touch the history; the plate stays recorded
/// whatever the lookup says.
async fn lookup_owner(client: &DashboardClient, plate: &str) {
    match client.search(plate).await {
        Ok(outcome @ SearchOutcome::Found { .. }) => info!("{}", outcome.render(plate)),
        Ok(outcome) => warn!("{}", outcome.render(plate)),
        Err(e) => error!("{}", render_search_failure(plate, &e)),
    }
}
