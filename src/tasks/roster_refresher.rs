use crate::directory::DirectoryCache;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

/// Keep the roster cache warm so requests rarely pay for a reload.
pub async fn refresh_roster_task(directory: Arc<DirectoryCache>, every: Duration) {
    info!("Starting background roster refresh every {:?}", every);
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await; // first tick completes immediately
        match directory.refresh().await {
            Ok(roster) => info!("Roster refreshed ({} legislators)", roster.len()),
            // keep serving whatever is cached
            Err(e) => error!("Failed to refresh roster: {}", e),
        }
    }
}
