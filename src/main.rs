mod config;
mod directory;
mod error;
mod expenses;
mod handlers;
mod models;
mod scoring;
mod tasks;
mod upstream;
mod votes;

#[cfg(test)]
mod test_support;

use config::Config;
use handlers::AppState;
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    info!(
        "Scoring {} reference votes with {:?} policy",
        config.battery.votes().len(),
        config.policy
    );

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    // --- Background roster refresh ---
    if !config.directory_refresh.is_zero() {
        let directory = Arc::clone(&state.directory);
        let every = config.directory_refresh;
        tokio::spawn(async move {
            tasks::roster_refresher::refresh_roster_task(directory, every).await;
        });
    }

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", config.bind_addr, e);
            return;
        }
    };
    info!("Backend listening on {}", config.bind_addr);

    if let Err(why) = axum::serve(listener, handlers::router(state)).await {
        error!("Server error: {:?}", why);
    }
}
