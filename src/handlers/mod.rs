mod analytics;
mod kpi;
mod legislators;
mod vote;

use crate::config::Config;
use crate::directory::{DirectoryCache, ProviderRoster};
use crate::error::ServiceError;
use crate::expenses::ExpenseSource;
use crate::models::ReferenceBattery;
use crate::scoring::{KpiSettings, KpiSources, ScoringPolicy};
use crate::upstream::{CamaraClient, Fetcher, SenadoClient};
use crate::votes::pacing::Pacer;
use crate::votes::{BallotSource, VoteAggregator, VotingRecord};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, warn};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub ballots: Arc<dyn BallotSource>,
    pub senate: Arc<dyn VotingRecord>,
    pub expenses: Arc<dyn ExpenseSource>,
    pub directory: Arc<DirectoryCache>,
    pub battery: Arc<ReferenceBattery>,
    pub policy: ScoringPolicy,
    pub kpi: KpiSettings,
    /// Deputies summed by the expense analytics.
    pub expense_sample: usize,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let fetcher = Fetcher::new(config.http_timeout, config.max_retries, config.backoff_base)?;
        let camara = CamaraClient::new(fetcher.clone(), &config.camara_url);
        let senado = SenadoClient::new(fetcher, &config.senado_url);

        let ttl = chrono::Duration::from_std(config.directory_ttl)
            .unwrap_or_else(|_| chrono::Duration::weeks(52));
        let roster = ProviderRoster::new(camara.clone(), senado.clone());
        let directory = DirectoryCache::new(Arc::new(roster), ttl);
        let ballots = VoteAggregator::new(camara.clone(), Pacer::new(config.vote_detail_pacing));

        Ok(Self {
            ballots: Arc::new(ballots),
            senate: Arc::new(senado),
            expenses: Arc::new(camara),
            directory: Arc::new(directory),
            battery: Arc::new(config.battery.clone()),
            policy: config.policy,
            kpi: KpiSettings {
                window: config.kpi_window,
                concurrency: config.kpi_concurrency,
            },
            expense_sample: config.expense_sample,
        })
    }

    pub fn kpi_sources(&self) -> KpiSources<'_> {
        KpiSources {
            ballots: self.ballots.as_ref(),
            senate: self.senate.as_ref(),
            expenses: self.expenses.as_ref(),
            directory: &self.directory,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/legislators", get(legislators::list_legislators))
        .route("/api/search", get(legislators::search))
        .route("/api/votacoes/dna-politico", post(vote::dna_politico))
        .route("/api/kpis/:house/:id/:kpi", get(kpi::get_kpi))
        .route("/api/analytics/gastos-deputados", get(analytics::deputy_expenses))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ServiceError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(ServiceError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::Validation(_) | ServiceError::Unsupported(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Upstream(_) | ServiceError::Directory(_) => StatusCode::BAD_GATEWAY,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Rejected request: {}", self.0);
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}
