use super::{ApiError, AppState};
use crate::error::ServiceError;
use crate::models::Legislator;
use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

pub async fn list_legislators(
    State(state): State<AppState>,
) -> Result<Json<Vec<Legislator>>, ApiError> {
    let roster = state.directory.roster().await.map_err(ServiceError::Directory)?;
    Ok(Json(roster.legislators().to_vec()))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Legislator>>, ApiError> {
    // no term, no results, and no upstream call
    if query.q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }
    let roster = state.directory.roster().await.map_err(ServiceError::Directory)?;
    Ok(Json(roster.search(&query.q)))
}
