use super::{ApiError, AppState};
use crate::error::ServiceError;
use crate::models::{AffinityResult, Answer};
use crate::scoring::affinity::compute_affinity;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use log::info;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct DnaRequest {
    #[serde(default)]
    answers: Option<HashMap<String, Answer>>,
}

pub async fn dna_politico(
    State(state): State<AppState>,
    payload: Result<Json<DnaRequest>, JsonRejection>,
) -> Result<Json<Vec<AffinityResult>>, ApiError> {
    let Json(request) = payload?;
    let answers = request
        .answers
        .ok_or_else(|| ServiceError::Validation("no answers supplied".to_string()))?;
    info!("Scoring political DNA for {} answers", answers.len());

    let results = compute_affinity(
        state.ballots.as_ref(),
        &state.directory,
        &answers,
        &state.battery,
        state.policy,
    )
    .await?;

    Ok(Json(results))
}
