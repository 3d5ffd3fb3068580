use super::{ApiError, AppState};
use crate::models::{House, KpiValue};
use crate::scoring::{KpiKind, compute_kpi};
use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};

pub async fn get_kpi(
    State(state): State<AppState>,
    path: Result<Path<(House, u64, KpiKind)>, PathRejection>,
) -> Result<Json<KpiValue>, ApiError> {
    let Path((house, id, kind)) = path?;
    let value = compute_kpi(kind, state.kpi_sources(), house, id, state.kpi).await?;
    Ok(Json(value))
}
