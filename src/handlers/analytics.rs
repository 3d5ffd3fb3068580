use super::{ApiError, AppState};
use crate::expenses::sample_expenses;
use crate::models::ExpenseSummary;
use axum::Json;
use axum::extract::State;

pub async fn deputy_expenses(
    State(state): State<AppState>,
) -> Result<Json<ExpenseSummary>, ApiError> {
    let summary =
        sample_expenses(state.expenses.as_ref(), &state.directory, state.expense_sample).await?;
    Ok(Json(summary))
}
