use crate::directory::DirectoryCache;
use crate::error::{FetchError, ServiceError};
use crate::models::{ExpenseSummary, ExpenseTotal, House, Legislator, round_cents};
use crate::upstream::CamaraClient;
use async_trait::async_trait;
use futures::future::try_join_all;
use log::info;

/// Expense claims filed by deputies.
#[async_trait]
pub trait ExpenseSource: Send + Sync {
    /// Net value of each recent claim.
    async fn expenses(&self, deputy_id: u64) -> Result<Vec<f64>, FetchError>;
}

#[async_trait]
impl ExpenseSource for CamaraClient {
    async fn expenses(&self, deputy_id: u64) -> Result<Vec<f64>, FetchError> {
        CamaraClient::expenses(self, deputy_id).await
    }
}

pub async fn deputy_expenses(
    source: &dyn ExpenseSource,
    legislator: &Legislator,
) -> Result<ExpenseTotal, ServiceError> {
    let claims = source.expenses(legislator.id).await?;
    let total = round_cents(claims.iter().sum());
    info!(
        "Expenses for {} ({}): {} over {} claims",
        legislator.name,
        legislator.id,
        total,
        claims.len()
    );

    Ok(ExpenseTotal {
        total,
        entries: claims.len() as u32,
    })
}

/// Sum the expenses of the first `sample` deputies in the directory.
pub async fn sample_expenses(
    source: &dyn ExpenseSource,
    directory: &DirectoryCache,
    sample: usize,
) -> Result<ExpenseSummary, ServiceError> {
    let roster = directory.roster().await.map_err(ServiceError::Directory)?;
    let deputies: Vec<&Legislator> = roster
        .legislators()
        .iter()
        .filter(|legislator| legislator.house == House::Deputy)
        .collect();

    if deputies.is_empty() {
        return Err(ServiceError::NotFound("the directory lists no deputies".to_string()));
    }

    let analyzed = &deputies[..deputies.len().min(sample)];
    let claims = try_join_all(analyzed.iter().map(|deputy| source.expenses(deputy.id))).await?;
    let total = round_cents(claims.iter().flatten().sum());
    info!(
        "Expenses over {} of {} deputies: {}",
        analyzed.len(),
        deputies.len(),
        total
    );

    Ok(ExpenseSummary {
        total_expenses: total,
        deputies_analyzed: analyzed.len(),
        total_deputies: deputies.len(),
    })
}
