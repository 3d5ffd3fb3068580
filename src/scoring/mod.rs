pub mod activity;
pub mod affinity;
pub mod loyalty;
pub mod presence;

use crate::directory::DirectoryCache;
use crate::error::ServiceError;
use crate::expenses::{ExpenseSource, deputy_expenses};
use crate::models::{House, KpiValue, Legislator};
use crate::votes::{BallotSource, VotingRecord};
use serde::Deserialize;
use std::str::FromStr;

/// How a legislator's match ratio becomes a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringPolicy {
    /// matches / considered
    Plain,
    /// (matches + 1) / (considered + 2), pulls small samples toward 50%
    #[default]
    Laplace,
}

impl ScoringPolicy {
    pub fn percent(self, tally: Tally) -> u8 {
        if tally.considered == 0 {
            return 0;
        }
        let (matches, considered) = (u64::from(tally.matches), u64::from(tally.considered));
        match self {
            ScoringPolicy::Plain => round_percent(matches, considered),
            ScoringPolicy::Laplace => round_percent(matches + 1, considered + 2),
        }
    }
}

impl FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(ScoringPolicy::Plain),
            "laplace" => Ok(ScoringPolicy::Laplace),
            other => Err(format!("unknown scoring policy {other:?}")),
        }
    }
}

/// Per-legislator counts over the considered reference votes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub matches: u32,
    pub considered: u32,
}

impl Tally {
    pub fn record(&mut self, matched: bool) {
        self.considered += 1;
        if matched {
            self.matches += 1;
        }
    }
}

/// `round(100 * num / den)` with halves rounded up, 0 when `den` is 0.
pub fn round_percent(num: u64, den: u64) -> u8 {
    if den == 0 {
        return 0;
    }
    ((200 * num + den) / (2 * den)).min(100) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiKind {
    #[serde(alias = "presenca")]
    Presence,
    #[serde(alias = "lealdade")]
    Loyalty,
    #[serde(alias = "atividade")]
    Activity,
    #[serde(alias = "gastos")]
    Expenses,
}

#[derive(Debug, Clone, Copy)]
pub struct KpiSettings {
    /// How many recent roll calls the KPIs look at.
    pub window: usize,
    /// Parallel ballot fetches for presence and activity.
    pub concurrency: usize,
}

/// Where each KPI reads its data from.
#[derive(Clone, Copy)]
pub struct KpiSources<'a> {
    /// Chamber roll calls.
    pub ballots: &'a dyn BallotSource,
    /// Senate per-senator voting history.
    pub senate: &'a dyn VotingRecord,
    pub expenses: &'a dyn ExpenseSource,
    pub directory: &'a DirectoryCache,
}

pub async fn compute_kpi(
    kind: KpiKind,
    sources: KpiSources<'_>,
    house: House,
    legislator_id: u64,
    settings: KpiSettings,
) -> Result<KpiValue, ServiceError> {
    let legislator = resolve(sources.directory, house, legislator_id).await?;
    let roll_calls = house == sources.ballots.house();

    let value = match kind {
        KpiKind::Presence if roll_calls => {
            KpiValue::Share(presence::presence(sources.ballots, &legislator, settings).await?)
        }
        KpiKind::Presence => KpiValue::Share(
            presence::recorded_presence(sources.senate, &legislator, settings.window).await?,
        ),
        KpiKind::Loyalty if roll_calls => KpiValue::Share(
            loyalty::party_loyalty(sources.ballots, &legislator, settings.window).await?,
        ),
        KpiKind::Loyalty => {
            return Err(ServiceError::Unsupported(format!(
                "party orientations are not published for {} votes",
                house
            )));
        }
        KpiKind::Activity if roll_calls => {
            KpiValue::Activity(activity::activity(sources.ballots, &legislator, settings).await?)
        }
        KpiKind::Activity => KpiValue::Activity(
            activity::recorded_activity(sources.senate, &legislator, settings.window).await?,
        ),
        KpiKind::Expenses if house == House::Deputy => {
            KpiValue::Expenses(deputy_expenses(sources.expenses, &legislator).await?)
        }
        KpiKind::Expenses => {
            return Err(ServiceError::Unsupported(format!(
                "senator expenses are only published at https://www6g.senado.leg.br/transparencia/sen/{}/",
                legislator_id
            )));
        }
    };
    Ok(value)
}

async fn resolve(
    directory: &DirectoryCache,
    house: House,
    legislator_id: u64,
) -> Result<Legislator, ServiceError> {
    let roster = directory.roster().await.map_err(ServiceError::Directory)?;
    roster
        .get(house, legislator_id)
        .cloned()
        .ok_or_else(|| ServiceError::NotFound(format!("no {} with id {}", house, legislator_id)))
}
