use super::{KpiSettings, round_percent};
use crate::error::ServiceError;
use crate::models::{KpiResult, Legislator};
use crate::votes::{BallotSource, VotingRecord};
use futures::{StreamExt, TryStreamExt, stream};
use log::info;

/// Share of the most recent roll calls in which the legislator cast any
/// ballot, abstentions and obstructions included.
pub async fn presence(
    ballots: &dyn BallotSource,
    legislator: &Legislator,
    settings: KpiSettings,
) -> Result<KpiResult, ServiceError> {
    let vote_ids = ballots.recent_votes(settings.window).await?;

    let attendance: Vec<bool> = stream::iter(vote_ids)
        .map(|vote_id| async move {
            let voters = ballots.voters(&vote_id).await?;
            Ok::<_, ServiceError>(voters.contains(&legislator.id))
        })
        .buffer_unordered(settings.concurrency.max(1))
        .try_collect()
        .await?;

    let present = attendance.iter().filter(|&&p| p).count() as u64;
    let sample = attendance.len() as u64;
    info!(
        "Presence for {} ({}): {}/{} votes",
        legislator.name, legislator.id, present, sample
    );

    Ok(KpiResult {
        percent: round_percent(present, sample),
        sample: sample as u32,
    })
}

/// Presence over the newest `window` entries of a published voting history.
pub async fn recorded_presence(
    record: &dyn VotingRecord,
    legislator: &Legislator,
    window: usize,
) -> Result<KpiResult, ServiceError> {
    let votes = record.voting_record(legislator.id).await?;
    let recent = &votes[..votes.len().min(window)];

    let present = recent.iter().filter(|vote| vote.present).count() as u64;
    let sample = recent.len() as u64;
    info!(
        "Presence for {} ({}): {}/{} recorded votes",
        legislator.name, legislator.id, present, sample
    );

    Ok(KpiResult {
        percent: round_percent(present, sample),
        sample: sample as u32,
    })
}
