use super::KpiSettings;
use crate::error::ServiceError;
use crate::models::{ActivityResult, Legislator};
use crate::votes::{BallotSource, VotingRecord};
use futures::{StreamExt, TryStreamExt, stream};
use log::info;

/// Yes/no ballots cast over the most recent roll calls.
pub async fn activity(
    ballots: &dyn BallotSource,
    legislator: &Legislator,
    settings: KpiSettings,
) -> Result<ActivityResult, ServiceError> {
    let vote_ids = ballots.recent_votes(settings.window).await?;

    let cast: Vec<bool> = stream::iter(vote_ids)
        .map(|vote_id| async move {
            let cast = ballots.ballots(&vote_id).await?;
            Ok::<_, ServiceError>(cast.iter().any(|b| b.legislator_id == legislator.id))
        })
        .buffer_unordered(settings.concurrency.max(1))
        .try_collect()
        .await?;

    let result = ActivityResult {
        ballots: cast.iter().filter(|&&c| c).count() as u32,
        sample: cast.len() as u32,
    };
    info!(
        "Activity for {} ({}): {}/{} votes",
        legislator.name, legislator.id, result.ballots, result.sample
    );
    Ok(result)
}

pub async fn recorded_activity(
    record: &dyn VotingRecord,
    legislator: &Legislator,
    window: usize,
) -> Result<ActivityResult, ServiceError> {
    let votes = record.voting_record(legislator.id).await?;
    let recent = &votes[..votes.len().min(window)];

    Ok(ActivityResult {
        ballots: recent.iter().filter(|vote| vote.choice.is_some()).count() as u32,
        sample: recent.len() as u32,
    })
}
