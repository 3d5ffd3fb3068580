use super::{Tally, round_percent};
use crate::error::ServiceError;
use crate::models::{KpiResult, Legislator};
use crate::votes::BallotSource;
use log::{debug, info};

/// How often the legislator voted the way their party recommended.
///
/// Votes are walked one at a time; the ballot source paces its
/// vote-detail calls so the provider isn't flooded.
pub async fn party_loyalty(
    ballots: &dyn BallotSource,
    legislator: &Legislator,
    window: usize,
) -> Result<KpiResult, ServiceError> {
    let vote_ids = ballots.recent_votes(window).await?;
    let mut tally = Tally::default();

    for vote_id in &vote_ids {
        let Some(recommended) = ballots
            .party_recommendation(vote_id, &legislator.party)
            .await?
        else {
            debug!("{} issued no orientation on {}", legislator.party, vote_id);
            continue;
        };

        let own = ballots
            .ballots(vote_id)
            .await?
            .into_iter()
            .find(|b| b.legislator_id == legislator.id);

        if let Some(ballot) = own {
            tally.record(ballot.choice == recommended);
        }
    }

    info!(
        "Loyalty for {} ({}, {}): {}/{} votes",
        legislator.name, legislator.id, legislator.party, tally.matches, tally.considered
    );

    Ok(KpiResult {
        percent: round_percent(u64::from(tally.matches), u64::from(tally.considered)),
        sample: tally.considered,
    })
}
