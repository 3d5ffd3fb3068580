pub mod pacing;

use crate::error::FetchError;
use crate::models::{Ballot, House, RecordedVote, VoteChoice};
use crate::upstream::{CamaraClient, SenadoClient};
use crate::upstream::camara::recommendation_for;
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, warn};
use pacing::Pacer;
use regex::Regex;

lazy_static! {
    // Chamber roll-call ids look like "257161-462"
    static ref VOTE_ID: Regex = Regex::new(r"^\d+-\d+$").unwrap();
}

pub fn is_valid_vote_id(vote_id: &str) -> bool {
    VOTE_ID.is_match(vote_id)
}

/// Roll-call data for one house.
#[async_trait]
pub trait BallotSource: Send + Sync {
    /// House whose legislators cast the ballots this source returns.
    fn house(&self) -> House;

    /// Valid yes/no ballots cast on `vote_id`.
    async fn ballots(&self, vote_id: &str) -> Result<Vec<Ballot>, FetchError>;

    /// Everyone with a recorded ballot on `vote_id`, yes/no or not.
    async fn voters(&self, vote_id: &str) -> Result<Vec<u64>, FetchError>;

    /// The party's recommended choice on `vote_id`, if it issued one.
    async fn party_recommendation(
        &self,
        vote_id: &str,
        party: &str,
    ) -> Result<Option<VoteChoice>, FetchError>;

    /// Ids of the `limit` most recently registered votes.
    async fn recent_votes(&self, limit: usize) -> Result<Vec<String>, FetchError>;
}

/// Per-legislator voting history, for a house that publishes it that way.
#[async_trait]
pub trait VotingRecord: Send + Sync {
    /// The legislator's recorded votes, newest first.
    async fn voting_record(&self, legislator_id: u64) -> Result<Vec<RecordedVote>, FetchError>;
}

#[async_trait]
impl VotingRecord for SenadoClient {
    async fn voting_record(&self, legislator_id: u64) -> Result<Vec<RecordedVote>, FetchError> {
        SenadoClient::voting_record(self, legislator_id).await
    }
}

/// Chamber of Deputies roll calls. Vote-detail calls go through the pacer.
pub struct VoteAggregator {
    camara: CamaraClient,
    pacer: Option<Pacer>,
}

impl VoteAggregator {
    pub fn new(camara: CamaraClient, pacer: Option<Pacer>) -> Self {
        Self { camara, pacer }
    }
}

#[async_trait]
impl BallotSource for VoteAggregator {
    fn house(&self) -> House {
        House::Deputy
    }

    async fn ballots(&self, vote_id: &str) -> Result<Vec<Ballot>, FetchError> {
        let ballots = self.camara.ballots(vote_id).await?;
        debug!("Vote {}: {} valid ballots", vote_id, ballots.len());
        Ok(ballots)
    }

    async fn voters(&self, vote_id: &str) -> Result<Vec<u64>, FetchError> {
        self.camara.voters(vote_id).await
    }

    async fn party_recommendation(
        &self,
        vote_id: &str,
        party: &str,
    ) -> Result<Option<VoteChoice>, FetchError> {
        if let Some(pacer) = &self.pacer {
            pacer.wait().await;
        }
        let orientations = self.camara.orientations(vote_id).await?;
        Ok(recommendation_for(&orientations, party))
    }

    async fn recent_votes(&self, limit: usize) -> Result<Vec<String>, FetchError> {
        let mut ids = self.camara.recent_votes(limit).await?;
        ids.retain(|id| {
            let valid = is_valid_vote_id(id);
            if !valid {
                warn!("Ignoring roll call with unexpected id {:?}", id);
            }
            valid
        });
        ids.truncate(limit);
        Ok(ids)
    }
}
