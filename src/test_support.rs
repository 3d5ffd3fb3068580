// In-memory stand-ins for the providers, shared by the unit tests.

use crate::directory::RosterSource;
use crate::error::FetchError;
use crate::expenses::ExpenseSource;
use crate::models::{Ballot, House, Legislator, RecordedVote, VoteChoice};
use crate::votes::{BallotSource, VotingRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn legislator(house: House, id: u64, name: &str, party: &str) -> Legislator {
    Legislator {
        id,
        name: name.to_string(),
        party: party.to_string(),
        state: "DF".to_string(),
        photo: format!("https://example.org/{id}.jpg"),
        house,
    }
}

pub fn yes(legislator_id: u64) -> Ballot {
    Ballot { legislator_id, choice: VoteChoice::Yes }
}

pub fn no(legislator_id: u64) -> Ballot {
    Ballot { legislator_id, choice: VoteChoice::No }
}

pub fn recorded(session: &str, choice: Option<VoteChoice>, present: bool) -> RecordedVote {
    RecordedVote {
        session: session.to_string(),
        held_on: None,
        choice,
        present,
    }
}

fn unavailable() -> FetchError {
    FetchError::Status {
        url: "fake://provider".to_string(),
        status: 503,
    }
}

pub struct FakeRoster {
    legislators: Option<Vec<Legislator>>,
    calls: AtomicUsize,
}

impl FakeRoster {
    pub fn new(legislators: Vec<Legislator>) -> Self {
        Self { legislators: Some(legislators), calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { legislators: None, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RosterSource for FakeRoster {
    async fn list_all(&self) -> Result<Vec<Legislator>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.legislators.clone().ok_or_else(unavailable)
    }
}

#[derive(Default)]
pub struct FakeBallots {
    ballots: HashMap<String, Vec<Ballot>>,
    abstentions: HashMap<String, Vec<u64>>,
    recommendations: HashMap<(String, String), VoteChoice>,
    recent: Vec<String>,
    failing_votes: Vec<String>,
    ballot_calls: AtomicUsize,
}

impl FakeBallots {
    pub fn with_vote(mut self, vote_id: &str, ballots: Vec<Ballot>) -> Self {
        self.ballots.insert(vote_id.to_string(), ballots);
        self.recent.push(vote_id.to_string());
        self
    }

    /// Records a non yes/no ballot, counted only for attendance.
    pub fn with_abstention(mut self, vote_id: &str, legislator_id: u64) -> Self {
        self.abstentions
            .entry(vote_id.to_string())
            .or_default()
            .push(legislator_id);
        self
    }

    pub fn with_recommendation(mut self, vote_id: &str, party: &str, choice: VoteChoice) -> Self {
        self.recommendations
            .insert((vote_id.to_string(), party.to_string()), choice);
        self
    }

    pub fn with_failing_vote(mut self, vote_id: &str) -> Self {
        self.failing_votes.push(vote_id.to_string());
        self
    }

    pub fn ballot_calls(&self) -> usize {
        self.ballot_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BallotSource for FakeBallots {
    fn house(&self) -> House {
        House::Deputy
    }

    async fn ballots(&self, vote_id: &str) -> Result<Vec<Ballot>, FetchError> {
        self.ballot_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_votes.iter().any(|id| id == vote_id) {
            return Err(unavailable());
        }
        Ok(self.ballots.get(vote_id).cloned().unwrap_or_default())
    }

    async fn voters(&self, vote_id: &str) -> Result<Vec<u64>, FetchError> {
        let mut voters: Vec<u64> = self
            .ballots(vote_id)
            .await?
            .iter()
            .map(|b| b.legislator_id)
            .collect();
        voters.extend(self.abstentions.get(vote_id).into_iter().flatten());
        Ok(voters)
    }

    async fn party_recommendation(
        &self,
        vote_id: &str,
        party: &str,
    ) -> Result<Option<VoteChoice>, FetchError> {
        Ok(self
            .recommendations
            .get(&(vote_id.to_string(), party.to_string()))
            .copied())
    }

    async fn recent_votes(&self, limit: usize) -> Result<Vec<String>, FetchError> {
        Ok(self.recent.iter().take(limit).cloned().collect())
    }
}

#[derive(Default)]
pub struct FakeRecord {
    votes: HashMap<u64, Vec<RecordedVote>>,
}

impl FakeRecord {
    pub fn with_votes(mut self, legislator_id: u64, votes: Vec<RecordedVote>) -> Self {
        self.votes.insert(legislator_id, votes);
        self
    }
}

#[async_trait]
impl VotingRecord for FakeRecord {
    async fn voting_record(&self, legislator_id: u64) -> Result<Vec<RecordedVote>, FetchError> {
        Ok(self.votes.get(&legislator_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeExpenses {
    claims: HashMap<u64, Vec<f64>>,
    failing: Vec<u64>,
    calls: AtomicUsize,
}

impl FakeExpenses {
    pub fn with_claims(mut self, deputy_id: u64, claims: Vec<f64>) -> Self {
        self.claims.insert(deputy_id, claims);
        self
    }

    pub fn with_failing_deputy(mut self, deputy_id: u64) -> Self {
        self.failing.push(deputy_id);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExpenseSource for FakeExpenses {
    async fn expenses(&self, deputy_id: u64) -> Result<Vec<f64>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&deputy_id) {
            return Err(unavailable());
        }
        Ok(self.claims.get(&deputy_id).cloned().unwrap_or_default())
    }
}
