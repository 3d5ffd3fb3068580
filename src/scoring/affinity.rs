use super::{ScoringPolicy, Tally};
use crate::directory::{DirectoryCache, Roster};
use crate::error::ServiceError;
use crate::models::{AffinityResult, Answer, Ballot, House, ReferenceBattery, ReferenceVote, VoteChoice};
use crate::votes::BallotSource;
use futures::future::try_join_all;
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// Tallies keyed by legislator, remembering first-seen order.
#[derive(Debug, Default)]
pub struct Tallies {
    order: Vec<u64>,
    by_legislator: HashMap<u64, Tally>,
}

impl Tallies {
    fn entry(&mut self, legislator_id: u64) -> &mut Tally {
        if !self.by_legislator.contains_key(&legislator_id) {
            self.order.push(legislator_id);
        }
        self.by_legislator.entry(legislator_id).or_default()
    }

    #[cfg(test)]
    pub fn get(&self, legislator_id: u64) -> Option<Tally> {
        self.by_legislator.get(&legislator_id).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}

/// Rank legislators by how often their ballots on the reference votes
/// matched the user's answers.
pub async fn compute_affinity(
    ballots: &dyn BallotSource,
    directory: &DirectoryCache,
    answers: &HashMap<String, Answer>,
    battery: &ReferenceBattery,
    policy: ScoringPolicy,
) -> Result<Vec<AffinityResult>, ServiceError> {
    if answers.is_empty() {
        return Err(ServiceError::Validation("no answers supplied".to_string()));
    }

    let selected = select_votes(battery, answers);
    if selected.is_empty() {
        info!("Every answered question was abstained, nothing to score");
        return Ok(Vec::new());
    }

    let fetches = selected.iter().map(|(vote, _)| ballots.ballots(&vote.vote_id));
    let (per_vote, roster) = tokio::try_join!(
        async { try_join_all(fetches).await.map_err(ServiceError::Upstream) },
        async { directory.roster().await.map_err(ServiceError::Directory) },
    )?;

    let tallies = tally(&selected, &per_vote);
    let results = rank(&tallies, &roster, ballots.house(), policy);
    info!(
        "Scored {} legislators over {} reference votes ({} ghost voters dropped)",
        results.len(),
        selected.len(),
        tallies.len() - results.len()
    );
    Ok(results)
}

/// Reference votes the user took a position on, in battery order.
pub fn select_votes<'a>(
    battery: &'a ReferenceBattery,
    answers: &HashMap<String, Answer>,
) -> Vec<(&'a ReferenceVote, VoteChoice)> {
    battery
        .votes()
        .iter()
        .filter_map(|vote| {
            let answer = answers.get(&vote.question_id)?.as_choice()?;
            Some((vote, answer))
        })
        .collect()
}

/// `per_vote[i]` holds the ballots for `selected[i]`.
pub fn tally(selected: &[(&ReferenceVote, VoteChoice)], per_vote: &[Vec<Ballot>]) -> Tallies {
    let mut tallies = Tallies::default();

    for ((vote, answer), ballots) in selected.iter().zip(per_vote) {
        let mut seen = HashSet::new();
        for ballot in ballots {
            // one ballot per legislator per vote
            if !seen.insert(ballot.legislator_id) {
                debug!("Duplicate ballot from {} on {}", ballot.legislator_id, vote.vote_id);
                continue;
            }
            let matched = vote.normalize(ballot.choice) == *answer;
            tallies.entry(ballot.legislator_id).record(matched);
        }
    }

    tallies
}

/// Join tallies with the roster and sort by affinity, then by sample size.
/// Voters missing from the roster are dropped.
pub fn rank(
    tallies: &Tallies,
    roster: &Roster,
    house: House,
    policy: ScoringPolicy,
) -> Vec<AffinityResult> {
    let mut results: Vec<AffinityResult> = tallies
        .order
        .iter()
        .filter_map(|id| {
            let legislator = roster.get(house, *id)?;
            let tally = tallies.by_legislator[id];
            Some(AffinityResult {
                legislator: legislator.clone(),
                affinity_percent: policy.percent(tally),
                votes_considered: tally.considered,
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.affinity_percent
            .cmp(&a.affinity_percent)
            .then(b.votes_considered.cmp(&a.votes_considered))
    });
    results
}
