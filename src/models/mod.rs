use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum House {
    #[serde(alias = "deputado")]
    Deputy,
    #[serde(alias = "senador")]
    Senator,
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            House::Deputy => write!(f, "deputy"),
            House::Senator => write!(f, "senator"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legislator {
    pub id: u64,
    pub name: String,
    pub party: String,
    pub state: String,
    pub photo: String,
    pub house: House,
}

/// A yes/no position, either a ballot or a party orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    #[serde(alias = "sim")]
    Yes,
    #[serde(alias = "nao", alias = "não")]
    No,
}

impl VoteChoice {
    pub fn inverted(self) -> Self {
        match self {
            VoteChoice::Yes => VoteChoice::No,
            VoteChoice::No => VoteChoice::Yes,
        }
    }

    /// Parse a provider vote string ("Sim", "Não", "NAO", ...).
    /// Anything outside sim/nao (abstention, obstruction, absence) is `None`.
    pub fn from_provider(raw: &str) -> Option<Self> {
        match fold(raw).as_str() {
            "sim" => Some(VoteChoice::Yes),
            "nao" => Some(VoteChoice::No),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    #[serde(alias = "sim")]
    Yes,
    #[serde(alias = "nao", alias = "não")]
    No,
    #[serde(alias = "abster")]
    Abstain,
}

impl Answer {
    pub fn as_choice(self) -> Option<VoteChoice> {
        match self {
            Answer::Yes => Some(VoteChoice::Yes),
            Answer::No => Some(VoteChoice::No),
            Answer::Abstain => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceVote {
    pub question_id: String,
    pub vote_id: String,
    /// What a "sim" ballot on this vote means for the quiz question.
    pub yes_meaning: VoteChoice,
}

impl ReferenceVote {
    pub fn new(question_id: &str, vote_id: &str, yes_meaning: VoteChoice) -> Self {
        Self {
            question_id: question_id.to_string(),
            vote_id: vote_id.to_string(),
            yes_meaning,
        }
    }

    pub fn normalize(&self, ballot: VoteChoice) -> VoteChoice {
        match self.yes_meaning {
            VoteChoice::Yes => ballot,
            VoteChoice::No => ballot.inverted(),
        }
    }
}

/// Ordered set of roll-call votes the quiz questions are scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceBattery(pub Vec<ReferenceVote>);

impl ReferenceBattery {
    pub fn votes(&self) -> &[ReferenceVote] {
        &self.0
    }
}

impl Default for ReferenceBattery {
    fn default() -> Self {
        Self(vec![
            ReferenceVote::new("q1", "257161-462", VoteChoice::Yes),
            ReferenceVote::new("q2", "257161-465", VoteChoice::Yes),
            ReferenceVote::new("q3", "257161-467", VoteChoice::No),
            ReferenceVote::new("q5", "257161-476", VoteChoice::Yes),
            // symbolic vote
            ReferenceVote::new("q4", "257161-481", VoteChoice::Yes),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ballot {
    pub legislator_id: u64,
    pub choice: VoteChoice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffinityResult {
    #[serde(flatten)]
    pub legislator: Legislator,
    #[serde(rename = "affinity")]
    pub affinity_percent: u8,
    pub votes_considered: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KpiResult {
    pub percent: u8,
    /// Number of votes the percentage was computed over.
    pub sample: u32,
}

/// Yes/no ballots cast over a window of roll calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityResult {
    pub ballots: u32,
    pub sample: u32,
}

/// Net reimbursed expenses, in reais.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpenseTotal {
    pub total: f64,
    pub entries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KpiValue {
    Share(KpiResult),
    Activity(ActivityResult),
    Expenses(ExpenseTotal),
}

/// Expense totals over the first deputies of the roster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpenseSummary {
    pub total_expenses: f64,
    pub deputies_analyzed: usize,
    pub total_deputies: usize,
}

/// One entry of a legislator's own voting history.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedVote {
    pub session: String,
    pub held_on: Option<NaiveDate>,
    /// Yes/no ballot, if one was cast.
    pub choice: Option<VoteChoice>,
    /// In the chamber for the vote, whatever the ballot.
    pub present: bool,
}

/// Round to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Lowercase, trim and strip diacritics so "NÃO " and "nao" compare equal.
pub fn fold(text: &str) -> String {
    text.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}
