// Chamber of Deputies open-data API (dadosabertos.camara.leg.br/api/v2).
// Every payload wraps its records in a top-level "dados" array.

use super::{Fetcher, records};
use crate::error::FetchError;
use crate::models::{Ballot, House, Legislator, VoteChoice, fold};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

/// Explicit page size; the roster endpoint silently truncates to 15 otherwise.
const ROSTER_PAGE_SIZE: &str = "600";
const EXPENSE_PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeputyRecord {
    id: u64,
    nome: String,
    #[serde(default)]
    sigla_partido: Option<String>,
    #[serde(default)]
    sigla_uf: Option<String>,
    #[serde(default)]
    url_foto: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeputyRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct BallotRecord {
    #[serde(rename = "tipoVoto", default)]
    tipo_voto: Option<String>,
    // The provider has published the voter under both names.
    #[serde(rename = "deputado_", default)]
    deputado_: Option<DeputyRef>,
    #[serde(default)]
    deputado: Option<DeputyRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrientationRecord {
    #[serde(default)]
    sigla_partido_bloco: Option<String>,
    #[serde(default)]
    orientacao_voto: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoteSummary {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseRecord {
    valor_liquido: f64,
}

/// A party or bloc recommendation for one roll-call vote.
#[derive(Debug, Clone, PartialEq)]
pub struct Orientation {
    pub party: String,
    pub choice: Option<VoteChoice>,
}

fn deputy_from_record(record: DeputyRecord) -> Legislator {
    Legislator {
        id: record.id,
        name: record.nome,
        party: record.sigla_partido.unwrap_or_default(),
        state: record.sigla_uf.unwrap_or_default(),
        photo: record.url_foto.unwrap_or_default(),
        house: House::Deputy,
    }
}

pub fn parse_deputies(body: &Value) -> Vec<Legislator> {
    records::<DeputyRecord>(dados(body, "deputies"), "deputy")
        .into_iter()
        .map(deputy_from_record)
        .collect()
}

pub fn parse_ballots(body: &Value) -> Vec<Ballot> {
    records::<BallotRecord>(dados(body, "ballots"), "ballot")
        .into_iter()
        .filter_map(|record| {
            let voter = record.deputado_.or(record.deputado)?;
            let choice = record.tipo_voto.as_deref().and_then(VoteChoice::from_provider)?;
            Some(Ballot {
                legislator_id: voter.id,
                choice,
            })
        })
        .collect()
}

/// Everyone with a recorded ballot, abstentions and obstructions included.
pub fn parse_voters(body: &Value) -> Vec<u64> {
    records::<BallotRecord>(dados(body, "ballots"), "ballot")
        .into_iter()
        .filter_map(|record| record.deputado_.or(record.deputado))
        .map(|voter| voter.id)
        .collect()
}

pub fn parse_expenses(body: &Value) -> Vec<f64> {
    records::<ExpenseRecord>(dados(body, "expenses"), "expense")
        .into_iter()
        .map(|record| record.valor_liquido)
        .collect()
}

pub fn parse_orientations(body: &Value) -> Vec<Orientation> {
    records::<OrientationRecord>(dados(body, "orientations"), "orientation")
        .into_iter()
        .filter_map(|record| {
            Some(Orientation {
                party: record.sigla_partido_bloco?,
                choice: record.orientacao_voto.as_deref().and_then(VoteChoice::from_provider),
            })
        })
        .collect()
}

pub fn parse_vote_ids(body: &Value) -> Vec<String> {
    records::<VoteSummary>(dados(body, "votes"), "vote")
        .into_iter()
        .map(|summary| summary.id)
        .collect()
}

/// The party's recommendation for a vote, matched by acronym. A party's own
/// orientation wins over the federation or bloc it belongs to.
pub fn recommendation_for(orientations: &[Orientation], party: &str) -> Option<VoteChoice> {
    let party = fold(party);
    orientations
        .iter()
        .find(|orientation| fold(&orientation.party) == party)
        .or_else(|| {
            orientations
                .iter()
                .find(|orientation| bloc_members(&orientation.party).contains(&party))
        })
        .and_then(|orientation| orientation.choice)
}

// "Fdr PT-PCdoB-PV" -> ["pt", "pcdob", "pv"]
fn bloc_members(acronym: &str) -> Vec<String> {
    let folded = fold(acronym);
    let members = folded.rsplit(' ').next().unwrap_or_default();
    members.split('-').map(str::to_string).collect()
}

fn dados<'a>(body: &'a Value, what: &str) -> &'a [Value] {
    match body.get("dados").and_then(Value::as_array) {
        Some(items) => items,
        None => {
            warn!("Chamber {} response has no \"dados\" array, treating as empty", what);
            &[]
        }
    }
}

#[derive(Clone)]
pub struct CamaraClient {
    fetcher: Fetcher,
    base_url: String,
}

impl CamaraClient {
    pub fn new(fetcher: Fetcher, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn deputies(&self) -> Result<Vec<Legislator>, FetchError> {
        let url = format!("{}/deputados", self.base_url);
        let body = self
            .fetcher
            .get_json(&url, &[("itens", ROSTER_PAGE_SIZE.to_string())])
            .await?;
        let deputies = parse_deputies(&body);
        debug!("Fetched {} deputies", deputies.len());
        Ok(deputies)
    }

    pub async fn ballots(&self, vote_id: &str) -> Result<Vec<Ballot>, FetchError> {
        let url = format!("{}/votacoes/{}/votos", self.base_url, vote_id);
        let body = self.fetcher.get_json(&url, &[]).await?;
        Ok(parse_ballots(&body))
    }

    pub async fn voters(&self, vote_id: &str) -> Result<Vec<u64>, FetchError> {
        let url = format!("{}/votacoes/{}/votos", self.base_url, vote_id);
        let body = self.fetcher.get_json(&url, &[]).await?;
        Ok(parse_voters(&body))
    }

    /// Net value of the deputy's most recent expense claims.
    pub async fn expenses(&self, deputy_id: u64) -> Result<Vec<f64>, FetchError> {
        let url = format!("{}/deputados/{}/despesas", self.base_url, deputy_id);
        let body = self
            .fetcher
            .get_json(&url, &[("itens", EXPENSE_PAGE_SIZE.to_string())])
            .await?;
        Ok(parse_expenses(&body))
    }

    pub async fn orientations(&self, vote_id: &str) -> Result<Vec<Orientation>, FetchError> {
        let url = format!("{}/votacoes/{}/orientacoes", self.base_url, vote_id);
        let body = self.fetcher.get_json(&url, &[]).await?;
        Ok(parse_orientations(&body))
    }

    /// Most recently registered roll-call votes, newest first.
    pub async fn recent_votes(&self, limit: usize) -> Result<Vec<String>, FetchError> {
        let url = format!("{}/votacoes", self.base_url);
        let query = [
            ("ordem", "DESC".to_string()),
            ("ordenarPor", "dataHoraRegistro".to_string()),
            ("itens", limit.to_string()),
        ];
        let body = self.fetcher.get_json(&url, &query).await?;
        Ok(parse_vote_ids(&body))
    }
}
