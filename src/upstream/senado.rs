// Federal Senate open-data API (legis.senado.leg.br/dadosabertos).

use super::{Fetcher, records};
use crate::error::FetchError;
use crate::models::{House, Legislator, RecordedVote, VoteChoice, fold};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SenatorRecord {
    identificacao_parlamentar: SenatorIdentity,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SenatorIdentity {
    codigo_parlamentar: String,
    nome_parlamentar: String,
    #[serde(default)]
    sigla_partido_parlamentar: Option<String>,
    #[serde(default)]
    uf_parlamentar: Option<String>,
    #[serde(default)]
    url_foto_parlamentar: Option<String>,
}

fn senator_from_record(record: SenatorRecord) -> Option<Legislator> {
    let identity = record.identificacao_parlamentar;
    let id = match identity.codigo_parlamentar.trim().parse() {
        Ok(id) => id,
        Err(_) => {
            warn!(
                "Skipping senator {:?} with non-numeric code {:?}",
                identity.nome_parlamentar, identity.codigo_parlamentar
            );
            return None;
        }
    };

    Some(Legislator {
        id,
        name: identity.nome_parlamentar,
        party: identity.sigla_partido_parlamentar.unwrap_or_default(),
        state: identity.uf_parlamentar.unwrap_or_default(),
        photo: identity.url_foto_parlamentar.unwrap_or_default(),
        house: House::Senator,
    })
}

pub fn parse_senators(body: &Value) -> Vec<Legislator> {
    let items = body
        .pointer("/ListaParlamentarEmExercicio/Parlamentares/Parlamentar")
        .and_then(Value::as_array);

    let Some(items) = items else {
        warn!("Senate roster response has no Parlamentar array, treating as empty");
        return Vec::new();
    };

    records::<SenatorRecord>(items, "senator")
        .into_iter()
        .filter_map(senator_from_record)
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SenateVoteRecord {
    #[serde(default)]
    codigo_sessao_votacao: Option<String>,
    #[serde(default)]
    sessao_plenaria: Option<PlenarySession>,
    #[serde(default)]
    sigla_descricao_voto: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlenarySession {
    #[serde(default)]
    data_sessao: Option<String>,
}

// Ballot codes of senators who were in the chamber. Leave, mission and
// "NCom" (did not attend) codes count as absent.
const PRESENT_CODES: &[&str] = &["sim", "nao", "abstencao", "obstrucao", "p-nrv", "votou"];

fn is_present(code: &str) -> bool {
    let code = fold(code);
    PRESENT_CODES.contains(&code.as_str()) || code.starts_with("presidente")
}

fn recorded_vote(record: SenateVoteRecord) -> RecordedVote {
    let code = record.sigla_descricao_voto.unwrap_or_default();
    let held_on = record
        .sessao_plenaria
        .and_then(|session| session.data_sessao)
        .and_then(|date| NaiveDate::parse_from_str(date.get(..10)?, "%Y-%m-%d").ok());

    RecordedVote {
        session: record.codigo_sessao_votacao.unwrap_or_default(),
        held_on,
        choice: VoteChoice::from_provider(&code),
        present: is_present(&code),
    }
}

/// A senator's voting history, newest first. Undated entries go last.
pub fn parse_voting_record(body: &Value) -> Vec<RecordedVote> {
    let items = body
        .pointer("/VotacaoParlamentar/Parlamentar/Votacoes/Votacao")
        .and_then(Value::as_array);

    let Some(items) = items else {
        warn!("Senate voting record has no Votacao array, treating as empty");
        return Vec::new();
    };

    let mut votes: Vec<RecordedVote> = records::<SenateVoteRecord>(items, "senate vote")
        .into_iter()
        .map(recorded_vote)
        .collect();
    votes.sort_by(|a, b| b.held_on.cmp(&a.held_on));
    votes
}

#[derive(Clone)]
pub struct SenadoClient {
    fetcher: Fetcher,
    base_url: String,
}

impl SenadoClient {
    pub fn new(fetcher: Fetcher, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn senators(&self) -> Result<Vec<Legislator>, FetchError> {
        let url = format!("{}/senador/lista/atual", self.base_url);
        let body = self.fetcher.get_json(&url, &[]).await?;
        let senators = parse_senators(&body);
        debug!("Fetched {} senators", senators.len());
        Ok(senators)
    }

    pub async fn voting_record(&self, senator_id: u64) -> Result<Vec<RecordedVote>, FetchError> {
        let url = format!("{}/senador/{}/votacoes", self.base_url, senator_id);
        let body = self.fetcher.get_json(&url, &[]).await?;
        let votes = parse_voting_record(&body);
        debug!("Senator {}: {} recorded votes", senator_id, votes.len());
        Ok(votes)
    }
}
