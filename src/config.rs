use crate::models::ReferenceBattery;
use crate::scoring::ScoringPolicy;
use crate::votes::is_valid_vote_id;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CAMARA_URL: &str = "https://dadosabertos.camara.leg.br/api/v2";
const DEFAULT_SENADO_URL: &str = "https://legis.senado.leg.br/dadosabertos";
const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("cannot read reference votes from {path}: {source}")]
    BatteryRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse reference votes from {path}: {source}")]
    BatteryParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("reference battery is invalid: {0}")]
    Battery(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub camara_url: String,
    pub senado_url: String,
    pub http_timeout: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub vote_detail_pacing: Duration,
    pub kpi_window: usize,
    pub kpi_concurrency: usize,
    pub expense_sample: usize,
    /// Zero disables roster caching.
    pub directory_ttl: Duration,
    /// Zero disables the background refresh task.
    pub directory_refresh: Duration,
    pub policy: ScoringPolicy,
    pub battery: ReferenceBattery,
}

impl Config {
    /// Load from the process environment (after `.env` has been applied).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let battery = match lookup("REFERENCE_VOTES_FILE") {
            Some(path) => load_battery(&path)?,
            None => ReferenceBattery::default(),
        };
        validate_battery(&battery)?;

        let max_retries = parse(&lookup, "HTTP_MAX_RETRIES", 3)?;
        if max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::Invalid {
                key: "HTTP_MAX_RETRIES",
                value: max_retries.to_string(),
            });
        }

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            camara_url: lookup("CAMARA_API_URL").unwrap_or_else(|| DEFAULT_CAMARA_URL.to_string()),
            senado_url: lookup("SENADO_API_URL").unwrap_or_else(|| DEFAULT_SENADO_URL.to_string()),
            http_timeout: Duration::from_secs(parse(&lookup, "HTTP_TIMEOUT_SECS", 10)?),
            max_retries,
            backoff_base: Duration::from_millis(parse(&lookup, "HTTP_BACKOFF_BASE_MS", 1000)?),
            vote_detail_pacing: Duration::from_millis(parse(&lookup, "VOTE_DETAIL_PACING_MS", 100)?),
            kpi_window: parse(&lookup, "KPI_WINDOW", 100)?,
            kpi_concurrency: parse(&lookup, "KPI_CONCURRENCY", 8)?,
            expense_sample: parse(&lookup, "EXPENSE_SAMPLE", 10)?,
            directory_ttl: Duration::from_secs(parse(&lookup, "DIRECTORY_TTL_SECS", 600)?),
            directory_refresh: Duration::from_secs(parse(&lookup, "DIRECTORY_REFRESH_SECS", 0)?),
            policy: parse(&lookup, "AFFINITY_SMOOTHING", ScoringPolicy::Laplace)?,
            battery,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn load_battery(path: &str) -> Result<ReferenceBattery, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::BatteryRead {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::BatteryParse {
        path: path.to_string(),
        source,
    })
}

fn validate_battery(battery: &ReferenceBattery) -> Result<(), ConfigError> {
    if battery.votes().is_empty() {
        return Err(ConfigError::Battery("no reference votes".to_string()));
    }
    for vote in battery.votes() {
        if !is_valid_vote_id(&vote.vote_id) {
            return Err(ConfigError::Battery(format!(
                "question {} refers to malformed vote id {:?}",
                vote.question_id, vote.vote_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VoteChoice;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.camara_url, DEFAULT_CAMARA_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backoff_base, Duration::from_secs(1));
        assert_eq!(config.vote_detail_pacing, Duration::from_millis(100));
        assert_eq!(config.kpi_window, 100);
        assert_eq!(config.expense_sample, 10);
        assert_eq!(config.policy, ScoringPolicy::Laplace);
        assert_eq!(config.battery, ReferenceBattery::default());
    }

    #[test]
    fn overrides() {
        let config = config_with(&[
            ("AFFINITY_SMOOTHING", "plain"),
            ("KPI_WINDOW", "25"),
            ("DIRECTORY_TTL_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(config.policy, ScoringPolicy::Plain);
        assert_eq!(config.kpi_window, 25);
        assert_eq!(config.directory_ttl, Duration::ZERO);
    }

    #[test]
    fn invalid_numbers_name_the_variable() {
        let err = config_with(&[("KPI_WINDOW", "lots")]).unwrap_err();
        match err {
            ConfigError::Invalid { key, value } => {
                assert_eq!(key, "KPI_WINDOW");
                assert_eq!(value, "lots");
            }
            other => panic!("expected Invalid, got: {other:?}"),
        }
    }

    #[test]
    fn retry_budget_is_bounded() {
        assert_eq!(config_with(&[("HTTP_MAX_RETRIES", "10")]).unwrap().max_retries, 10);

        let err = config_with(&[("HTTP_MAX_RETRIES", "40")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HTTP_MAX_RETRIES", .. }));
    }

    #[test]
    fn battery_file_is_loaded() {
        let path = std::env::temp_dir().join(format!("battery-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{ "question_id": "q9", "vote_id": "1000-1", "yes_meaning": "nao" }]"#,
        )
        .unwrap();

        let config = config_with(&[("REFERENCE_VOTES_FILE", path.to_str().unwrap())]).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.battery.votes().len(), 1);
        assert_eq!(config.battery.votes()[0].yes_meaning, VoteChoice::No);
    }

    #[test]
    fn battery_with_bad_vote_id_is_rejected() {
        let battery = ReferenceBattery(vec![crate::models::ReferenceVote::new(
            "q1",
            "not-a-vote",
            VoteChoice::Yes,
        )]);
        assert!(matches!(validate_battery(&battery), Err(ConfigError::Battery(_))));
    }

    #[test]
    fn missing_battery_file_is_reported() {
        let err = config_with(&[("REFERENCE_VOTES_FILE", "/nonexistent/battery.json")]).unwrap_err();
        assert!(matches!(err, ConfigError::BatteryRead { .. }));
    }
}
