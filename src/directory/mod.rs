use crate::error::FetchError;
use crate::models::{House, Legislator, fold};
use crate::upstream::{CamaraClient, SenadoClient};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Where the roster of both houses comes from.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Legislator>, FetchError>;
}

/// Roster read from the two open-data providers.
pub struct ProviderRoster {
    camara: CamaraClient,
    senado: SenadoClient,
}

impl ProviderRoster {
    pub fn new(camara: CamaraClient, senado: SenadoClient) -> Self {
        Self { camara, senado }
    }
}

#[async_trait]
impl RosterSource for ProviderRoster {
    async fn list_all(&self) -> Result<Vec<Legislator>, FetchError> {
        // Either house failing fails the listing; no partial rosters.
        let (mut deputies, senators) =
            tokio::try_join!(self.camara.deputies(), self.senado.senators())?;
        deputies.extend(senators);
        Ok(deputies)
    }
}

/// De-duplicated roster, in provider order.
#[derive(Debug, Default)]
pub struct Roster {
    legislators: Vec<Legislator>,
    index: HashMap<(House, u64), usize>,
}

impl Roster {
    pub fn from_legislators(all: Vec<Legislator>) -> Self {
        let mut roster = Roster::default();
        for legislator in all {
            let key = (legislator.house, legislator.id);
            if roster.index.contains_key(&key) {
                debug!("Merging duplicate roster record for {:?} {}", key.0, key.1);
                continue;
            }
            roster.index.insert(key, roster.legislators.len());
            roster.legislators.push(legislator);
        }
        roster
    }

    pub fn get(&self, house: House, id: u64) -> Option<&Legislator> {
        self.index.get(&(house, id)).map(|&i| &self.legislators[i])
    }

    pub fn legislators(&self) -> &[Legislator] {
        &self.legislators
    }

    pub fn len(&self) -> usize {
        self.legislators.len()
    }

    /// Case- and accent-insensitive name search. An empty term matches nothing.
    pub fn search(&self, term: &str) -> Vec<Legislator> {
        let term = fold(term);
        if term.is_empty() {
            return Vec::new();
        }
        self.legislators
            .iter()
            .filter(|legislator| fold(&legislator.name).contains(&term))
            .cloned()
            .collect()
    }
}

struct CachedRoster {
    roster: Arc<Roster>,
    fetched_at: DateTime<Utc>,
}

/// Process-wide roster cache. Reads are shared, refreshes are single-writer.
pub struct DirectoryCache {
    source: Arc<dyn RosterSource>,
    ttl: Duration,
    cached: RwLock<Option<CachedRoster>>,
    refresh_lock: Mutex<()>,
}

impl DirectoryCache {
    /// A zero `ttl` disables caching.
    pub fn new(source: Arc<dyn RosterSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub async fn roster(&self) -> Result<Arc<Roster>, FetchError> {
        if let Some(roster) = self.fresh().await {
            return Ok(roster);
        }

        let _guard = self.refresh_lock.lock().await;
        // someone else may have refreshed while we waited
        if let Some(roster) = self.fresh().await {
            return Ok(roster);
        }
        self.reload().await
    }

    /// Reload from the source regardless of age.
    pub async fn refresh(&self) -> Result<Arc<Roster>, FetchError> {
        let _guard = self.refresh_lock.lock().await;
        self.reload().await
    }

    async fn fresh(&self) -> Option<Arc<Roster>> {
        let cached = self.cached.read().await;
        cached
            .as_ref()
            .filter(|entry| Utc::now() - entry.fetched_at < self.ttl)
            .map(|entry| Arc::clone(&entry.roster))
    }

    async fn reload(&self) -> Result<Arc<Roster>, FetchError> {
        let roster = Arc::new(Roster::from_legislators(self.source.list_all().await?));
        info!("Loaded roster with {} legislators", roster.len());

        if self.ttl > Duration::zero() {
            *self.cached.write().await = Some(CachedRoster {
                roster: Arc::clone(&roster),
                fetched_at: Utc::now(),
            });
        }
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeRoster, legislator};
    use crate::upstream::Fetcher;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn duplicates_merge_to_first_record() {
        let roster = Roster::from_legislators(vec![
            legislator(House::Deputy, 1, "Ana", "PT"),
            legislator(House::Deputy, 2, "Bruno", "PL"),
            legislator(House::Deputy, 1, "Ana (dup)", "PSB"),
            legislator(House::Senator, 1, "Carla", "MDB"),
        ]);

        assert_eq!(roster.len(), 3);
        assert_eq!(roster.get(House::Deputy, 1).unwrap().name, "Ana");
        assert_eq!(roster.get(House::Senator, 1).unwrap().name, "Carla");
        assert!(roster.get(House::Senator, 2).is_none());
    }

    #[test]
    fn search_ignores_case_and_accents() {
        let roster = Roster::from_legislators(vec![
            legislator(House::Deputy, 1, "José Antônio", "PT"),
            legislator(House::Senator, 2, "Sérgio Moro", "UNIAO"),
        ]);

        let found = roster.search("antonio");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
        assert_eq!(roster.search("MORO")[0].id, 2);
        assert!(roster.search("  ").is_empty());
    }

    #[tokio::test]
    async fn cache_serves_fresh_roster_without_refetching() {
        let source = Arc::new(FakeRoster::new(vec![legislator(House::Deputy, 1, "Ana", "PT")]));
        let cache = DirectoryCache::new(source.clone(), Duration::minutes(10));

        cache.roster().await.unwrap();
        cache.roster().await.unwrap();
        assert_eq!(source.calls(), 1);

        cache.refresh().await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn zero_ttl_always_refetches() {
        let source = Arc::new(FakeRoster::new(vec![legislator(House::Deputy, 1, "Ana", "PT")]));
        let cache = DirectoryCache::new(source.clone(), Duration::zero());

        cache.roster().await.unwrap();
        cache.roster().await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn failed_load_is_reported() {
        let source = Arc::new(FakeRoster::failing());
        let cache = DirectoryCache::new(source, Duration::minutes(10));
        assert!(cache.roster().await.is_err());
    }

    fn provider_roster(server: &MockServer) -> ProviderRoster {
        let fetcher = Fetcher::new(
            std::time::Duration::from_secs(5),
            0,
            std::time::Duration::from_millis(1),
        )
        .unwrap();
        ProviderRoster::new(
            CamaraClient::new(fetcher.clone(), &format!("{}/camara", server.uri())),
            SenadoClient::new(fetcher, &format!("{}/senado", server.uri())),
        )
    }

    #[tokio::test]
    async fn provider_roster_concatenates_houses() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/camara/deputados"))
            .and(query_param("itens", "600"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dados": [
                { "id": 10, "nome": "Ana", "siglaPartido": "PT", "siglaUf": "BA", "urlFoto": "a.jpg" }
            ]})))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/senado/senador/lista/atual"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ListaParlamentarEmExercicio": { "Parlamentares": { "Parlamentar": [
                    { "IdentificacaoParlamentar": { "CodigoParlamentar": "20", "NomeParlamentar": "Bia" } }
                ]}}
            })))
            .mount(&server)
            .await;

        let all = provider_roster(&server).list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!((all[0].house, all[0].id), (House::Deputy, 10));
        assert_eq!((all[1].house, all[1].id), (House::Senator, 20));
    }

    #[tokio::test]
    async fn provider_roster_fails_when_one_house_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/camara/deputados"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dados": [] })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/senado/senador/lista/atual"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = provider_roster(&server).list_all().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }
}
