use crate::error::FetchError;
use log::{debug, warn};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Outbound JSON client. HTTP 429 is retried with exponential backoff,
/// every other failure is returned on the first attempt.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    backoff_base: Duration,
}

impl Fetcher {
    pub fn new(
        timeout: Duration,
        max_retries: u32,
        backoff_base: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base,
        })
    }

    /// `base * 2^retries`, saturating instead of overflowing.
    fn backoff(&self, retries: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(retries))
    }

    pub async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let mut retries = 0;

        loop {
            debug!("GET {} {:?}", url, query);
            let response = self
                .client
                .get(url)
                .query(query)
                .header(ACCEPT, "application/json")
                .send()
                .await
                .map_err(|source| FetchError::Request {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if retries >= self.max_retries {
                    return Err(FetchError::RateLimited {
                        url: url.to_string(),
                        attempts: retries + 1,
                    });
                }
                // 1x, 2x, 4x the base delay
                let delay = self.backoff(retries);
                warn!("{} rate limited, retrying in {:?}", url, delay);
                tokio::time::sleep(delay).await;
                retries += 1;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            return response
                .json::<Value>()
                .await
                .map_err(|source| FetchError::Decode {
                    url: url.to_string(),
                    source,
                });
        }
    }
}
