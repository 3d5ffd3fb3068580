pub mod camara;
pub mod fetcher;
pub mod senado;

pub use camara::CamaraClient;
pub use fetcher::Fetcher;
pub use senado::SenadoClient;

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

// Decode each item on its own so one malformed record doesn't sink the page.
fn records<T: DeserializeOwned>(items: &[Value], what: &str) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Skipping malformed {} record: {}", what, e);
                None
            }
        })
        .collect()
}
