use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{PokedexError, Result};

/// Read-only access to the remote catalog.
///
/// Every call is a single GET returning JSON. Non-2xx statuses and bodies
/// that are not JSON are network failures.
#[async_trait]
pub trait Remote: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value>;

    /// Base address used to build the collection and category urls.
    fn base_url(&self) -> &str;

    fn collection_url(&self, limit: usize, offset: usize) -> String {
        format!("{}/pokemon?limit={limit}&offset={offset}", self.base_url())
    }
    fn category_url(&self, category: &str) -> String {
        format!("{}/type/{category}", self.base_url())
    }
}

/// Fetches `url` and deserializes it into a wire shape.
pub async fn fetch<T: DeserializeOwned>(remote: &dyn Remote, url: &str) -> Result<T> {
    let value = remote.get_json(url).await?;
    serde_json::from_value(value)
        .map_err(|e| PokedexError::malformed(format!("{url}: {e}")))
}

pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
}
impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl Remote for HttpRemote {
    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(PokedexError::Network(format!("{url}: HTTP {}", response.status())));
        }
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| PokedexError::Network(format!("{url}: body is not JSON: {e}")))
    }
    fn base_url(&self) -> &str {
        &self.base_url
    }
}
