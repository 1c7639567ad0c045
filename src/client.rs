use std::future::Future;
use std::pin::Pin;

use reqwest::Client;
use tracing::debug;

use crate::config::{ProviderKind, SearchConfig, USDA_DEMO_KEY};
use crate::error::SearchError;
use crate::models::{ProductSearchResponse, SearchResult, UsdaSearchResponse};

/// Boxed future returned by dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An external food database that can be searched by free text.
pub trait FoodProvider: Send + Sync {
    /// Run one search. An empty `Vec` means the provider matched nothing.
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SearchResult>, SearchError>>;
}

/// `reqwest`-backed provider for Open Food Facts or USDA FoodData Central.
#[derive(Debug, Clone)]
pub struct HttpFoodProvider {
    client: Client,
    config: SearchConfig,
}

impl HttpFoodProvider {
    pub fn new(config: SearchConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }
}

impl FoodProvider for HttpFoodProvider {
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SearchResult>, SearchError>> {
        Box::pin(async move {
            let url = search_url(&self.config, query);
            debug!(provider = %self.config.provider, query, "sending food search");

            let resp = self.client.get(&url).send().await?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(SearchError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            // Read as text first so a bad payload is told apart from a broken connection.
            let body = resp.text().await?;
            parse_search_body(self.config.provider, &body)
        })
    }
}

/// Request target for `query`, trimmed and percent-encoded.
pub fn search_url(config: &SearchConfig, query: &str) -> String {
    let terms = urlencoding::encode(query.trim());
    match config.provider {
        ProviderKind::OpenFoodFacts => format!(
            "{}/cgi/search.pl?search_terms={}&search_simple=1&action=process&json=1",
            config.base_url, terms
        ),
        ProviderKind::Usda => format!(
            "{}/fdc/v1/foods/search?query={}&api_key={}",
            config.base_url,
            terms,
            urlencoding::encode(config.api_key.as_deref().unwrap_or(USDA_DEMO_KEY))
        ),
    }
}

/// Decode a provider's response body into search results.
pub fn parse_search_body(
    provider: ProviderKind,
    body: &str,
) -> Result<Vec<SearchResult>, SearchError> {
    let malformed = |e: serde_json::Error| SearchError::Malformed(e.to_string());
    match provider {
        ProviderKind::OpenFoodFacts => {
            let data: ProductSearchResponse = serde_json::from_str(body).map_err(malformed)?;
            Ok(data
                .products
                .unwrap_or_default()
                .into_iter()
                .map(SearchResult::OpenFoodFacts)
                .collect())
        }
        ProviderKind::Usda => {
            let data: UsdaSearchResponse = serde_json::from_str(body).map_err(malformed)?;
            Ok(data
                .foods
                .unwrap_or_default()
                .into_iter()
                .map(SearchResult::Usda)
                .collect())
        }
    }
}
