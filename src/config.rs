use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::warn;

pub const OPEN_FOOD_FACTS_BASE_URL: &str = "https://world.openfoodfacts.org";
pub const USDA_BASE_URL: &str = "https://api.nal.usda.gov";
/// Public FoodData Central key. Heavily rate-limited.
pub const USDA_DEMO_KEY: &str = "DEMO_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which external food database to query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderKind {
    /// `GET {base}/cgi/search.pl?...&json=1`, body `{ products: [...] }`
    #[default]
    OpenFoodFacts,
    /// `GET {base}/fdc/v1/foods/search?query=..&api_key=..`, body `{ foods: [...] }`
    Usda,
}

impl ProviderKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenFoodFacts => OPEN_FOOD_FACTS_BASE_URL,
            ProviderKind::Usda => USDA_BASE_URL,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openfoodfacts" | "off" => Ok(ProviderKind::OpenFoodFacts),
            "usda" | "fdc" => Ok(ProviderKind::Usda),
            other => Err(anyhow!(
                "Unknown food provider '{}', expected 'openfoodfacts' or 'usda'",
                other
            )),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenFoodFacts => f.write_str("openfoodfacts"),
            ProviderKind::Usda => f.write_str("usda"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub provider: ProviderKind,
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Only sent to the USDA provider.
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
}

impl SearchConfig {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            base_url: provider.default_base_url().to_string(),
            api_key: match provider {
                ProviderKind::Usda => Some(USDA_DEMO_KEY.to_string()),
                ProviderKind::OpenFoodFacts => None,
            },
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Replace the base URL, dropping any trailing slash.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_env_with_provider(None)
    }

    /// Like [`SearchConfig::from_env`], with `provider` taking precedence over `FOOD_PROVIDER`.
    pub fn from_env_with_provider(provider: Option<ProviderKind>) -> Result<Self> {
        Self::from_lookup_with_provider(|key| std::env::var(key).ok(), provider)
    }

    /// Build from `FOOD_PROVIDER`, `FOOD_API_BASE_URL`, `USDA_API_KEY` and
    /// `FOOD_REQUEST_TIMEOUT_SECS`, read through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_with_provider(lookup, None)
    }

    pub fn from_lookup_with_provider<F>(lookup: F, provider: Option<ProviderKind>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match provider {
            Some(kind) => kind,
            None => match value("FOOD_PROVIDER") {
                Some(v) => v.parse()?,
                None => ProviderKind::default(),
            },
        };

        let mut config = Self::new(provider);

        if let Some(base) = value("FOOD_API_BASE_URL") {
            config = config.with_base_url(base.trim());
        }

        if provider == ProviderKind::Usda {
            match value("USDA_API_KEY") {
                Some(key) => config.api_key = Some(key.trim().to_string()),
                None => warn!("USDA_API_KEY not set, using the rate-limited {USDA_DEMO_KEY}"),
            }
        }

        if let Some(raw) = value("FOOD_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid FOOD_REQUEST_TIMEOUT_SECS '{}': {}", raw, e))?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_open_food_facts() {
        let config = SearchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.provider, ProviderKind::OpenFoodFacts);
        assert_eq!(config.base_url, OPEN_FOOD_FACTS_BASE_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn usda_uses_demo_key_unless_configured() {
        let config = SearchConfig::from_lookup(lookup(&[("FOOD_PROVIDER", "USDA")])).unwrap();
        assert_eq!(config.provider, ProviderKind::Usda);
        assert_eq!(config.base_url, USDA_BASE_URL);
        assert_eq!(config.api_key.as_deref(), Some(USDA_DEMO_KEY));

        let config = SearchConfig::from_lookup(lookup(&[
            ("FOOD_PROVIDER", "fdc"),
            ("USDA_API_KEY", "secret"),
            ("FOOD_API_BASE_URL", "http://localhost:9000/"),
            ("FOOD_REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.base_url, "http://localhost:9000");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn blank_timeout_keeps_default() {
        let config =
            SearchConfig::from_lookup(lookup(&[("FOOD_REQUEST_TIMEOUT_SECS", " ")])).unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn provider_override_keeps_env_key_and_base() {
        let env = lookup(&[
            ("FOOD_PROVIDER", "openfoodfacts"),
            ("USDA_API_KEY", "secret"),
            ("FOOD_API_BASE_URL", "http://localhost:9000"),
            ("FOOD_REQUEST_TIMEOUT_SECS", "5"),
        ]);
        let config = SearchConfig::from_lookup_with_provider(env, Some(ProviderKind::Usda)).unwrap();
        assert_eq!(config.provider, ProviderKind::Usda);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            crate::client::search_url(&config, "cheese"),
            "http://localhost:9000/fdc/v1/foods/search?query=cheese&api_key=secret"
        );

        // An invalid env provider is ignored when the caller picks one.
        let config = SearchConfig::from_lookup_with_provider(
            lookup(&[("FOOD_PROVIDER", "edamam")]),
            Some(ProviderKind::OpenFoodFacts),
        )
        .unwrap();
        assert_eq!(config.provider, ProviderKind::OpenFoodFacts);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SearchConfig::from_lookup(lookup(&[("FOOD_PROVIDER", "edamam")])).is_err());
        assert!(
            SearchConfig::from_lookup(lookup(&[("FOOD_REQUEST_TIMEOUT_SECS", "soon")])).is_err()
        );
    }
}
