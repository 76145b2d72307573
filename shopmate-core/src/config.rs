//! Environment-derived configuration.
//!
//! All settings are assembled once at startup into a [`Settings`] value and
//! passed to each client at construction; no code reads the environment ad
//! hoc. Lookups go through an injectable function so tests never touch the
//! process environment.

use crate::error::ConfigError;

/// Default HTTP port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3978;

/// Default local catalog path when `CATALOG_PATH` is unset.
pub const DEFAULT_CATALOG_PATH: &str = "data/sample_products.json";

/// Channel (bot) credentials.
///
/// When `BOT_AUTH_DISABLED` is `"true"` both fields are blank and the
/// adapter sends replies unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSettings {
    /// Channel app id.
    pub app_id: String,
    /// Channel app password.
    pub app_password: String,
}

impl ChannelSettings {
    /// Whether credentials are blank (auth disabled or never configured).
    pub fn is_anonymous(&self) -> bool {
        self.app_id.is_empty()
    }
}

/// Hosted search index connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Search service endpoint, e.g. `https://my-search.search.windows.net`.
    pub endpoint: String,
    /// Admin/query API key.
    pub api_key: String,
    /// Target index name.
    pub index_name: String,
}

/// Hosted OpenAI deployment settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiSettings {
    /// Service endpoint, e.g. `https://my-openai.openai.azure.com`.
    pub endpoint: String,
    /// API key sent in the `api-key` header.
    pub api_key: String,
    /// Chat completion deployment name.
    pub deployment: String,
    /// Embedding model deployment name.
    pub embedding_model: String,
}

/// Complete process configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Channel credentials.
    pub channel: ChannelSettings,
    /// Hosted search index settings.
    pub search: SearchSettings,
    /// Hosted OpenAI settings.
    pub openai: OpenAiSettings,
    /// Run the offline indexer before accepting traffic.
    pub index_refresh_enabled: bool,
    /// Local product catalog consumed by the indexer.
    pub catalog_path: String,
    /// HTTP port to listen on.
    pub port: u16,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] for absent required variables and
    /// [`ConfigError::InvalidValue`] for an unparseable `PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(ConfigError::MissingVar { name: name.to_string() }),
            }
        };
        let flag = |name: &str| lookup(name).is_some_and(|v| v == "true");

        let auth_disabled = flag("BOT_AUTH_DISABLED");
        let channel = if auth_disabled {
            ChannelSettings { app_id: String::new(), app_password: String::new() }
        } else {
            ChannelSettings {
                app_id: lookup("BOT_ID").unwrap_or_default(),
                app_password: lookup("BOT_PASSWORD").unwrap_or_default(),
            }
        };

        let search = SearchSettings {
            endpoint: required("AZURE_SEARCH_ENDPOINT")?,
            api_key: required("AZURE_SEARCH_API_KEY")?,
            index_name: required("AZURE_SEARCH_INDEX_NAME")?,
        };

        let openai = OpenAiSettings {
            endpoint: required("AZURE_OPENAI_ENDPOINT")?,
            api_key: required("AZURE_OPENAI_API_KEY")?,
            deployment: required("AZURE_OPENAI_DEPLOYMENT_NAME")?,
            embedding_model: required("EMBEDDING_MODEL_NAME")?,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                message: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            channel,
            search,
            openai,
            index_refresh_enabled: flag("INDEX_REFRESH_ENABLED"),
            catalog_path: lookup("CATALOG_PATH")
                .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string()),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("BOT_ID", "app-id"),
            ("BOT_PASSWORD", "app-secret"),
            ("AZURE_SEARCH_ENDPOINT", "https://search.example.net"),
            ("AZURE_SEARCH_API_KEY", "search-key"),
            ("AZURE_SEARCH_INDEX_NAME", "products"),
            ("AZURE_OPENAI_ENDPOINT", "https://openai.example.net"),
            ("AZURE_OPENAI_API_KEY", "openai-key"),
            ("AZURE_OPENAI_DEPLOYMENT_NAME", "gpt-4"),
            ("EMBEDDING_MODEL_NAME", "text-embedding-ada-002"),
        ])
    }

    fn load(env: &HashMap<&str, &str>) -> Result<Settings, ConfigError> {
        Settings::from_lookup(|name| env.get(name).map(|v| (*v).to_string()))
    }

    #[test]
    fn loads_with_defaults() {
        let settings = load(&base_env()).unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.catalog_path, DEFAULT_CATALOG_PATH);
        assert!(!settings.index_refresh_enabled);
        assert_eq!(settings.channel.app_id, "app-id");
        assert!(!settings.channel.is_anonymous());
    }

    #[test]
    fn auth_disabled_blanks_credentials() {
        let mut env = base_env();
        env.insert("BOT_AUTH_DISABLED", "true");
        let settings = load(&env).unwrap();
        assert!(settings.channel.app_id.is_empty());
        assert!(settings.channel.app_password.is_empty());
        assert!(settings.channel.is_anonymous());
    }

    #[test]
    fn missing_required_variable_is_a_typed_error() {
        let mut env = base_env();
        env.remove("AZURE_SEARCH_API_KEY");
        match load(&env) {
            Err(ConfigError::MissingVar { name }) => assert_eq!(name, "AZURE_SEARCH_API_KEY"),
            other => panic!("expected MissingVar, got {other:?}"),
        }
    }

    #[test]
    fn invalid_port_is_a_typed_error() {
        let mut env = base_env();
        env.insert("PORT", "not-a-port");
        assert!(matches!(load(&env), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn port_and_flags_parse() {
        let mut env = base_env();
        env.insert("PORT", "8080");
        env.insert("INDEX_REFRESH_ENABLED", "true");
        let settings = load(&env).unwrap();
        assert_eq!(settings.port, 8080);
        assert!(settings.index_refresh_enabled);
    }
}
