use crate::error::{BookSearchError, Result};
use std::path::PathBuf;

pub const DEFAULT_SEED: u64 = 42;

/// Runtime settings for the demo. Every field can be overridden from the
/// environment; there are no command line flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub index_name: String,
    pub dataset_path: PathBuf,
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 9200,
            index_name: "books".to_string(),
            dataset_path: PathBuf::from("data/books.json"),
            seed: DEFAULT_SEED,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup, falling back to the
    /// defaults for keys that are unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(scheme) = lookup("ELASTICSEARCH_SCHEME") {
            settings.scheme = scheme;
        }
        if let Some(host) = lookup("ELASTICSEARCH_HOST") {
            settings.host = host;
        }
        if let Some(port) = lookup("ELASTICSEARCH_PORT") {
            settings.port = port.parse().map_err(|_| {
                BookSearchError::InvalidConfig(format!("ELASTICSEARCH_PORT={}", port))
            })?;
        }
        if let Some(index_name) = lookup("BOOKS_INDEX") {
            settings.index_name = index_name;
        }
        if let Some(path) = lookup("DATASET_PATH") {
            settings.dataset_path = PathBuf::from(path);
        }
        if let Some(seed) = lookup("DATASET_SEED") {
            settings.seed = seed
                .parse()
                .map_err(|_| BookSearchError::InvalidConfig(format!("DATASET_SEED={}", seed)))?;
        }

        Ok(settings)
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}
