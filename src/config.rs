//! Runtime settings read from the environment (and `.env`, loaded by the
//! binary before anything else).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::scoring::classify::GroceryTaxonomy;

pub const PLACES_KEY_VAR: &str = "GOOGLE_PLACES_API_KEY";
pub const DISTANCE_MATRIX_KEY_VAR: &str = "GOOGLE_DISTANCE_MATRIX_API_KEY";

/// Value shipped in the sample `.env`; treated as unset.
const PLACEHOLDER_KEY: &str = "your_api_key_here";

const DEFAULT_INTERVAL_MS: u64 = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub places_key: Option<String>,
    pub distance_matrix_key: Option<String>,
    pub listings_dir: PathBuf,
    pub request_interval: Duration,
    pub taxonomy_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && v != PLACEHOLDER_KEY)
        };

        let request_interval = match lookup("REQUEST_INTERVAL_MS") {
            Some(raw) => {
                let ms = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSetting {
                        name: "REQUEST_INTERVAL_MS",
                        value: raw.clone(),
                    })?;
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_INTERVAL_MS),
        };

        Ok(Self {
            places_key: credential(PLACES_KEY_VAR),
            distance_matrix_key: credential(DISTANCE_MATRIX_KEY_VAR),
            listings_dir: lookup("LISTINGS_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            request_interval,
            taxonomy_path: lookup("GROCERY_TAXONOMY_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn require_places_key(&self) -> Result<&str, ConfigError> {
        self.places_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential(PLACES_KEY_VAR))
    }

    pub fn require_distance_matrix_key(&self) -> Result<&str, ConfigError> {
        self.distance_matrix_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential(DISTANCE_MATRIX_KEY_VAR))
    }

    /// The configured taxonomy file, or the built-in keyword lists.
    pub fn grocery_taxonomy(&self) -> Result<GroceryTaxonomy, ConfigError> {
        match &self.taxonomy_path {
            Some(path) => GroceryTaxonomy::load(path),
            None => Ok(GroceryTaxonomy::default()),
        }
    }
}
