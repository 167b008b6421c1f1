use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{PokedexError, Result};
use crate::lineage::{DEFAULT_ARTWORK_URL, DEFAULT_MAX_DEPTH};
use crate::persist::PersistenceMode;

pub const DEFAULT_CONFIG_FILE: &str = "pokedex.json";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// SQLite file of the cache; the cache lives in memory when absent.
    pub path: Option<String>,
    pub quota_bytes: Option<u64>,
}
impl CacheSettings {
    pub fn persistence_mode(&self) -> PersistenceMode {
        match &self.path {
            Some(path) => PersistenceMode::File(path.clone()),
            None => PersistenceMode::InMemory,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub page_size: usize,
    pub artwork_url: String,
    pub max_lineage_depth: usize,
    #[serde(default)]
    pub cache: CacheSettings,
    pub server: ServerSettings,
}
impl Settings {
    /// Defaults, overridden by the optional file, overridden by
    /// `POKEDEX__*` environment variables (e.g. `POKEDEX__PAGE_SIZE=20`).
    pub fn load(file: &str) -> Result<Self> {
        let settings: Settings = Self::builder()?
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("POKEDEX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()
    }
    /// Only the built-in defaults.
    pub fn defaults() -> Result<Self> {
        let settings: Settings = Self::builder()?.build()?.try_deserialize()?;
        settings.validate()
    }
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("base_url", "https://pokeapi.co/api/v2")?
            .set_default("page_size", 30)?
            .set_default("artwork_url", DEFAULT_ARTWORK_URL)?
            .set_default("max_lineage_depth", DEFAULT_MAX_DEPTH as u64)?
            .set_default("server.address", "127.0.0.1:8080")?)
    }
    fn validate(self) -> Result<Self> {
        if self.page_size == 0 {
            return Err(PokedexError::Config("page_size must be positive".into()));
        }
        if self.max_lineage_depth == 0 {
            return Err(PokedexError::Config("max_lineage_depth must be positive".into()));
        }
        if !self.artwork_url.contains("{id}") {
            return Err(PokedexError::Config("artwork_url needs an {id} placeholder".into()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_usable() {
        let settings = Settings::defaults().unwrap();
        assert_eq!(settings.page_size, 30);
        assert_eq!(settings.base_url, "https://pokeapi.co/api/v2");
        assert_eq!(settings.cache.persistence_mode(), PersistenceMode::InMemory);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"page_size": 20, "cache": {{"path": "dex.db", "quota_bytes": 4096}}}}"#).unwrap();
        let settings = Settings::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.cache.quota_bytes, Some(4096));
        assert_eq!(settings.cache.persistence_mode(), PersistenceMode::File("dex.db".into()));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"page_size": 0}}"#).unwrap();
        assert!(matches!(
            Settings::load(file.path().to_str().unwrap()),
            Err(PokedexError::Config(_))
        ));
    }
}
