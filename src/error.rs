use thiserror::Error;

#[derive(Error, Debug)]
pub enum PokedexError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Network failure: {0}")]
    Network(String),
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },
    #[error("Cache write failed: {0}")]
    CacheWrite(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl PokedexError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, PokedexError>;

// Helper conversions
impl From<rusqlite::Error> for PokedexError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}
impl From<reqwest::Error> for PokedexError {
    fn from(e: reqwest::Error) -> Self { Self::Network(e.to_string()) }
}
impl From<serde_json::Error> for PokedexError {
    fn from(e: serde_json::Error) -> Self { Self::malformed(e.to_string()) }
}
impl From<config::ConfigError> for PokedexError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl<T> From<std::sync::PoisonError<T>> for PokedexError {
    fn from(e: std::sync::PoisonError<T>) -> Self { Self::Lock(e.to_string()) }
}
