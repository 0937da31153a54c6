use thiserror::Error;

use crate::providers::ProviderError;

/// The unified error type for the `market_data_fetcher` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from a data provider (e.g., API error, validation).
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// An error related to configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Some fetches in a batch failed; the successful ones were still
    /// delivered.
    #[error("{failed} of {total} fetches failed")]
    PartialFailure { failed: usize, total: usize },

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// A config file could not be parsed.
    #[error("Config parse error")]
    ConfigParse(#[from] toml::de::Error),

    /// Serialization of a result table failed.
    #[error("Serialization error")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_reports_counts() {
        let error = Error::PartialFailure {
            failed: 2,
            total: 5,
        };
        assert_eq!(error.to_string(), "2 of 5 fetches failed");
    }
}
