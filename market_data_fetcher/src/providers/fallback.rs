//! Prioritized fallback across interchangeable providers.
//!
//! Some deployments keep a secondary market-data source behind the primary
//! exchange API. The chain tries each source in order and only falls
//! through when the current one is exhausted or rejects the request with a
//! hard API error. It never fabricates data: when every real source fails,
//! the caller sees `SourceExhausted`.

use async_trait::async_trait;
use snafu::ensure;
use tracing::warn;

use crate::models::{request_params::BarsRequest, series::Series};
use crate::providers::{
    BarProvider, InternalSnafu, ProviderError, SourceExhaustedSnafu,
};

/// An ordered list of providers tried front to back.
pub struct FallbackChain {
    providers: Vec<Box<dyn BarProvider>>,
}

impl FallbackChain {
    pub fn new(providers: Vec<Box<dyn BarProvider>>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl BarProvider for FallbackChain {
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<Series, ProviderError> {
        ensure!(
            !self.providers.is_empty(),
            InternalSnafu {
                message: "fallback chain has no providers",
            }
        );

        let mut last_error: Option<ProviderError> = None;
        for (index, provider) in self.providers.iter().enumerate() {
            match provider.fetch_bars(request).await {
                Ok(series) => return Ok(series),
                Err(
                    error @ (ProviderError::SourceExhausted { .. } | ProviderError::Api { .. }),
                ) => {
                    warn!(
                        provider = index,
                        symbol = %request.symbol,
                        error = %error,
                        "source failed, trying next provider"
                    );
                    last_error = Some(error);
                }
                // validation, malformed payloads and cancellation are not
                // source-specific; retrying them elsewhere wastes budget
                Err(other) => return Err(other),
            }
        }

        let last_error = last_error
            .map(|error| error.to_string())
            .unwrap_or_default();
        SourceExhaustedSnafu {
            symbol: request.symbol.clone(),
            attempts: self.providers.len() as u32,
            last_error,
        }
        .fail()
    }
}
