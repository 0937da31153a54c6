//! Injectable HTTP page transport.
//!
//! Providers talk to their source through [`PageTransport`] instead of a
//! concrete client, so tests can script responses (rate limits, malformed
//! bodies, stalled cursors) without a network. [`ReqwestTransport`] is the
//! production implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use thiserror::Error;

use crate::providers::{ClientBuildSnafu, InvalidApiKeySnafu, ProviderInitError};

/// A transport-level failure: timeout, connection error, interrupted body.
///
/// All transport errors are treated as transient by providers and go
/// through the bounded retry loop.
#[derive(Debug, Error)]
#[error("Transport failure: {0}")]
pub struct TransportError(pub String);

/// One raw HTTP response, reduced to what page handling needs.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait PageTransport: Send + Sync {
    /// Issues one GET request and returns status plus full body.
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<PageResponse, TransportError>;
}

/// Production transport backed by a shared reqwest connection pool.
///
/// The pool is safe for concurrent use, so one transport can serve many
/// parallel fetches.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a client with an optional API key header.
    ///
    /// The key is sent as `X-MBX-APIKEY` and marked sensitive so it never
    /// shows up in logs.
    pub fn new(
        api_key: Option<&SecretString>,
        request_timeout: Duration,
    ) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        if let Some(key) = api_key {
            let mut value = header::HeaderValue::from_str(key.expose_secret())
                .context(InvalidApiKeySnafu)?;
            value.set_sensitive(true);
            headers.insert("X-MBX-APIKEY", value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<PageResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(PageResponse {
            status,
            body: body.to_vec(),
        })
    }
}
