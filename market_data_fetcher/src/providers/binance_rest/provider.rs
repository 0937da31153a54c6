use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use secrecy::SecretString;
use snafu::{ResultExt, ensure};
use tracing::{debug, warn};

use crate::models::{bar::Bar, request_params::BarsRequest, series::Series};
use crate::providers::binance_rest::params::{page_query, validate_request};
use crate::providers::binance_rest::response::{self, KlinesPayload, RawBar};
use crate::providers::{
    ApiSnafu, BarProvider, CancelledSnafu, MalformedResponseSnafu, ProviderError,
    ProviderInitError, SourceExhaustedSnafu,
};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::transport::{PageResponse, PageTransport, ReqwestTransport};
use shared_utils::env::secret_from_env;

const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Maximum klines per page the endpoint will serve.
pub const PAGE_LIMIT: u32 = 1000;

/// Configuration for a [`BinanceProvider`].
///
/// Credentials are passed in explicitly at construction; there is no
/// process-wide credential state. The kline endpoint works unauthenticated,
/// so `api_key` is optional and only raises the request-weight allowance.
#[derive(Debug)]
pub struct BinanceConfig {
    /// Endpoint root, overridable for mirrors and tests.
    pub base_url: String,
    /// Optional API key, sent as `X-MBX-APIKEY`.
    pub api_key: Option<SecretString>,
    /// Bars requested per page, clamped to `1..=PAGE_LIMIT`.
    pub page_limit: u32,
    /// Retry budget and backoff schedule for each page.
    pub retry: RetryPolicy,
    /// Client-side pacing; `None` disables the limiter.
    pub requests_per_second: Option<NonZeroU32>,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            page_limit: PAGE_LIMIT,
            retry: RetryPolicy::default(),
            // klines carry weight 2 against a 1200/min budget; 10 req/s
            // keeps a single fetcher comfortably inside it
            requests_per_second: Some(nonzero!(10u32)),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl BinanceConfig {
    /// Builds a config with the API key taken from `BINANCE_API_KEY`.
    pub fn from_env() -> Result<Self, ProviderInitError> {
        let api_key =
            secret_from_env("BINANCE_API_KEY").context(crate::providers::MissingEnvVarSnafu)?;
        Ok(Self {
            api_key: Some(api_key),
            ..Self::default()
        })
    }
}

/// Kline REST provider.
///
/// One `fetch_bars` call pages sequentially through the requested window
/// (each page's cursor depends on the previous page's last bar), while
/// independent calls on the same provider run concurrently over the shared
/// connection pool.
pub struct BinanceProvider {
    transport: Arc<dyn PageTransport>,
    sleeper: Arc<dyn Sleeper>,
    limiter: Option<DefaultDirectRateLimiter>,
    base_url: String,
    page_limit: u32,
    retry: RetryPolicy,
}

impl BinanceProvider {
    pub fn new(config: BinanceConfig) -> Result<Self, ProviderInitError> {
        let transport = ReqwestTransport::new(config.api_key.as_ref(), config.request_timeout)?;
        let limiter = config
            .requests_per_second
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Ok(Self {
            transport: Arc::new(transport),
            sleeper: Arc::new(TokioSleeper),
            limiter,
            base_url: config.base_url,
            page_limit: config.page_limit.clamp(1, PAGE_LIMIT),
            retry: config.retry,
        })
    }

    /// Creates a provider with the API key taken from `BINANCE_API_KEY`.
    pub fn from_env() -> Result<Self, ProviderInitError> {
        Self::new(BinanceConfig::from_env()?)
    }

    /// Replaces the HTTP transport, e.g. with a scripted test double.
    pub fn with_transport(mut self, transport: Arc<dyn PageTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replaces the sleeper so tests can observe backoff without waiting.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    fn klines_url(&self) -> String {
        format!("{}/api/v3/klines", self.base_url.trim_end_matches('/'))
    }

    /// Requests one page, retrying retryable failures within the budget.
    async fn request_page(
        &self,
        request: &BarsRequest,
        cursor_ms: i64,
        end_ms: i64,
        limit: u32,
        deadline: Option<Instant>,
    ) -> Result<Vec<RawBar>, ProviderError> {
        let url = self.klines_url();
        let query = page_query(request, cursor_ms, end_ms, limit);
        let mut attempt: u32 = 0;

        loop {
            check_deadline(deadline, &request.symbol)?;
            if let Some(limiter) = &self.limiter {
                limiter.until_ready().await;
            }

            let outcome = match self.transport.get(&url, &query).await {
                Ok(response) => classify_response(response)?,
                Err(err) => PageOutcome::Retry {
                    reason: err.to_string(),
                },
            };

            match outcome {
                PageOutcome::Bars(bars) => return Ok(bars),
                PageOutcome::Retry { reason } => {
                    attempt += 1;
                    if attempt > self.retry.max_retries {
                        return SourceExhaustedSnafu {
                            symbol: request.symbol.clone(),
                            attempts: attempt,
                            last_error: reason,
                        }
                        .fail();
                    }
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        symbol = %request.symbol,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        reason = %reason,
                        "retryable failure, backing off"
                    );
                    check_deadline(deadline, &request.symbol)?;
                    self.sleeper.sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl BarProvider for BinanceProvider {
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<Series, ProviderError> {
        validate_request(request)?;

        let end = request.resolved_end();
        let start_ms = request.start.timestamp_millis();
        let end_ms = end.timestamp_millis();
        let step_ms = request.interval.step().num_milliseconds().max(1);
        let deadline = request.timeout.map(|timeout| Instant::now() + timeout);

        debug!(
            symbol = %request.symbol,
            interval = %request.interval,
            start_ms,
            end_ms,
            "starting paginated kline fetch"
        );

        let mut raw: Vec<RawBar> = Vec::new();
        let mut cursor = start_ms;

        while cursor < end_ms {
            let page = self
                .request_page(request, cursor, end_ms, self.page_limit, deadline)
                .await
                .map_err(|error| attach_partial(error, &raw))?;

            let Some(last) = page.last() else {
                // well-formed empty page: no more data at or after cursor
                break;
            };

            // Advance past the close time of the last bar. Advancing by
            // open time would re-request that bar forever.
            let mut next = last.close_time_ms.saturating_add(1);
            if next <= cursor {
                warn!(
                    symbol = %request.symbol,
                    cursor,
                    close_time_ms = last.close_time_ms,
                    "cursor did not advance, forcing one-interval step"
                );
                next = cursor.saturating_add(step_ms);
            }

            raw.extend(page);
            cursor = next;
        }

        // Start-boundary gap fill: when no bar sits exactly at `start`,
        // one single-bar probe anchored there picks up the earliest bar
        // the source has at or after it. Dedup makes this idempotent.
        let has_start_bar = raw
            .iter()
            .any(|r| r.bar.timestamp.timestamp_millis() == start_ms);
        if !has_start_bar && start_ms < end_ms {
            let probe = self
                .request_page(request, start_ms, end_ms, 1, deadline)
                .await
                .map_err(|error| attach_partial(error, &raw))?;
            raw.extend(probe);
        }

        let bars = assemble_bars(raw, start_ms, end_ms);

        debug!(symbol = %request.symbol, bars = bars.len(), "kline fetch complete");

        Ok(Series {
            symbol: request.symbol.clone(),
            interval: request.interval,
            bars,
        })
    }
}

enum PageOutcome {
    Bars(Vec<RawBar>),
    Retry { reason: String },
}

/// Sorts accumulated pages, drops duplicate timestamps keeping the first
/// occurrence, and filters to the requested `[start, end)` window (page
/// boundaries can overshoot it).
pub fn assemble_bars(mut raw: Vec<RawBar>, start_ms: i64, end_ms: i64) -> Vec<Bar> {
    // stable sort keeps the first-fetched row in front among duplicates
    raw.sort_by_key(|r| r.bar.timestamp);

    let mut bars: Vec<Bar> = Vec::with_capacity(raw.len());
    for r in raw {
        let ts = r.bar.timestamp.timestamp_millis();
        if ts < start_ms || ts >= end_ms {
            continue;
        }
        if bars
            .last()
            .is_some_and(|prev| prev.timestamp == r.bar.timestamp)
        {
            continue;
        }
        bars.push(r.bar);
    }
    bars
}

fn classify_response(response: PageResponse) -> Result<PageOutcome, ProviderError> {
    let status = response.status;

    if status == 429 || status == 418 || (500..600).contains(&status) {
        return Ok(PageOutcome::Retry {
            reason: format!("HTTP {status}"),
        });
    }

    if !(200..300).contains(&status) {
        // prefer the structured error body when the source sent one
        return match response::decode_klines(&response.body) {
            Ok(KlinesPayload::RateLimited { code }) => Ok(PageOutcome::Retry {
                reason: format!("API code {code}"),
            }),
            Ok(KlinesPayload::ApiError { code, message }) => ApiSnafu { code, message }.fail(),
            _ => ApiSnafu {
                code: i64::from(status),
                message: format!("HTTP {status}"),
            }
            .fail(),
        };
    }

    match response::decode_klines(&response.body) {
        Ok(KlinesPayload::Bars(bars)) => Ok(PageOutcome::Bars(bars)),
        Ok(KlinesPayload::RateLimited { code }) => Ok(PageOutcome::Retry {
            reason: format!("API code {code}"),
        }),
        Ok(KlinesPayload::ApiError { code, message }) => ApiSnafu { code, message }.fail(),
        Err(decode_error) => MalformedResponseSnafu {
            message: decode_error.to_string(),
            partial: Vec::<Bar>::new(),
        }
        .fail(),
    }
}

/// Re-attaches the bars accumulated so far to a malformed-response error so
/// callers can inspect how far pagination got before the payload broke.
fn attach_partial(error: ProviderError, raw: &[RawBar]) -> ProviderError {
    match error {
        ProviderError::MalformedResponse { message, .. } => MalformedResponseSnafu {
            message,
            partial: raw.iter().map(|r| r.bar.clone()).collect::<Vec<_>>(),
        }
        .build(),
        other => other,
    }
}

fn check_deadline(deadline: Option<Instant>, symbol: &str) -> Result<(), ProviderError> {
    if let Some(deadline) = deadline {
        ensure!(Instant::now() < deadline, CancelledSnafu { symbol });
    }
    Ok(())
}
