//! Fallback chain ordering (exhausted and hard-API failures fall through,
//! everything else short-circuits) and batch fan-out result ordering.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use market_data_fetcher::models::interval::Interval;
use market_data_fetcher::models::request_params::BarsRequest;
use market_data_fetcher::models::series::Series;
use market_data_fetcher::providers::fallback::FallbackChain;
use market_data_fetcher::providers::{
    ApiSnafu, BarProvider, CancelledSnafu, ProviderError, SourceExhaustedSnafu, ValidationSnafu,
    fetch_all,
};

enum Script {
    Succeed,
    Exhausted,
    HardApi,
    Invalid,
    Cancelled,
}

struct StubProvider {
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    fn new(script: Script) -> (Box<dyn BarProvider>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Box::new(Self {
            script,
            calls: calls.clone(),
        });
        (provider, calls)
    }
}

#[async_trait]
impl BarProvider for StubProvider {
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<Series, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Succeed => Ok(Series {
                symbol: request.symbol.clone(),
                interval: request.interval,
                bars: vec![],
            }),
            Script::Exhausted => SourceExhaustedSnafu {
                symbol: request.symbol.clone(),
                attempts: 3u32,
                last_error: "HTTP 429".to_string(),
            }
            .fail(),
            Script::HardApi => ApiSnafu {
                code: -1121i64,
                message: "Invalid symbol.".to_string(),
            }
            .fail(),
            Script::Invalid => ValidationSnafu {
                message: "symbol must be a non-empty identifier".to_string(),
            }
            .fail(),
            Script::Cancelled => CancelledSnafu {
                symbol: request.symbol.clone(),
            }
            .fail(),
        }
    }
}

fn request() -> BarsRequest {
    BarsRequest::new(
        "BTCUSDT",
        Interval::Hour1,
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    )
    .with_end(Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap())
}

#[tokio::test]
async fn falls_through_exhausted_source_to_next() {
    let (first, first_calls) = StubProvider::new(Script::Exhausted);
    let (second, second_calls) = StubProvider::new(Script::Succeed);
    let chain = FallbackChain::new(vec![first, second]);

    let series = chain.fetch_bars(&request()).await.unwrap();

    assert_eq!(series.symbol, "BTCUSDT");
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn falls_through_hard_api_error() {
    let (first, _) = StubProvider::new(Script::HardApi);
    let (second, second_calls) = StubProvider::new(Script::Succeed);
    let chain = FallbackChain::new(vec![first, second]);

    assert!(chain.fetch_bars(&request()).await.is_ok());
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn validation_failure_short_circuits() {
    let (first, _) = StubProvider::new(Script::Invalid);
    let (second, second_calls) = StubProvider::new(Script::Succeed);
    let chain = FallbackChain::new(vec![first, second]);

    let error = chain.fetch_bars(&request()).await.unwrap_err();

    assert!(matches!(error, ProviderError::Validation { .. }));
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancellation_short_circuits() {
    let (first, _) = StubProvider::new(Script::Cancelled);
    let (second, second_calls) = StubProvider::new(Script::Succeed);
    let chain = FallbackChain::new(vec![first, second]);

    let error = chain.fetch_bars(&request()).await.unwrap_err();

    assert!(matches!(error, ProviderError::Cancelled { .. }));
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn all_sources_failing_reports_exhaustion() {
    let (first, _) = StubProvider::new(Script::Exhausted);
    let (second, _) = StubProvider::new(Script::HardApi);
    let chain = FallbackChain::new(vec![first, second]);

    let error = chain.fetch_bars(&request()).await.unwrap_err();

    match error {
        ProviderError::SourceExhausted {
            attempts,
            last_error,
            ..
        } => {
            assert_eq!(attempts, 2);
            assert!(last_error.contains("-1121"));
        }
        other => panic!("expected SourceExhausted, got {other}"),
    }
}

#[tokio::test]
async fn first_success_stops_the_chain() {
    let (first, _) = StubProvider::new(Script::Succeed);
    let (second, second_calls) = StubProvider::new(Script::Exhausted);
    let chain = FallbackChain::new(vec![first, second]);

    assert!(chain.fetch_bars(&request()).await.is_ok());
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_chain_is_a_configuration_error() {
    let chain = FallbackChain::new(vec![]);
    let error = chain.fetch_bars(&request()).await.unwrap_err();
    assert!(matches!(error, ProviderError::Internal { .. }));
}

/// Rejects symbols marked "BAD", echoes everything else back.
struct PickyProvider;

#[async_trait]
impl BarProvider for PickyProvider {
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<Series, ProviderError> {
        if request.symbol.starts_with("BAD") {
            return ApiSnafu {
                code: -1121i64,
                message: "Invalid symbol.".to_string(),
            }
            .fail();
        }
        Ok(Series {
            symbol: request.symbol.clone(),
            interval: request.interval,
            bars: vec![],
        })
    }
}

#[tokio::test]
async fn fetch_all_keeps_input_order_through_partial_failure() {
    let requests: Vec<BarsRequest> = ["BTCUSDT", "BADUSDT", "ETHUSDT", "BADCOIN"]
        .iter()
        .map(|symbol| {
            let mut req = request();
            req.symbol = symbol.to_string();
            req
        })
        .collect();

    let results = fetch_all(&PickyProvider, &requests).await;

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].as_ref().unwrap().symbol, "BTCUSDT");
    assert!(matches!(results[1], Err(ProviderError::Api { .. })));
    assert_eq!(results[2].as_ref().unwrap().symbol, "ETHUSDT");
    assert!(matches!(results[3], Err(ProviderError::Api { .. })));
}
