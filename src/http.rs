//! HTTP server for Prometheus metrics endpoint.
//!
//! Serves `/metrics` for Prometheus scraping. Every request runs a full
//! collection; a failed collection answers 500 and emits no relay metrics.

use crate::collector::RelayCollector;
use crate::metrics::{ExporterMetrics, TEXT_CONTENT_TYPE, encode_text};
use crate::telemetry::{ScrapeTimer, spans};
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::Instrument;

/// Shared state for the metrics endpoint.
#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<RelayCollector>,
    pub metrics: ExporterMetrics,
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    async move {
        let result = {
            let _timer = ScrapeTimer::new(&state.metrics);
            state.collector.collect().await
        };

        let mut families = match result {
            Ok(families) => families,
            Err(e) => {
                tracing::error!(error = %e, code = e.error_code(), "Scrape failed");
                state.metrics.record_scrape_error(e.error_code());
                return scrape_failed(e.error_code());
            }
        };

        families.extend(state.metrics.gather());
        match encode_text(&families) {
            Ok(body) => {
                tracing::debug!(families = families.len(), "Scrape served");
                ([(CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode Prometheus metrics");
                state.metrics.record_scrape_error("encode");
                scrape_failed("encode")
            }
        }
    }
    .instrument(spans::request("/metrics"))
    .await
}

/// 500 response naming only the error code; details go to the log.
fn scrape_failed(code: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("scrape failed: {code}\n"),
    )
        .into_response()
}

/// Build the router serving `/metrics`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Run the HTTP server for Prometheus metrics until `shutdown` resolves.
///
/// The listener is bound by the caller so bind failures surface at startup.
pub async fn run_http_server<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Prometheus HTTP server listening on {}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::testing::MemoryStats;
    use crate::config::CollectorConfig;
    use std::net::SocketAddr;
    use tokio::sync::oneshot;

    struct TestEndpoint {
        addr: SocketAddr,
        metrics: ExporterMetrics,
        stop: Option<oneshot::Sender<()>>,
        task: tokio::task::JoinHandle<std::io::Result<()>>,
    }

    impl TestEndpoint {
        async fn spawn(stats: MemoryStats) -> Self {
            let config = CollectorConfig {
                tracked_kinds: vec![1, 3, 6, 7, 4, 9735, 1984],
                ..CollectorConfig::default()
            };
            let metrics = ExporterMetrics::new().unwrap();
            let state = AppState {
                collector: Arc::new(RelayCollector::new(Arc::new(stats), config)),
                metrics: metrics.clone(),
            };

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (stop, stopped) = oneshot::channel::<()>();
            let task = tokio::spawn(run_http_server(listener, state, async move {
                let _ = stopped.await;
            }));

            Self {
                addr,
                metrics,
                stop: Some(stop),
                task,
            }
        }

        fn url(&self, path: &str) -> String {
            format!("http://{}{}", self.addr, path)
        }

        async fn shutdown(mut self) {
            if let Some(stop) = self.stop.take() {
                let _ = stop.send(());
            }
            self.task.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn test_metrics_endpoint_serves_relay_stats() {
        let stats = MemoryStats::with_events(&[(1, 10), (3, 5), (7, 20), (50, 2)]);
        *stats.users.lock().unwrap() = vec![(true, 5_000), (false, 1_000)];
        let endpoint = TestEndpoint::spawn(stats).await;

        let response = reqwest::get(endpoint.url("/metrics")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(
            response.headers()[reqwest::header::CONTENT_TYPE],
            TEXT_CONTENT_TYPE
        );

        let body = response.text().await.unwrap();
        assert!(body.contains("# TYPE events gauge"));
        assert!(body.contains("events{kind=\"7\"} 20"));
        assert!(body.contains("events{kind=\"1\"} 10"));
        assert!(body.contains("events{kind=\"3\"} 5"));
        assert!(body.contains("events{kind=\"other\"} 2"));
        assert!(!body.contains("kind=\"50\""));
        assert!(body.contains("admitted_users 1"));
        assert!(body.contains("sats 5"));
        assert!(body.contains("request_processing_seconds_count 1"));

        endpoint.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_scrape_returns_500_without_samples() {
        let stats = MemoryStats {
            fail_after: Some(1),
            ..MemoryStats::with_events(&[(1, 10)])
        };
        let endpoint = TestEndpoint::spawn(stats).await;

        let response = reqwest::get(endpoint.url("/metrics")).await.unwrap();
        assert_eq!(
            response.status(),
            reqwest::StatusCode::INTERNAL_SERVER_ERROR
        );
        let body = response.text().await.unwrap();
        assert_eq!(body, "scrape failed: database\n");

        endpoint.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_scrapes_are_counted() {
        let stats = MemoryStats {
            fail_after: Some(0),
            ..MemoryStats::default()
        };
        let endpoint = TestEndpoint::spawn(stats).await;

        for _ in 0..2 {
            let response = reqwest::get(endpoint.url("/metrics")).await.unwrap();
            assert_eq!(
                response.status(),
                reqwest::StatusCode::INTERNAL_SERVER_ERROR
            );
        }

        let output = encode_text(&endpoint.metrics.gather()).unwrap();
        assert!(output.contains("scrape_errors_total{error=\"database\"} 2"));
        assert!(output.contains("request_processing_seconds_count 2"));

        endpoint.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let endpoint = TestEndpoint::spawn(MemoryStats::default()).await;

        let response = reqwest::get(endpoint.url("/")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        endpoint.shutdown().await;
    }
}
