use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/feeds", get(handlers::list_feeds))
        .route("/feeds/:key", get(handlers::get_feed))
        .route("/status", get(handlers::job_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use rg_core::{Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use rg_core::{FeedCache, RawRecord, Result, RSS_CONTENT_TYPE};
    use rg_scrapers::scrapers::sources;
    use rg_scrapers::{ExtractionScript, Extractor, ScraperManager, StatusBoard};
    use rg_storage::MemoryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    struct MockExtractor {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Extractor for MockExtractor {
        async fn extract(&self, _target: &str, _script: &ExtractionScript) -> Result<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(rg_core::Error::Extraction("navigation failed".to_string()));
            }
            Ok(vec![RawRecord::new()
                .with("title", "Issue #500")
                .with("link", "https://nodeweekly.com/issues/500")
                .with("date", "October 24, 2023")])
        }
    }

    fn app(fail: bool) -> (Router, Arc<MockExtractor>, Arc<dyn FeedCache>) {
        let extractor = Arc::new(MockExtractor {
            calls: AtomicUsize::new(0),
            fail,
        });
        let cache: Arc<dyn FeedCache> = Arc::new(MemoryCache::new());
        let manager = ScraperManager::new(
            vec![sources::nodeweekly::descriptor(), sources::aws::descriptor()],
            cache.clone(),
            extractor.clone(),
        );
        let state = AppState::new(Arc::new(manager)).with_request_timeout(Duration::from_secs(5));
        (create_app(state), extractor, cache)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_feed_served_as_rss_and_cached() {
        let (app, extractor, cache) = app(false);

        let (status, content_type, body) = get(app.clone(), "/feeds/nodeweekly").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(RSS_CONTENT_TYPE));
        assert!(body.contains("<title>Issue #500</title>"));
        assert!(body.contains("<pubDate>Tue, 24 Oct 2023 00:00:00 +0000</pubDate>"));
        assert_eq!(cache.get("nodeweekly").await.as_deref(), Some(body.as_str()));

        let (status, _, again) = get(app, "/feeds/nodeweekly").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again, body);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_source_is_404() {
        let (app, extractor, _) = app(false);
        let (status, _, _) = get(app, "/feeds/slashdot").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_is_500() {
        let (app, _, cache) = app(true);
        let (status, _, body) = get(app, "/feeds/aws").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("navigation failed"));
        assert!(cache.get("aws").await.is_none());
    }

    #[tokio::test]
    async fn test_cached_feed_survives_failing_source() {
        let (app, _, cache) = app(true);
        cache.set("aws", "<rss/>".to_string()).await;
        let (status, _, body) = get(app, "/feeds/aws").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<rss/>");
    }

    #[tokio::test]
    async fn test_list_feeds() {
        let (app, _, _) = app(false);
        let (status, _, body) = get(app, "/feeds").await;
        assert_eq!(status, StatusCode::OK);
        let sources: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(sources.as_array().unwrap().len(), 2);
        assert_eq!(sources[0]["key"], "nodeweekly");
        assert_eq!(sources[0]["path"], "/feeds/nodeweekly");
    }

    #[tokio::test]
    async fn test_status_without_scheduler_is_empty() {
        let (app, _, _) = app(false);
        let (status, _, body) = get(app, "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn test_status_and_health() {
        let cache: Arc<dyn FeedCache> = Arc::new(MemoryCache::new());
        let extractor = Arc::new(MockExtractor {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let manager = Arc::new(ScraperManager::new(vec![sources::aws::descriptor()], cache, extractor));
        let board = StatusBoard::default();
        board
            .record(rg_scrapers::JobOutcome {
                source: "aws".to_string(),
                started_at: chrono::Utc::now(),
                elapsed_ms: 5,
                status: rg_scrapers::JobStatus::Succeeded { bytes: 42 },
            })
            .await;
        let app = create_app(AppState::new(manager).with_status(board));

        let (_, _, body) = get(app.clone(), "/status").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["aws"]["status"], "succeeded");
        assert_eq!(json["aws"]["bytes"], 42);

        let (status, _, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
