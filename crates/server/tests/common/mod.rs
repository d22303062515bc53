//! Common test utilities for E2E testing with mocks.
//!
//! Builds the full wiring (queues, gate, triggers, resolver, dispatcher)
//! on top of mock host collaborators and exposes the HTTP surface as an
//! in-process `Router`, so the API can be exercised without a real media
//! server.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use libretto_core::testing::{MockChapterAnalysis, MockLibrary, MockSessionMonitor};
use libretto_core::{
    CatchupConfig, CatchupTriggers, ChapterAnalysis, ConcurrencyGate, Config, ExtractConfig,
    ExtractionDispatcher, IntroSkipConfig, MediaLibrary, MediaServerConfig, ModeResolver,
    ModeSnapshot, ServerConfig, SessionMonitor, WorkQueue,
};
use libretto_server::api::create_router;
use libretto_server::state::AppState;

/// Re-export fixtures for test convenience
pub use libretto_core::testing::fixtures;

/// Knobs for fixture construction.
#[derive(Debug, Default)]
pub struct TestConfig {
    pub extract: ExtractConfig,
    pub catchup: CatchupConfig,
    pub intro_skip: IntroSkipConfig,
    /// Start the live drain loop (off by default so queue depths stay
    /// observable in tests).
    pub start_dispatcher: bool,
}

/// Test fixture for E2E testing with mock dependencies.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock media library - configure pending items and failures
    pub library: Arc<MockLibrary>,
    /// Mock chapter analysis - configure the pattern decision
    pub chapters: Arc<MockChapterAnalysis>,
    /// Mock session monitor - lifecycle and scope assertions
    pub monitor: Arc<MockSessionMonitor>,
    /// The underlying state, for direct assertions
    pub state: Arc<AppState>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let library = Arc::new(MockLibrary::new());
        let chapters = Arc::new(MockChapterAnalysis::new());
        let monitor = Arc::new(MockSessionMonitor::new());

        let config = Config {
            media_server: MediaServerConfig {
                url: "http://localhost:8096".to_string(),
                api_key: "test-key".to_string(),
                timeout_secs: 5,
            },
            server: ServerConfig {
                host: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            extract: test_config.extract.clone(),
            catchup: test_config.catchup.clone(),
            intro_skip: test_config.intro_skip.clone(),
        };

        let extract_queue = Arc::new(WorkQueue::new());
        let analysis_queue = Arc::new(WorkQueue::new());
        let gate = ConcurrencyGate::new(config.extract.max_concurrent);

        let triggers = Arc::new(CatchupTriggers::new(
            Arc::clone(&library) as Arc<dyn MediaLibrary>,
            Arc::clone(&monitor) as Arc<dyn SessionMonitor>,
            Arc::clone(&extract_queue),
            Arc::clone(&analysis_queue),
        ));

        let resolver = Arc::new(ModeResolver::new(
            ModeSnapshot::from_config(&config),
            Arc::clone(&gate),
            Arc::clone(&triggers),
            Arc::clone(&monitor) as Arc<dyn SessionMonitor>,
        ));
        resolver.bootstrap();

        let dispatcher = Arc::new(ExtractionDispatcher::new(
            Arc::clone(&library) as Arc<dyn MediaLibrary>,
            Arc::clone(&chapters) as Arc<dyn ChapterAnalysis>,
            Arc::clone(&monitor) as Arc<dyn SessionMonitor>,
            Arc::clone(&resolver),
            gate,
            Arc::clone(&extract_queue),
            Arc::clone(&analysis_queue),
        ));
        if test_config.start_dispatcher {
            dispatcher.start();
        }

        let state = Arc::new(AppState::new(
            config,
            resolver,
            dispatcher,
            triggers,
            extract_queue,
            analysis_queue,
        ));

        let router = create_router(Arc::clone(&state));

        Self {
            router,
            library,
            chapters,
            monitor,
            state,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).expect("Failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).to_string(),
            ))
        };

        TestResponse { status, body }
    }
}
