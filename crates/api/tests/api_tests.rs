use std::sync::Arc;
use std::time::Duration;

use analyzer_api::{create_app, create_routes, AppState};
use analyzer_application::{AnalysisOrchestrator, JobRegistry};
use analyzer_config::ApiConfig;
use analyzer_domain::{RecordSource, Review, ReviewAnalyzer};
use analyzer_errors::{AnalyzerError, AnalyzerResult};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

struct StubSource;

#[async_trait]
impl RecordSource for StubSource {
    async fn fetch_records(&self, subject_key: &str) -> AnalyzerResult<Vec<Review>> {
        match subject_key {
            "broken" => Err(AnalyzerError::record_source("archive unreadable")),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
            "biz1" => Ok((0..3)
                .map(|i| Review {
                    review_id: format!("r{i}"),
                    business_id: "biz1".to_string(),
                    stars: 4.0,
                    text: format!("review {i}"),
                    ..Default::default()
                })
                .collect()),
            _ => Ok(Vec::new()),
        }
    }
}

/// 需要许可才会返回的分析器
struct GatedAnalyzer {
    gate: Semaphore,
}

#[async_trait]
impl ReviewAnalyzer for GatedAnalyzer {
    async fn analyze(
        &self,
        reviews: &[Review],
        _cancel: &CancellationToken,
    ) -> AnalyzerResult<String> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| AnalyzerError::Internal(e.to_string()))?;
        Ok(format!("analysis of {} reviews", reviews.len()))
    }
}

fn test_app(permits: usize) -> (Router, Arc<GatedAnalyzer>) {
    let analyzer = Arc::new(GatedAnalyzer {
        gate: Semaphore::new(permits),
    });
    let orchestrator = Arc::new(AnalysisOrchestrator::new(
        Arc::new(JobRegistry::new()),
        Arc::new(StubSource),
        Arc::clone(&analyzer) as Arc<dyn ReviewAnalyzer>,
    ));
    let state = AppState::new(orchestrator, Arc::new(StubSource));
    (create_app(state, &ApiConfig::default()), analyzer)
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn wait_for_terminal(app: &Router, job_id: &str) -> Value {
    for _ in 0..200 {
        let (status, body) = send(app, "GET", &format!("/api/results/{job_id}")).await;
        assert_eq!(status, StatusCode::OK);
        let state = body["data"]["status"].as_str().unwrap().to_string();
        if state == "complete" || state == "failed" {
            return body["data"].clone();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {job_id} did not finish");
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = test_app(1);
    let (status, body) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_submit_requires_business_id() {
    let (app, _) = test_app(1);

    let (status, body) = send(&app, "POST", "/api/analyze").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "BAD_REQUEST");

    let (status, _) = send(&app, "POST", "/api/analyze?business_id=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_returns_accepted_and_job_completes() {
    let (app, _) = test_app(1);

    let (status, body) = send(&app, "POST", "/api/analyze?business_id=biz1").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = body["data"]["job_id"].as_str().unwrap().to_string();
    assert_eq!(job_id.len(), 32);

    let job = wait_for_terminal(&app, &job_id).await;
    assert_eq!(job["status"], "complete");
    assert_eq!(job["business_id"], "biz1");
    assert_eq!(job["result"], "analysis of 3 reviews");
    assert!(job.get("error").is_none());
}

#[tokio::test]
async fn test_poll_before_completion_is_not_terminal() {
    let (app, analyzer) = test_app(0);

    let (_, body) = send(&app, "POST", "/api/analyze?business_id=biz1").await;
    let job_id = body["data"]["job_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", &format!("/api/results/{job_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let state = body["data"]["status"].as_str().unwrap();
    assert!(state == "pending" || state == "running", "state {state}");

    analyzer.gate.add_permits(1);
    let job = wait_for_terminal(&app, &job_id).await;
    assert_eq!(job["status"], "complete");
}

#[tokio::test]
async fn test_unknown_business_fails_job() {
    let (app, _) = test_app(1);

    let (_, body) = send(&app, "POST", "/api/analyze?business_id=nobody").await;
    let job_id = body["data"]["job_id"].as_str().unwrap().to_string();

    let job = wait_for_terminal(&app, &job_id).await;
    assert_eq!(job["status"], "failed");
    assert!(job["error"].as_str().unwrap().contains("nobody"));
    assert!(job.get("result").is_none());
}

#[tokio::test]
async fn test_unknown_job_returns_404() {
    let (app, _) = test_app(1);
    let (status, body) = send(&app, "GET", "/api/results/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "JOB_NOT_FOUND");
}

#[tokio::test]
async fn test_list_reviews() {
    let (app, _) = test_app(1);

    let (status, body) = send(&app, "GET", "/api/reviews?business_id=biz1").await;
    assert_eq!(status, StatusCode::OK);
    let reviews = body["data"].as_array().unwrap();
    assert_eq!(reviews.len(), 3);
    assert_eq!(reviews[0]["review_id"], "r0");

    let (status, body) = send(&app, "GET", "/api/reviews?business_id=empty").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_reviews_errors() {
    let (app, _) = test_app(1);

    let (status, _) = send(&app, "GET", "/api/reviews").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/reviews?business_id=broken").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "RECORD_SOURCE_ERROR");
}

#[tokio::test]
async fn test_routes_without_middleware() {
    let orchestrator = Arc::new(AnalysisOrchestrator::new(
        Arc::new(JobRegistry::new()),
        Arc::new(StubSource),
        Arc::new(GatedAnalyzer {
            gate: Semaphore::new(1),
        }),
    ));
    let app = create_routes(AppState::new(orchestrator, Arc::new(StubSource)));
    let (status, _) = send(&app, "GET", "/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_slow_request_times_out_with_408() {
    let orchestrator = Arc::new(AnalysisOrchestrator::new(
        Arc::new(JobRegistry::new()),
        Arc::new(StubSource),
        Arc::new(GatedAnalyzer {
            gate: Semaphore::new(1),
        }),
    ));
    let config = ApiConfig {
        request_timeout_seconds: 1,
        ..ApiConfig::default()
    };
    let app = create_app(AppState::new(orchestrator, Arc::new(StubSource)), &config);

    let started = std::time::Instant::now();
    let (status, body) = send(&app, "GET", "/api/reviews?business_id=slow").await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "REQUEST_TIMEOUT");
    assert!(started.elapsed() < Duration::from_secs(10));

    // 未超时的请求不受影响
    let (status, _) = send(&app, "GET", "/api/reviews?business_id=biz1").await;
    assert_eq!(status, StatusCode::OK);
}
