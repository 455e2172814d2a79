use std::sync::Arc;

use analyzer_application::{AnalysisOrchestrator, JobRegistry};
use analyzer_domain::RecordSource;
use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{
    analysis::{get_result, submit_analysis},
    health::health_check,
    reviews::list_reviews,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub registry: Arc<JobRegistry>,
    pub record_source: Arc<dyn RecordSource>,
}

impl AppState {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>, record_source: Arc<dyn RecordSource>) -> Self {
        let registry = Arc::clone(orchestrator.registry());
        Self {
            orchestrator,
            registry,
            record_source,
        }
    }
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/analyze", post(submit_analysis))
        .route("/api/results/{job_id}", get(get_result))
        .route("/api/reviews", get(list_reviews))
        .with_state(state)
}
