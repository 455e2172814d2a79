//! # Analyzer API
//!
//! 评论分析服务的HTTP接口，基于Axum构建。
//!
//! ## API 端点
//!
//! - `POST /api/analyze?business_id=...` - 提交分析作业，立即返回 202 和作业ID
//! - `GET /api/results/{job_id}` - 查询作业状态与结果
//! - `GET /api/reviews?business_id=...` - 列出某个商家的评论
//! - `GET /health` - 健康检查
//!
//! ## 响应格式
//!
//! 成功响应统一包装为 `{"success": true, "data": ..., "timestamp": ...}`，
//! 错误响应为 `{"success": false, "error": {"code", "type", "message"}, "timestamp": ...}`。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use std::time::Duration;

use analyzer_config::ApiConfig;
use axum::Router;
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, request_timeout, trace_layer};
pub use routes::{create_routes, AppState};

/// 创建带中间件的完整API应用
pub fn create_app(state: AppState, api_config: &ApiConfig) -> Router {
    let timeout = Duration::from_secs(api_config.request_timeout_seconds);
    let router = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging))
            .layer(axum::middleware::from_fn_with_state(timeout, request_timeout)),
    );

    if api_config.cors_enabled {
        router.layer(cors_layer())
    } else {
        router
    }
}
