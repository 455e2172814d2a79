use analyzer_errors::AnalyzerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("分析错误: {0}")]
    Analyzer(#[from] AnalyzerError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("作业 {job_id} 不存在")]
    JobNotFound { job_id: String },

    #[error("请求处理超时")]
    Timeout,
}

impl ApiError {
    pub fn missing_param(name: &str) -> Self {
        Self::BadRequest(format!("缺少查询参数 {name}"))
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::JobNotFound { .. } => {
                (StatusCode::NOT_FOUND, "JOB_NOT_FOUND", self.to_string())
            }
            ApiError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                "REQUEST_TIMEOUT",
                self.to_string(),
            ),
            ApiError::Analyzer(AnalyzerError::RecordSource(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "RECORD_SOURCE_ERROR",
                "读取评论数据失败".to_string(),
            ),
            ApiError::Analyzer(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "系统内部错误".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.parts();
        if status.is_server_error() {
            error!("请求处理失败: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "error": {
                "code": status.as_u16(),
                "type": error_type,
                "message": message,
            },
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
