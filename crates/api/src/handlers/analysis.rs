use analyzer_domain::JobId;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    handlers::BusinessQuery,
    response::{accepted, success},
    routes::AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: JobId,
}

/// 提交分析作业
///
/// 作业在后台运行，这里不等待其完成。
pub async fn submit_analysis(
    State(state): State<AppState>,
    Query(query): Query<BusinessQuery>,
) -> ApiResult<impl IntoResponse> {
    let business_id = query
        .business_id()
        .ok_or_else(|| ApiError::missing_param("business_id"))?;

    let (job, _detached) = state.orchestrator.submit(business_id).await;
    Ok(accepted(
        SubmitResponse { job_id: job.job_id },
        "分析作业已接受".to_string(),
    ))
}

/// 查询作业状态
pub async fn get_result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let job = state
        .registry
        .get(&JobId::from(job_id.as_str()))
        .await
        .ok_or(ApiError::JobNotFound { job_id })?;
    Ok(success(job))
}
