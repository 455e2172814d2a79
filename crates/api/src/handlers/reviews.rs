use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    handlers::BusinessQuery,
    response::success,
    routes::AppState,
};

/// 列出某个商家的全部评论
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<BusinessQuery>,
) -> ApiResult<impl IntoResponse> {
    let business_id = query
        .business_id()
        .ok_or_else(|| ApiError::missing_param("business_id"))?;

    let reviews = state.record_source.fetch_records(business_id).await?;
    debug!(business_id, review_count = reviews.len(), "评论列表查询完成");
    Ok(success(reviews))
}
