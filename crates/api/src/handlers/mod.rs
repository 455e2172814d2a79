pub mod analysis;
pub mod health;
pub mod reviews;

use serde::Deserialize;

/// `?business_id=` 查询参数
#[derive(Debug, Deserialize)]
pub struct BusinessQuery {
    pub business_id: Option<String>,
}

impl BusinessQuery {
    /// 参数缺失或为空白时返回 `None`
    pub fn business_id(&self) -> Option<&str> {
        self.business_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
