use serde::{Deserialize, Serialize};

/// 一条评论记录，字段与评论数据集保持一致
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub review_id: String,
    #[serde(default)]
    pub user_id: String,
    pub business_id: String,
    #[serde(default)]
    pub stars: f32,
    #[serde(default)]
    pub useful: i32,
    #[serde(default)]
    pub funny: i32,
    #[serde(default)]
    pub cool: i32,
    #[serde(default)]
    pub text: String,
}
