use std::fmt::Write;
use std::path::Path;

use analyzer_domain::Review;
use analyzer_errors::{AnalyzerError, AnalyzerResult};
use tracing::{info, warn};

/// 模板中被评论文本替换的占位符
pub const TEXT_PLACEHOLDER: &str = "{{text}}";

/// 分析提示词模板
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// 从文件加载模板，文件不可读属于配置错误
    pub async fn load(path: impl AsRef<Path>) -> AnalyzerResult<Self> {
        let path = path.as_ref();
        let template = tokio::fs::read_to_string(path).await.map_err(|e| {
            AnalyzerError::config_error(format!("无法读取提示词模板 {}: {}", path.display(), e))
        })?;

        if !template.contains(TEXT_PLACEHOLDER) {
            warn!(
                "提示词模板 {} 不包含占位符 {}，评论文本不会被插入",
                path.display(),
                TEXT_PLACEHOLDER
            );
        }
        info!("已加载提示词模板: {}", path.display());
        Ok(Self::new(template))
    }

    /// 把一个分块的评论渲染进模板
    pub fn render(&self, reviews: &[Review]) -> String {
        self.template
            .replace(TEXT_PLACEHOLDER, &format_reviews(reviews))
    }
}

/// 每条评论渲染为带编号和星级的文本块，编号在分块内从 1 开始
pub fn format_reviews(reviews: &[Review]) -> String {
    let mut text = String::new();
    for (i, review) in reviews.iter().enumerate() {
        let _ = write!(
            text,
            "--- Review {} (stars: {:.1}) ---\n{}\n\n",
            i + 1,
            review.stars,
            review.text
        );
    }
    text
}
