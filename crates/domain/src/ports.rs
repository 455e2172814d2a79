//! 流水线的外部协作者接口
//!
//! 核心逻辑只依赖这些抽象，具体的数据源与生成服务实现位于基础设施层。

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::review::Review;
use analyzer_errors::AnalyzerResult;

/// 记录源：按业务键返回有序的评论序列
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_records(&self, subject_key: &str) -> AnalyzerResult<Vec<Review>>;
}

/// 外部文本生成服务，每个分块调用一次
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AnalyzerResult<String>;
}

/// 把一组评论分析成一段结果文本
#[async_trait]
pub trait ReviewAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        reviews: &[Review],
        cancel: &CancellationToken,
    ) -> AnalyzerResult<String>;
}
