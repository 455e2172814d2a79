use std::sync::Arc;

use analyzer_config::AnalysisConfig;
use analyzer_domain::{Review, ReviewAnalyzer, TextGenerator};
use analyzer_errors::AnalyzerResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::dispatcher::{join_outputs, ChunkDispatcher};
use crate::prompt::PromptTemplate;
use crate::rate_limiter::RateLimiter;

/// 基于文本生成服务的评论分析器
///
/// 持有唯一的限流器实例，由它发起的所有作业共同受同一个速率上限约束。
pub struct LlmAnalyzer {
    generator: Arc<dyn TextGenerator>,
    template: Arc<PromptTemplate>,
    dispatcher: ChunkDispatcher,
}

impl LlmAnalyzer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        template: PromptTemplate,
        dispatcher: ChunkDispatcher,
    ) -> Self {
        Self {
            generator,
            template: Arc::new(template),
            dispatcher,
        }
    }

    pub fn from_config(
        generator: Arc<dyn TextGenerator>,
        template: PromptTemplate,
        config: &AnalysisConfig,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(
            config.requests_per_period,
            config.rate_period(),
        ));
        let dispatcher = ChunkDispatcher::new(config.chunk_size, config.worker_count, limiter);
        Self::new(generator, template, dispatcher)
    }
}

#[async_trait]
impl ReviewAnalyzer for LlmAnalyzer {
    async fn analyze(
        &self,
        reviews: &[Review],
        cancel: &CancellationToken,
    ) -> AnalyzerResult<String> {
        let generator = Arc::clone(&self.generator);
        let template = Arc::clone(&self.template);

        let outputs = self
            .dispatcher
            .dispatch(reviews, cancel, move |chunk: Vec<Review>| {
                let generator = Arc::clone(&generator);
                let prompt = template.render(&chunk);
                async move { generator.generate(&prompt).await }
            })
            .await?;

        info!(
            review_count = reviews.len(),
            chunk_count = outputs.len(),
            "评论分析完成"
        );
        Ok(join_outputs(&outputs))
    }
}
