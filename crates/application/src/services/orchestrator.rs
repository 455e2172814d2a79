use std::sync::Arc;
use std::time::Instant;

use analyzer_domain::{Job, JobId, RecordSource, ReviewAnalyzer};
use analyzer_errors::{AnalyzerError, AnalyzerResult};
use metrics::{counter, histogram};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::services::job_registry::JobRegistry;

/// 分析编排器
///
/// 每次提交启动一个后台任务：Pending -> Running -> Complete | Failed，
/// 每次状态迁移对应一次注册表 `update`。
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    registry: Arc<JobRegistry>,
    source: Arc<dyn RecordSource>,
    analyzer: Arc<dyn ReviewAnalyzer>,
    shutdown: CancellationToken,
}

impl AnalysisOrchestrator {
    pub fn new(
        registry: Arc<JobRegistry>,
        source: Arc<dyn RecordSource>,
        analyzer: Arc<dyn ReviewAnalyzer>,
    ) -> Self {
        Self {
            registry,
            source,
            analyzer,
            shutdown: CancellationToken::new(),
        }
    }

    /// 使用外部取消令牌，进程关闭时让仍在等待限流的分块尽快返回
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// 创建作业并启动后台分析任务
    ///
    /// 返回的句柄可以被丢弃，任务照常运行到终态。
    pub async fn submit(&self, subject_key: &str) -> (Job, JoinHandle<()>) {
        let job = self.registry.create(subject_key).await;
        counter!("analysis_jobs_submitted_total").increment(1);
        info!(job_id = %job.job_id, subject_key, "分析作业已提交");

        let this = self.clone();
        let job_id = job.job_id.clone();
        let subject_key = subject_key.to_string();
        let handle = tokio::spawn(async move { this.run(job_id, subject_key).await });

        (job, handle)
    }

    async fn run(&self, job_id: JobId, subject_key: String) {
        let started = Instant::now();
        self.transition(&job_id, |job| job.start()).await;

        match self.execute(&job_id, &subject_key).await {
            Ok(result) => {
                self.transition(&job_id, |job| job.complete(result)).await;
                counter!("analysis_jobs_completed_total").increment(1);
                info!(job_id = %job_id, "分析作业完成");
            }
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "分析作业失败");
                let message = e.to_string();
                self.transition(&job_id, |job| job.fail(message)).await;
                counter!("analysis_jobs_failed_total").increment(1);
            }
        }

        histogram!("analysis_job_duration_seconds").record(started.elapsed().as_secs_f64());
    }

    async fn execute(&self, job_id: &JobId, subject_key: &str) -> AnalyzerResult<String> {
        let reviews = self.source.fetch_records(subject_key).await?;
        if reviews.is_empty() {
            return Err(AnalyzerError::no_matching_records(subject_key));
        }

        info!(job_id = %job_id, review_count = reviews.len(), "开始分析评论");
        self.analyzer.analyze(&reviews, &self.shutdown).await
    }

    async fn transition<F>(&self, job_id: &JobId, apply: F)
    where
        F: FnOnce(&mut Job) -> AnalyzerResult<()>,
    {
        match self.registry.update(job_id, apply).await {
            Some(Ok(())) => {}
            Some(Err(e)) => warn!(job_id = %job_id, "状态迁移被拒绝: {}", e),
            None => warn!(job_id = %job_id, "作业不存在，忽略状态迁移"),
        }
    }
}
