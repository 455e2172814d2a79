use std::collections::HashMap;

use analyzer_domain::{Job, JobId};
use tokio::sync::RwLock;
use tracing::debug;

/// 并发安全的作业注册表
///
/// 所有记录由注册表独占，调用者只会拿到副本。写操作由同一把锁串行化。
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建一个处于 Pending 状态的新作业
    pub async fn create(&self, subject_key: &str) -> Job {
        let job = Job::new(subject_key);
        self.jobs
            .write()
            .await
            .insert(job.job_id.clone(), job.clone());
        debug!(job_id = %job.job_id, subject_key, "作业已创建");
        job
    }

    /// 返回作业记录的独立副本，未知 id 返回 `None`
    pub async fn get(&self, job_id: &JobId) -> Option<Job> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// 在独占锁内修改作业记录并推进更新时间
    ///
    /// 未知 id 不做任何事并返回 `None`。`mutate` 持锁执行，只应修改传入的记录。
    pub async fn update<F, R>(&self, job_id: &JobId, mutate: F) -> Option<R>
    where
        F: FnOnce(&mut Job) -> R,
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(job_id)?;
        let outcome = mutate(&mut *job);
        job.touch();
        Some(outcome)
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
