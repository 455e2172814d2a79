use std::future::Future;
use std::sync::Arc;

use analyzer_errors::{AnalyzerError, AnalyzerResult};
use metrics::counter;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::chunking::partition;
use crate::rate_limiter::RateLimiter;

/// 分块输出之间的分隔符
pub const SEPARATOR: &str = "\n\n---\n\n";

type WorkItem<T> = (usize, Vec<T>);
type ChunkOutcome = (usize, AnalyzerResult<String>);

/// 分块调度器
///
/// 工作项在启动工作者之前全部入队并关闭队列，固定数量的工作者竞争消费，
/// 每个分块恰好尝试一次。所有工作者结束后才检查结果。
#[derive(Debug, Clone)]
pub struct ChunkDispatcher {
    chunk_size: usize,
    worker_count: usize,
    limiter: Arc<RateLimiter>,
}

impl ChunkDispatcher {
    pub fn new(chunk_size: usize, worker_count: usize, limiter: Arc<RateLimiter>) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            worker_count: worker_count.max(1),
            limiter,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// 分发所有分块并按序号返回输出
    ///
    /// 任一分块失败时返回序号最小的那个错误，成功分块的输出全部丢弃。
    pub async fn dispatch<T, F, Fut>(
        &self,
        records: &[T],
        cancel: &CancellationToken,
        call: F,
    ) -> AnalyzerResult<Vec<String>>
    where
        T: Clone + Send + 'static,
        F: Fn(Vec<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AnalyzerResult<String>> + Send + 'static,
    {
        let chunks = partition(records, self.chunk_size);
        let chunk_count = chunks.len();
        info!(
            record_count = records.len(),
            chunk_count,
            worker_count = self.worker_count,
            "开始分块调度"
        );

        let (work_tx, work_rx) = mpsc::channel::<WorkItem<T>>(chunk_count);
        for item in chunks.into_iter().enumerate() {
            work_tx
                .send(item)
                .await
                .map_err(|_| AnalyzerError::Internal("工作队列已关闭".to_string()))?;
        }
        drop(work_tx);

        let work_rx = Arc::new(Mutex::new(work_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<ChunkOutcome>(chunk_count);
        let call = Arc::new(call);

        let mut workers = JoinSet::new();
        for worker_id in 0..self.worker_count {
            let work_rx = Arc::clone(&work_rx);
            let result_tx = result_tx.clone();
            let limiter = Arc::clone(&self.limiter);
            let call = Arc::clone(&call);
            let cancel = cancel.clone();

            workers.spawn(async move {
                loop {
                    let next = work_rx.lock().await.recv().await;
                    let Some((chunk_index, chunk)) = next else {
                        break;
                    };

                    let outcome = match limiter.acquire(&cancel).await {
                        Ok(()) => call(chunk).await,
                        Err(e) => Err(e),
                    };

                    match &outcome {
                        Ok(_) => {
                            debug!(worker_id, chunk_index, "分块处理完成");
                            counter!("analysis_chunk_calls_total", "outcome" => "success")
                                .increment(1);
                        }
                        Err(e) => {
                            debug!(worker_id, chunk_index, error = %e, "分块处理失败");
                            counter!("analysis_chunk_calls_total", "outcome" => "failure")
                                .increment(1);
                        }
                    }

                    if result_tx.send((chunk_index, outcome)).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("分块工作者异常退出: {}", e);
            }
        }

        let mut slots: Vec<Option<AnalyzerResult<String>>> =
            (0..chunk_count).map(|_| None).collect();
        while let Some((chunk_index, outcome)) = result_rx.recv().await {
            if let Some(slot) = slots.get_mut(chunk_index) {
                *slot = Some(outcome);
            }
        }

        let mut outputs = Vec::with_capacity(chunk_count);
        for (chunk_index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(output)) => outputs.push(output),
                Some(Err(e)) => return Err(AnalyzerError::chunk(chunk_index, e)),
                None => {
                    return Err(AnalyzerError::Internal(format!(
                        "分块 {chunk_index} 没有产生结果"
                    )))
                }
            }
        }
        Ok(outputs)
    }
}

/// 按序号顺序用分隔符拼接分块输出
pub fn join_outputs(outputs: &[String]) -> String {
    outputs.join(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn unlimited() -> Arc<RateLimiter> {
        Arc::new(RateLimiter::new(10_000, Duration::from_secs(1)))
    }

    fn numbers(len: usize) -> Vec<usize> {
        (0..len).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_order_independent_of_completion_order() {
        let dispatcher = ChunkDispatcher::new(3, 4, unlimited());
        let cancel = CancellationToken::new();

        // 序号越大的分块越早完成
        let outputs = dispatcher
            .dispatch(&numbers(12), &cancel, |chunk: Vec<usize>| async move {
                let first = chunk[0];
                tokio::time::sleep(Duration::from_millis((20 - first) as u64 * 10)).await;
                Ok(format!("chunk-{first}"))
            })
            .await
            .unwrap();

        assert_eq!(outputs, vec!["chunk-0", "chunk-3", "chunk-6", "chunk-9"]);
    }

    #[tokio::test]
    async fn test_join_outputs_with_separator() {
        let dispatcher = ChunkDispatcher::new(2, 2, unlimited());
        let outputs = dispatcher
            .dispatch(&numbers(5), &CancellationToken::new(), |chunk: Vec<usize>| async move {
                Ok(format!("{chunk:?}"))
            })
            .await
            .unwrap();

        assert_eq!(
            join_outputs(&outputs),
            "[0, 1]\n\n---\n\n[2, 3]\n\n---\n\n[4]"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_failure_discards_all_outputs() {
        let dispatcher = ChunkDispatcher::new(5, 3, unlimited());
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let result = dispatcher
            .dispatch(&numbers(20), &CancellationToken::new(), move |chunk: Vec<usize>| {
                let attempts = Arc::clone(&counter);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    if chunk[0] == 5 {
                        return Err(AnalyzerError::generation("quota exceeded"));
                    }
                    Ok(format!("secret-output-{}", chunk[0]))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AnalyzerError::Chunk { index: 1, .. }));
        assert!(err.to_string().contains("quota exceeded"));
        assert!(!err.to_string().contains("secret-output"));
        // 失败不影响其余分块的处理
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_error_in_index_order_wins() {
        let dispatcher = ChunkDispatcher::new(1, 4, unlimited());

        let err = dispatcher
            .dispatch(&numbers(4), &CancellationToken::new(), |chunk: Vec<usize>| async move {
                let index = chunk[0];
                // 序号 3 先于序号 1 失败
                tokio::time::sleep(Duration::from_millis(if index == 3 { 1 } else { 50 })).await;
                match index {
                    1 => Err(AnalyzerError::generation("first")),
                    3 => Err(AnalyzerError::generation("second")),
                    _ => Ok("ok".to_string()),
                }
            })
            .await
            .unwrap_err();

        match err {
            AnalyzerError::Chunk { index, source } => {
                assert_eq!(index, 1);
                assert!(source.to_string().contains("first"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_input_dispatches_one_empty_chunk() {
        let dispatcher = ChunkDispatcher::new(10, 5, unlimited());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let outputs = dispatcher
            .dispatch(&Vec::<usize>::new(), &CancellationToken::new(), move |chunk: Vec<usize>| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(format!("len={}", chunk.len())) }
            })
            .await
            .unwrap();

        assert_eq!(outputs, vec!["len=0"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_bounded_by_worker_count() {
        let dispatcher = ChunkDispatcher::new(1, 2, unlimited());
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (active_ref, peak_ref) = (Arc::clone(&active), Arc::clone(&peak));

        let outputs = dispatcher
            .dispatch(&numbers(6), &CancellationToken::new(), move |chunk: Vec<usize>| {
                let active = Arc::clone(&active_ref);
                let peak = Arc::clone(&peak_ref);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(chunk[0].to_string())
                }
            })
            .await
            .unwrap();

        assert_eq!(outputs.len(), 6);
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_gated_by_shared_limiter() {
        let limiter = Arc::new(RateLimiter::new(2, Duration::from_secs(10)));
        let dispatcher = ChunkDispatcher::new(1, 4, limiter);
        let start = tokio::time::Instant::now();

        let outputs = dispatcher
            .dispatch(&numbers(4), &CancellationToken::new(), |chunk: Vec<usize>| async move {
                Ok(chunk[0].to_string())
            })
            .await
            .unwrap();

        assert_eq!(outputs, vec!["0", "1", "2", "3"]);
        // 突发 2 次，其余两次每次等待 5 秒
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_cancellation_fails_dispatch_without_calls() {
        let dispatcher = ChunkDispatcher::new(2, 2, unlimited());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let err = dispatcher
            .dispatch(&numbers(4), &cancel, move |_chunk: Vec<usize>| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(String::new()) }
            })
            .await
            .unwrap_err();

        match err {
            AnalyzerError::Chunk { index, source } => {
                assert_eq!(index, 0);
                assert!(matches!(*source, AnalyzerError::RateLimitCancelled));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
