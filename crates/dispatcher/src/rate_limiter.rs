use std::time::Duration;

use analyzer_errors::{AnalyzerError, AnalyzerResult};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// 令牌桶限流器
///
/// 每个周期补充 `tokens` 个令牌，桶容量同样为 `tokens`，冷启动时允许一次性突发。
/// 同一个实例在所有并发调用者之间共享，约束的是总调用速率而不是单个工作者的速率。
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    refill_per_second: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(tokens: u32, period: Duration) -> Self {
        let capacity = f64::from(tokens.max(1));
        let period_secs = period.as_secs_f64().max(f64::EPSILON);
        Self {
            capacity,
            refill_per_second: capacity / period_secs,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// 等待直到拿到一个令牌
    ///
    /// 取消信号触发时立即返回 `RateLimitCancelled`，不消耗令牌。
    pub async fn acquire(&self, cancel: &CancellationToken) -> AnalyzerResult<()> {
        loop {
            if cancel.is_cancelled() {
                return Err(AnalyzerError::RateLimitCancelled);
            }

            let wait = {
                let mut state = self.state.lock().await;
                self.refill(&mut state);
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return Ok(());
                }
                Duration::from_secs_f64((1.0 - state.tokens) / self.refill_per_second)
            };

            debug!("限流器令牌不足，等待 {:?}", wait);
            tokio::select! {
                _ = cancel.cancelled() => return Err(AnalyzerError::RateLimitCancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_second).min(self.capacity);
        state.last_refill = now;
    }
}
