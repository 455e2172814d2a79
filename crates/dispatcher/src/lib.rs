//! 分块调度
//!
//! 把有序的评论序列切成固定大小的分块，交给固定数量的并发工作者，
//! 所有工作者共享同一个令牌桶限流器，最终按分块序号重新拼装输出。

pub mod analyzer;
pub mod chunking;
pub mod dispatcher;
pub mod prompt;
pub mod rate_limiter;

pub use analyzer::LlmAnalyzer;
pub use chunking::partition;
pub use dispatcher::{join_outputs, ChunkDispatcher, SEPARATOR};
pub use prompt::{PromptTemplate, TEXT_PLACEHOLDER};
pub use rate_limiter::RateLimiter;
