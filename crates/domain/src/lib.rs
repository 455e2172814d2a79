//! 评论分析领域模型
//!
//! 作业记录及其状态机、评论记录，以及流水线依赖的外部协作者接口。

pub mod entities;
pub mod ports;
pub mod review;

pub use analyzer_errors::{AnalyzerError, AnalyzerResult};
pub use entities::*;
pub use ports::*;
pub use review::*;
