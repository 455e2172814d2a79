use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};

/// 分块分析流水线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 每次生成调用包含的记录数
    pub chunk_size: usize,
    /// 每个作业的并发worker数量
    pub worker_count: usize,
    /// 每个周期允许的生成调用次数，同时也是突发容量
    pub requests_per_period: u32,
    pub rate_period_seconds: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            worker_count: 5,
            requests_per_period: 15,
            rate_period_seconds: 60,
        }
    }
}

impl AnalysisConfig {
    pub fn rate_period(&self) -> Duration {
        Duration::from_secs(self.rate_period_seconds)
    }
}

impl ConfigValidator for AnalysisConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_count(self.chunk_size, "analysis.chunk_size", 1000)?;
        ValidationUtils::validate_count(self.worker_count, "analysis.worker_count", 256)?;
        ValidationUtils::validate_count(
            self.requests_per_period as usize,
            "analysis.requests_per_period",
            100_000,
        )?;
        ValidationUtils::validate_timeout_seconds(
            self.rate_period_seconds,
            "analysis.rate_period_seconds",
        )?;
        Ok(())
    }
}

/// 记录源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// JSON Lines 格式的评论文件
    pub path: String,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            path: "./data/reviews.jsonl".to_string(),
        }
    }
}

impl ConfigValidator for RecordsConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.path, "records.path")
    }
}
