use thiserror::Error;


#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("记录源错误: {0}")]
    RecordSource(String),
    #[error("未找到匹配的记录: business_id={subject_key}")]
    NoMatchingRecords { subject_key: String },
    #[error("分块 {index}: {source}")]
    Chunk {
        index: usize,
        #[source]
        source: Box<AnalyzerError>,
    },
    #[error("生成服务错误: {0}")]
    Generation(String),
    #[error("限流等待已取消")]
    RateLimitCancelled,
    #[error("无效的状态转换: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("网络错误: {0}")]
    Network(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

impl AnalyzerError {
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn record_source<S: Into<String>>(msg: S) -> Self {
        Self::RecordSource(msg.into())
    }
    pub fn no_matching_records<S: Into<String>>(subject_key: S) -> Self {
        Self::NoMatchingRecords {
            subject_key: subject_key.into(),
        }
    }
    pub fn generation<S: Into<String>>(msg: S) -> Self {
        Self::Generation(msg.into())
    }
    pub fn chunk(index: usize, source: AnalyzerError) -> Self {
        Self::Chunk {
            index,
            source: Box::new(source),
        }
    }
    /// 仅用于日志分类，流水线本身不做任何重试
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalyzerError::Network(_) | AnalyzerError::Generation(_) => true,
            AnalyzerError::Chunk { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalyzerError::Configuration(_))
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        AnalyzerError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(err: std::io::Error) -> Self {
        AnalyzerError::RecordSource(err.to_string())
    }
}
