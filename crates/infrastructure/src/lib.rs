//! 外部协作者的具体实现
//!
//! - `JsonlRecordSource`: 从 JSON Lines 文件读取评论
//! - `GeminiGenerator`: 通过 REST 调用 Gemini 文本生成接口

pub mod gemini_client;
pub mod record_source;

pub use gemini_client::GeminiGenerator;
pub use record_source::JsonlRecordSource;
