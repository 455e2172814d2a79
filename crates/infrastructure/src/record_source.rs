use std::path::{Path, PathBuf};

use analyzer_domain::{RecordSource, Review};
use analyzer_errors::{AnalyzerError, AnalyzerResult};
use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// JSON Lines 评论文件
///
/// 每行一条评论，按 `business_id` 过滤并保持文件中的顺序。
/// 任意一行无法解析时整个查询失败。
#[derive(Debug, Clone)]
pub struct JsonlRecordSource {
    path: PathBuf,
}

impl JsonlRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for JsonlRecordSource {
    async fn fetch_records(&self, subject_key: &str) -> AnalyzerResult<Vec<Review>> {
        let file = File::open(&self.path).await.map_err(|e| {
            AnalyzerError::record_source(format!("无法打开 {}: {}", self.path.display(), e))
        })?;

        let mut lines = BufReader::new(file).lines();
        let mut reviews = Vec::new();
        let mut line_number = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let review: Review = serde_json::from_str(&line).map_err(|e| {
                AnalyzerError::record_source(format!(
                    "{} 第 {} 行解析失败: {}",
                    self.path.display(),
                    line_number,
                    e
                ))
            })?;
            if review.business_id == subject_key {
                reviews.push(review);
            }
        }

        debug!(
            subject_key,
            review_count = reviews.len(),
            scanned_lines = line_number,
            "评论读取完成"
        );
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn review_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[tokio::test]
    async fn test_filters_by_business_and_keeps_order() {
        let file = review_file(&[
            r#"{"review_id":"r1","business_id":"biz1","stars":5.0,"text":"first"}"#,
            r#"{"review_id":"r2","business_id":"biz2","stars":1.0,"text":"other"}"#,
            "",
            r#"{"review_id":"r3","business_id":"biz1","stars":3.0,"text":"second"}"#,
        ]);
        let source = JsonlRecordSource::new(file.path());

        let reviews = source.fetch_records("biz1").await.unwrap();
        let ids: Vec<&str> = reviews.iter().map(|r| r.review_id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r3"]);
        assert_eq!(reviews[1].text, "second");
    }

    #[tokio::test]
    async fn test_unknown_business_returns_empty() {
        let file = review_file(&[r#"{"review_id":"r1","business_id":"biz1"}"#]);
        let reviews = JsonlRecordSource::new(file.path())
            .fetch_records("nope")
            .await
            .unwrap();
        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_record_source_error() {
        let err = JsonlRecordSource::new("/nonexistent/reviews.jsonl")
            .fetch_records("biz1")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::RecordSource(_)));
    }

    #[tokio::test]
    async fn test_malformed_line_reports_line_number() {
        let file = review_file(&[
            r#"{"review_id":"r1","business_id":"biz1"}"#,
            "{not json",
        ]);
        let err = JsonlRecordSource::new(file.path())
            .fetch_records("biz1")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::RecordSource(_)));
        assert!(err.to_string().contains("第 2 行"));
    }
}
