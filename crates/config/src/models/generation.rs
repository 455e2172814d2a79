use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};
use crate::{ConfigError, ConfigResult};

/// 外部文本生成服务配置
///
/// API密钥不写入配置文件，只记录读取密钥的环境变量名。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub prompt_path: String,
    pub request_timeout_seconds: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            prompt_path: "./prompt.txt".to_string(),
            request_timeout_seconds: 120,
        }
    }
}

impl GenerationConfig {
    /// 从环境变量读取API密钥，缺失时返回环境错误
    pub fn api_key(&self) -> ConfigResult<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::Environment(format!(
                "{} environment variable is not set",
                self.api_key_env
            ))),
        }
    }
}

impl ConfigValidator for GenerationConfig {
    fn validate(&self) -> ConfigResult<()> {
        ValidationUtils::validate_url(&self.endpoint, "generation.endpoint")?;
        ValidationUtils::validate_not_empty(&self.model, "generation.model")?;
        ValidationUtils::validate_not_empty(&self.api_key_env, "generation.api_key_env")?;
        ValidationUtils::validate_not_empty(&self.prompt_path, "generation.prompt_path")?;
        ValidationUtils::validate_timeout_seconds(
            self.request_timeout_seconds,
            "generation.request_timeout_seconds",
        )?;
        Ok(())
    }
}
