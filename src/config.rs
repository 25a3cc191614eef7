use crate::error::{AppError, AppResult};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 存储服务基础 URL
    pub api_base_url: String,
    /// 存储服务 API Key（通过 x-api-key 头传递）
    pub api_key: String,
    /// 题目集合端点
    pub questions_endpoint: String,
    /// 最终题集端点
    pub final_endpoint: String,
    /// 计分表：第 i 项是排名 i+1 的正确答案得分，超出范围得 0 分
    pub scoring_values: Vec<u32>,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            api_key: String::new(),
            questions_endpoint: "/api/v1/admin/survey".to_string(),
            final_endpoint: "/api/v1/admin/survey/final".to_string(),
            scoring_values: vec![100, 80, 60, 40, 20],
            request_timeout_secs: 30,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            api_key: std::env::var("API_KEY").unwrap_or(default.api_key),
            questions_endpoint: std::env::var("QUESTIONS_ENDPOINT").unwrap_or(default.questions_endpoint),
            final_endpoint: std::env::var("FINAL_ENDPOINT").unwrap_or(default.final_endpoint),
            scoring_values: std::env::var("SCORING_VALUES").ok().and_then(|v| parse_scoring_values(&v)).unwrap_or(default.scoring_values),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 校验必填配置，缺失时整次运行在发起任何网络请求前终止
    pub fn validate(&self) -> AppResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::config_missing("API_BASE_URL"));
        }
        if self.api_key.trim().is_empty() {
            return Err(AppError::config_missing("API_KEY"));
        }
        if self.scoring_values.is_empty() {
            return Err(AppError::config_invalid(
                "SCORING_VALUES",
                "",
                "非空的逗号分隔整数列表",
            ));
        }
        Ok(())
    }

    /// 题目集合完整 URL
    pub fn questions_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.questions_endpoint)
    }

    /// 最终题集完整 URL
    pub fn final_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.final_endpoint)
    }
}

/// 解析逗号分隔的计分表，如 "100,80,60,40,20"
fn parse_scoring_values(raw: &str) -> Option<Vec<u32>> {
    let values: Vec<u32> = raw
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .ok()?;

    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scoring_values() {
        assert_eq!(
            parse_scoring_values("100,80,60,40,20"),
            Some(vec![100, 80, 60, 40, 20])
        );
        assert_eq!(parse_scoring_values("100, 80, 60"), Some(vec![100, 80, 60]));
        assert_eq!(parse_scoring_values("100,abc"), None);
        assert_eq!(parse_scoring_values(""), None);
    }

    #[test]
    fn test_validate_requires_api_settings() {
        let config = Config::default();
        assert!(config.validate().is_err(), "缺少 API 配置时应校验失败");

        let config = Config {
            api_base_url: "http://localhost:5000".to_string(),
            api_key: "test-key".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
