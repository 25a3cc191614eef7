//! 题库存储 HTTP 客户端
//!
//! 负责与存储服务的所有 HTTP 交互：拉取题目、批量写回排名、
//! 最终题集的查询/提交/更新

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::clients::store::{BulkUpdateResult, CreateFinalResult, QuestionStore};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{FinalQuestion, Question};

/// 存储服务响应包装
///
/// 题目列表可能出现在 `questions` 或 `data` 字段下
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, alias = "data")]
    questions: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// 响应体层面的成功标记（缺省视为成功，以 HTTP 状态码为准）
    fn is_success(&self) -> bool {
        self.success.unwrap_or(true)
    }

    /// 响应体为空或无法解析时的兜底值
    fn empty() -> Self {
        Self {
            success: None,
            message: None,
            questions: None,
        }
    }
}

/// 题库存储 HTTP 客户端
pub struct HttpQuestionStore {
    client: reqwest::Client,
    questions_url: String,
    final_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl HttpQuestionStore {
    /// 创建新的存储客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            questions_url: config.questions_url(),
            final_url: config.final_url(),
            api_key: config.api_key.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// 把 reqwest 错误映射为应用错误
    fn map_request_error(&self, endpoint: &str, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::api_timeout(endpoint, self.timeout_secs)
        } else {
            AppError::api_request_failed(endpoint, err)
        }
    }

    async fn get_questions_response(&self) -> AppResult<reqwest::Response> {
        self.client
            .get(&self.questions_url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| self.map_request_error(&self.questions_url, e))
    }
}

#[async_trait]
impl QuestionStore for HttpQuestionStore {
    async fn test_connection(&self) -> bool {
        info!("🔍 正在测试存储服务连通性...");

        match self.get_questions_response().await {
            // 404 表示存储为空，服务本身是可达的
            Ok(resp) if resp.status().is_success() || resp.status() == StatusCode::NOT_FOUND => {
                info!("✓ 存储服务连接成功");
                true
            }
            Ok(resp) => {
                error!("❌ 存储服务返回异常状态: {}", resp.status());
                false
            }
            Err(e) => {
                error!("❌ 存储服务连接失败: {}", e);
                false
            }
        }
    }

    async fn fetch_all(&self) -> AppResult<Vec<Question>> {
        info!("📥 正在拉取题目...");

        let resp = self.get_questions_response().await?;
        let status = resp.status();

        // 存储为空时远端返回 404，按空列表处理而不是报错
        if status == StatusCode::NOT_FOUND {
            info!("📭 存储为空，没有题目");
            return Ok(Vec::new());
        }

        if !status.is_success() {
            let message = resp.text().await.ok();
            return Err(AppError::api_bad_response(
                &self.questions_url,
                status.as_u16(),
                message,
            ));
        }

        let envelope: ApiEnvelope<Vec<Question>> = resp
            .json()
            .await
            .map_err(|e| self.map_request_error(&self.questions_url, e))?;

        let questions = envelope.questions.unwrap_or_default();
        info!("✓ 拉取到 {} 个题目", questions.len());

        Ok(questions)
    }

    async fn bulk_update(&self, questions: &[Question]) -> AppResult<BulkUpdateResult> {
        if questions.is_empty() {
            warn!("⚠️ 没有需要写回的题目");
            return Ok(BulkUpdateResult::default());
        }

        info!("📤 批量写回 {} 个题目的排名结果", questions.len());

        let payload = json!({ "questions": questions });
        debug!("批量写回载荷: {} 个题目", questions.len());

        let resp = self
            .client
            .put(&self.questions_url)
            .header("x-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_request_error(&self.questions_url, e))?;

        let status = resp.status();
        let envelope: ApiEnvelope<serde_json::Value> = resp.json().await.unwrap_or_else(|_| ApiEnvelope::empty());

        if status.is_success() && envelope.is_success() {
            info!("✓ 批量写回成功: {} 个题目", questions.len());
            Ok(BulkUpdateResult {
                updated_count: questions.len(),
                failed_count: 0,
            })
        } else {
            error!(
                "❌ 批量写回被拒绝: status={}, message={:?}",
                status,
                envelope.message
            );
            Ok(BulkUpdateResult {
                updated_count: 0,
                failed_count: questions.len(),
            })
        }
    }

    async fn fetch_final_collection(&self) -> Option<Vec<FinalQuestion>> {
        debug!("📥 正在拉取最终题集现状...");

        let resp = match self
            .client
            .get(&self.final_url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("⚠️ 拉取最终题集失败: {}", e);
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!("⚠️ 无法确认最终题集现状: status={}", resp.status());
            return None;
        }

        match resp.json::<ApiEnvelope<Vec<FinalQuestion>>>().await {
            Ok(envelope) if envelope.is_success() => {
                let existing = envelope.questions.unwrap_or_default();
                info!("📋 最终题集现有 {} 条记录", existing.len());
                Some(existing)
            }
            Ok(envelope) => {
                warn!("⚠️ 最终题集查询被拒绝: {:?}", envelope.message);
                None
            }
            Err(e) => {
                warn!("⚠️ 最终题集响应解析失败: {}", e);
                None
            }
        }
    }

    async fn create_final(&self, questions: &[FinalQuestion]) -> CreateFinalResult {
        if questions.is_empty() {
            return CreateFinalResult {
                submitted_count: 0,
                success: true,
                message: "没有新记录需要提交".to_string(),
            };
        }

        info!("📤 提交 {} 条新记录到最终题集", questions.len());

        let payload = json!({ "questions": questions });

        let resp = match self
            .client
            .post(&self.final_url)
            .header("x-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("❌ 最终题集提交请求失败: {}", e);
                return CreateFinalResult::failure(e.to_string());
            }
        };

        let status = resp.status();
        let envelope: ApiEnvelope<serde_json::Value> = resp.json().await.unwrap_or_else(|_| ApiEnvelope::empty());

        if status.is_success() && envelope.is_success() {
            info!("✓ 成功提交 {} 条新记录", questions.len());
            CreateFinalResult {
                submitted_count: questions.len(),
                success: true,
                message: format!("提交了 {} 条新记录", questions.len()),
            }
        } else {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("status={}", status));
            error!("❌ 最终题集提交被拒绝: {}", message);
            CreateFinalResult::failure(message)
        }
    }

    async fn update_final(&self, existing_id: &str, question: &FinalQuestion) -> bool {
        let url = format!("{}/{}", self.final_url, existing_id);
        let payload = json!({ "questions": [question] });

        debug!("🔄 更新最终题集记录 {}", existing_id);

        let resp = match self
            .client
            .put(&url)
            .header("x-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("❌ 更新记录 {} 请求失败: {}", existing_id, e);
                return false;
            }
        };

        let status = resp.status();
        let envelope: ApiEnvelope<serde_json::Value> = resp.json().await.unwrap_or_else(|_| ApiEnvelope::empty());

        if status.is_success() && envelope.is_success() {
            debug!("✓ 记录 {} 更新成功", existing_id);
            true
        } else {
            error!(
                "❌ 记录 {} 更新被拒绝: status={}, message={:?}",
                existing_id, status, envelope.message
            );
            false
        }
    }
}
