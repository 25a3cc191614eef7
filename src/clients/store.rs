use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{FinalQuestion, Question};

/// 批量写回结果
#[derive(Debug, Clone, Default)]
pub struct BulkUpdateResult {
    pub updated_count: usize,
    pub failed_count: usize,
}

/// 最终题集批量提交结果
#[derive(Debug, Clone)]
pub struct CreateFinalResult {
    pub submitted_count: usize,
    pub success: bool,
    pub message: String,
}

impl CreateFinalResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            submitted_count: 0,
            success: false,
            message: message.into(),
        }
    }
}

/// 题库存储接口
///
/// 核心流程只依赖这个抽象；传输方式、鉴权和重试策略都封装在实现里。
/// 各方法的失败语义：
/// - `fetch_all` 在网络/鉴权失败时返回 Err（对整次运行是致命的），
///   存储为空时返回 Ok(空列表)，不是错误
/// - `bulk_update` 尽力而为，HTTP 层面的拒绝通过计数体现，只有
///   网络不可达才返回 Err
/// - `fetch_final_collection` 返回 None 表示"无法确认远端现状"，
///   由调用方决定如何降级
/// - `create_final` / `update_final` 从不返回 Err，失败在结果中体现
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// 探测存储服务是否可达
    async fn test_connection(&self) -> bool;

    /// 拉取全部题目
    async fn fetch_all(&self) -> AppResult<Vec<Question>>;

    /// 单次调用批量写回排名结果
    async fn bulk_update(&self, questions: &[Question]) -> AppResult<BulkUpdateResult>;

    /// 拉取最终题集当前内容；None 表示无法确认远端状态
    async fn fetch_final_collection(&self) -> Option<Vec<FinalQuestion>>;

    /// 批量提交新记录到最终题集
    async fn create_final(&self, questions: &[FinalQuestion]) -> CreateFinalResult;

    /// 按远端ID更新单条最终题集记录
    async fn update_final(&self, existing_id: &str, question: &FinalQuestion) -> bool;
}
