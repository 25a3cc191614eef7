use serde::{Deserialize, Serialize};

/// 最终题集中的答案
///
/// 提交前每个字段都已显式归一：文本去除首尾空白、计数为整数，
/// Input 题的 is_correct 恒为 true，MCQ 题保留原始对错标记
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalAnswer {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub response_count: u32,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub score: u32,
}

/// 最终题集记录：题目的裁剪投影
///
/// 每次运行都从当前排名状态新建，构建后不再修改；唯一的例外是
/// 对账判定为"有变化"时，把远端记录的ID临时挂到 `existing_id` 上，
/// 供后续的单条更新调用使用。该ID只来自远端，本地提交时不会序列化
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalQuestion {
    /// 远端记录ID（仅反序列化远端数据时出现）
    #[serde(rename = "_id", default, skip_serializing)]
    pub existing_id: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub question_type: String,
    #[serde(default)]
    pub question_category: String,
    #[serde(default)]
    pub question_level: String,
    #[serde(default)]
    pub times_skipped: u32,
    #[serde(default)]
    pub times_answered: u32,
    #[serde(default)]
    pub answers: Vec<FinalAnswer>,
}
