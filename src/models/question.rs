use serde::{Deserialize, Serialize};

/// 题目类型
///
/// 存储端的类型标签大小写不固定（"Input" / "input" / "MCQ" / "mcq"），
/// 解析时不区分大小写，原始标签在 [`Question::question_type`] 中原样保留
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionType {
    /// 填空题：考生自由输入答案
    Input,
    /// 选择题：固定四个选项
    Mcq,
    /// 其他类型，不参与最终题集
    Other,
}

impl QuestionType {
    /// 从原始标签解析题目类型（不区分大小写）
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "input" => QuestionType::Input,
            "mcq" => QuestionType::Mcq,
            _ => QuestionType::Other,
        }
    }
}

/// 单个候选答案
///
/// rank = 0 且 score = 0 表示尚未排名；排名后错误答案始终保持 0/0
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// 答案文本
    #[serde(default)]
    pub answer: String,
    /// 是否为正确答案
    #[serde(default)]
    pub is_correct: bool,
    /// 观测到的作答次数
    #[serde(default)]
    pub response_count: u32,
    /// 排名（1 起，0 = 未排名）
    #[serde(default)]
    pub rank: u32,
    /// 得分（0 = 未排名或超出计分表）
    #[serde(default)]
    pub score: u32,
}

/// 调查问卷题目
///
/// 所有可缺省字段都在反序列化时取默认值，后续代码不再做字段存在性检查
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// 题目ID（存储端主键，跨运行稳定）
    #[serde(rename = "_id", alias = "questionID", default)]
    pub id: String,
    /// 题干
    #[serde(default)]
    pub question: String,
    /// 类型标签（原样保留大小写）
    #[serde(default)]
    pub question_type: String,
    /// 分类
    #[serde(default)]
    pub question_category: String,
    /// 难度等级
    #[serde(default)]
    pub question_level: String,
    /// 累计作答次数
    #[serde(default)]
    pub times_answered: u32,
    /// 累计跳过次数
    #[serde(default)]
    pub times_skipped: u32,
    /// 候选答案列表
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Question {
    /// 解析后的题目类型
    pub fn kind(&self) -> QuestionType {
        QuestionType::parse(&self.question_type)
    }

    /// 是否存在正确答案
    pub fn has_correct_answers(&self) -> bool {
        self.answers.iter().any(|a| a.is_correct)
    }

    /// 结构校验：写回存储前必须有ID、题干和答案
    pub fn is_structurally_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.question.trim().is_empty() && !self.answers.is_empty()
    }
}
