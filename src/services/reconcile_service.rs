//! 最终题集对账
//!
//! 把本次运行构建的最终题集记录与远端现状对比，归类为
//! 新增 / 有变化 / 无变化三类。对比使用归一化相等：
//! 文本去空白转小写、数值字段按整数比较，忽略排列顺序差异。
//! 归一键是题干文本（去空白转小写）；两个不同题目共用同一题干的
//! 情况视为不会出现，键冲突时后出现的远端记录覆盖先出现的。

use std::collections::HashMap;

use tracing::{debug, info};

use crate::models::{FinalAnswer, FinalQuestion};

/// 对账归类结果：三类互斥且覆盖全部本地记录
#[derive(Debug, Default)]
pub struct Categorized {
    /// 远端不存在，需要整体新建
    pub new: Vec<FinalQuestion>,
    /// 远端存在但答案有变化，已挂上远端ID待逐条更新
    pub changed: Vec<FinalQuestion>,
    /// 远端存在且内容一致，本次不再提交
    pub unchanged: Vec<FinalQuestion>,
}

/// 最终题集对账服务
pub struct ReconcileService;

impl ReconcileService {
    pub fn new() -> Self {
        Self
    }

    /// 归类本地记录
    ///
    /// # 参数
    /// - `local`: 本次运行构建的最终题集记录
    /// - `remote`: 远端最终题集的当前内容
    pub fn categorize(&self, local: Vec<FinalQuestion>, remote: &[FinalQuestion]) -> Categorized {
        let mut lookup: HashMap<String, &FinalQuestion> = HashMap::new();
        for existing in remote {
            let key = normalize_key(&existing.question);
            if !key.is_empty() {
                lookup.insert(key, existing);
            }
        }

        let mut categorized = Categorized::default();

        for mut record in local {
            let key = normalize_key(&record.question);

            match lookup.get(&key) {
                None => {
                    info!("📝 题目 '{}' 是新题，将提交", preview(&record.question));
                    categorized.new.push(record);
                }
                Some(existing) => {
                    if answers_changed(&record.answers, &existing.answers) {
                        info!("🔄 题目 '{}' 答案有变化，将更新", preview(&record.question));
                        record.existing_id = existing.existing_id.clone();
                        categorized.changed.push(record);
                    } else {
                        debug!("✅ 题目 '{}' 无变化，跳过", preview(&record.question));
                        categorized.unchanged.push(record);
                    }
                }
            }
        }

        categorized
    }
}

impl Default for ReconcileService {
    fn default() -> Self {
        Self::new()
    }
}

/// 归一键：题干去首尾空白、转小写
fn normalize_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// 归一化后的答案元组 (文本, 对错, 排名, 得分, 作答次数)
fn normalize_answer(answer: &FinalAnswer) -> (String, bool, u32, u32, u32) {
    (
        answer.answer.trim().to_lowercase(),
        answer.is_correct,
        answer.rank,
        answer.score,
        answer.response_count,
    )
}

/// 判断两个答案集是否有变化
///
/// 长度不同直接判变；否则归一化后按 (文本, 排名) 排序逐项比较，
/// 排列顺序和大小写/空白差异不构成变化
pub fn answers_changed(new: &[FinalAnswer], existing: &[FinalAnswer]) -> bool {
    if new.len() != existing.len() {
        debug!("答案数量变化: {} -> {}", existing.len(), new.len());
        return true;
    }

    let mut lhs: Vec<_> = new.iter().map(normalize_answer).collect();
    let mut rhs: Vec<_> = existing.iter().map(normalize_answer).collect();

    lhs.sort_by(|a, b| a.0.cmp(&b.0).then(a.2.cmp(&b.2)));
    rhs.sort_by(|a, b| a.0.cmp(&b.0).then(a.2.cmp(&b.2)));

    lhs != rhs
}

/// 截断题干用于日志显示
fn preview(text: &str) -> String {
    if text.chars().count() > 50 {
        text.chars().take(50).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
