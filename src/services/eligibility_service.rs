//! 最终题集资格规则
//!
//! 按题目类型判定一个已排名的题目能否进入最终题集，并构建要提交的
//! 裁剪后答案集。只读取题目数据，从不访问存储。
//!
//! 规则来自存储端的校验要求：
//! - Input 题：至少 3 个"正确且已排名已得分"的答案，取排名最前的 3 个，
//!   只提交这 3 个，is_correct 统一置为 true
//! - MCQ 题：恰好 4 个选项、恰好 1 个正确、文本非空且互不重复
//!   （忽略大小写），4 个选项全部提交，保留各自的对错标记
//! - 其他类型一律不进入最终题集

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::models::{Answer, FinalAnswer, FinalQuestion, Question, QuestionType};

/// Input 题需要的合格正确答案数
const INPUT_REQUIRED_CORRECT: usize = 3;
/// MCQ 题需要的选项总数
const MCQ_REQUIRED_OPTIONS: usize = 4;

/// 资格判定结果
#[derive(Debug)]
pub enum Eligibility {
    /// 符合要求，附带构建好的最终题集记录
    Ready(FinalQuestion),
    /// Input 题正确答案不足（1 到 2 个），还需要更多作答
    NeedsMoreAnswers { found: usize },
    /// 不符合要求
    NotEligible,
}

/// 一批题目的资格分析汇总
#[derive(Debug, Default)]
pub struct EligibilitySummary {
    pub total: usize,
    pub input_total: usize,
    pub mcq_total: usize,
    pub other_total: usize,
    pub ready: usize,
    pub needs_more: usize,
    pub not_eligible: usize,
    /// 构建好的最终题集记录，顺序与输入题目一致
    pub ready_questions: Vec<FinalQuestion>,
}

/// 最终题集资格服务
pub struct EligibilityService;

impl EligibilityService {
    pub fn new() -> Self {
        Self
    }

    /// 判定单个题目的资格
    pub fn evaluate(&self, question: &Question) -> Eligibility {
        match question.kind() {
            QuestionType::Input => self.evaluate_input(question),
            QuestionType::Mcq => self.evaluate_mcq(question),
            QuestionType::Other => {
                // 显式落空：未知类型不默认接受
                debug!(
                    "⏭️ 题目 {} 类型为 {}，不进入最终题集",
                    question.id, question.question_type
                );
                Eligibility::NotEligible
            }
        }
    }

    /// 分析一批题目，输出按类型的汇总和就绪集
    pub fn summarize(&self, questions: &[Question]) -> EligibilitySummary {
        let mut summary = EligibilitySummary {
            total: questions.len(),
            ..Default::default()
        };

        for question in questions {
            match question.kind() {
                QuestionType::Input => summary.input_total += 1,
                QuestionType::Mcq => summary.mcq_total += 1,
                QuestionType::Other => summary.other_total += 1,
            }

            match self.evaluate(question) {
                Eligibility::Ready(record) => {
                    summary.ready += 1;
                    summary.ready_questions.push(record);
                }
                Eligibility::NeedsMoreAnswers { found } => {
                    debug!(
                        "📋 Input 题目 {} 还需要更多正确答案: 现有 {}，至少 {}",
                        question.id, found, INPUT_REQUIRED_CORRECT
                    );
                    summary.needs_more += 1;
                }
                Eligibility::NotEligible => summary.not_eligible += 1,
            }
        }

        summary
    }

    /// Input 题规则：取排名最前的 3 个合格正确答案
    fn evaluate_input(&self, question: &Question) -> Eligibility {
        let mut qualifying: Vec<&Answer> = question
            .answers
            .iter()
            .filter(|a| a.is_correct && a.rank > 0 && a.score > 0)
            .collect();

        if qualifying.len() < INPUT_REQUIRED_CORRECT {
            if qualifying.is_empty() {
                return Eligibility::NotEligible;
            }
            return Eligibility::NeedsMoreAnswers {
                found: qualifying.len(),
            };
        }

        // 按排名升序取最优的 3 个
        qualifying.sort_by_key(|a| a.rank);

        let mut final_answers = Vec::with_capacity(INPUT_REQUIRED_CORRECT);
        for answer in &qualifying[..INPUT_REQUIRED_CORRECT] {
            let text = answer.answer.trim();
            if text.is_empty() {
                warn!("⚠️ 题目 {} 存在空白答案文本，不进入最终题集", question.id);
                return Eligibility::NotEligible;
            }

            final_answers.push(FinalAnswer {
                answer: text.to_string(),
                response_count: answer.response_count,
                // Input 题只提交正确答案，统一置 true
                is_correct: true,
                rank: answer.rank,
                score: answer.score,
            });
        }

        Eligibility::Ready(build_final_question(question, final_answers))
    }

    /// MCQ 题规则：4 个选项、1 个正确、文本非空且互不重复
    fn evaluate_mcq(&self, question: &Question) -> Eligibility {
        if question.answers.len() != MCQ_REQUIRED_OPTIONS {
            warn!(
                "⚠️ MCQ 题目 {} 需要恰好 {} 个选项，现有 {}",
                question.id,
                MCQ_REQUIRED_OPTIONS,
                question.answers.len()
            );
            return Eligibility::NotEligible;
        }

        let correct_count = question.answers.iter().filter(|a| a.is_correct).count();
        if correct_count != 1 {
            warn!(
                "⚠️ MCQ 题目 {} 需要恰好 1 个正确答案，现有 {}",
                question.id, correct_count
            );
            return Eligibility::NotEligible;
        }

        let mut seen = HashSet::new();
        let mut final_answers = Vec::with_capacity(MCQ_REQUIRED_OPTIONS);

        for answer in &question.answers {
            let text = answer.answer.trim();
            if text.is_empty() {
                warn!("⚠️ MCQ 题目 {} 存在空白选项文本", question.id);
                return Eligibility::NotEligible;
            }

            if !seen.insert(text.to_lowercase()) {
                warn!("⚠️ MCQ 题目 {} 选项文本重复: {}", question.id, text);
                return Eligibility::NotEligible;
            }

            final_answers.push(FinalAnswer {
                answer: text.to_string(),
                response_count: answer.response_count,
                // MCQ 题保留每个选项原始的对错标记
                is_correct: answer.is_correct,
                rank: answer.rank,
                score: answer.score,
            });
        }

        Eligibility::Ready(build_final_question(question, final_answers))
    }
}

impl Default for EligibilityService {
    fn default() -> Self {
        Self::new()
    }
}

/// 构建最终题集记录，类型标签原样保留大小写
fn build_final_question(question: &Question, answers: Vec<FinalAnswer>) -> FinalQuestion {
    FinalQuestion {
        existing_id: None,
        question: question.question.clone(),
        question_type: question.question_type.clone(),
        question_category: question.question_category.clone(),
        question_level: question.question_level.clone(),
        times_skipped: question.times_skipped,
        times_answered: question.times_answered,
        answers,
    }
}
