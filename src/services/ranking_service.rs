//! 答案排名服务
//!
//! 负责单个题目的排名计算：正确答案按作答次数排名并按计分表赋分，
//! 错误答案一律清零

use tracing::debug;

use crate::models::{Answer, Question};

/// 单题处理结果
///
/// 跳过和校验失败都是正常分类结果，不通过错误传播
#[derive(Debug)]
pub enum ProcessOutcome {
    /// 排名完成
    Processed {
        question: Question,
        answers_ranked: usize,
        answers_scored: usize,
    },
    /// 跳过（无答案或无正确答案）
    Skipped,
    /// 结构校验失败（缺ID或题干），计数后排除出写回
    ValidationFailed,
}

/// 批量排名结果
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// 排名完成、通过校验的题目
    pub processed_questions: Vec<Question>,
    pub processed_count: usize,
    pub skipped_count: usize,
    pub validation_failed: usize,
    pub answers_ranked: usize,
    pub answers_scored: usize,
}

/// 答案排名器
///
/// 对单个题目的答案集合做纯函数计算，不触碰存储
pub struct AnswerRanker {
    scoring_values: Vec<u32>,
}

impl AnswerRanker {
    pub fn new(scoring_values: Vec<u32>) -> Self {
        Self { scoring_values }
    }

    /// 排名并赋分
    ///
    /// # 参数
    /// - `answers`: 一个题目的全部答案
    ///
    /// # 返回
    /// 返回 (排名后的答案, 被排名数, 非零得分数)；
    /// 正确答案按作答次数降序排名（并列保持输入顺序），排在前面，
    /// 错误答案 rank/score 清零，排在后面
    pub fn rank_answers(&self, answers: Vec<Answer>) -> (Vec<Answer>, usize, usize) {
        if answers.is_empty() {
            return (answers, 0, 0);
        }

        debug!("开始排名 {} 个答案", answers.len());

        let (mut correct, mut incorrect): (Vec<Answer>, Vec<Answer>) =
            answers.into_iter().partition(|a| a.is_correct);

        // sort_by 是稳定排序，作答次数并列时保持输入顺序
        correct.sort_by(|a, b| b.response_count.cmp(&a.response_count));

        let mut answers_ranked = 0;
        let mut answers_scored = 0;

        for (i, answer) in correct.iter_mut().enumerate() {
            answer.rank = (i + 1) as u32;
            answer.score = self.scoring_values.get(i).copied().unwrap_or(0);
            answers_ranked += 1;
            if answer.score > 0 {
                answers_scored += 1;
            }
        }

        for answer in incorrect.iter_mut() {
            answer.rank = 0;
            answer.score = 0;
        }

        debug!(
            "排名完成: {} 个被排名, {} 个获得非零得分",
            answers_ranked, answers_scored
        );

        // 正确答案在前，错误答案在后（展示习惯，无语义含义）
        correct.extend(incorrect);
        (correct, answers_ranked, answers_scored)
    }
}

/// 题目处理器
///
/// 把排名器套在单个题目上，并做跳过/校验判定
pub struct QuestionProcessor {
    ranker: AnswerRanker,
}

impl QuestionProcessor {
    pub fn new(ranker: AnswerRanker) -> Self {
        Self { ranker }
    }

    /// 处理单个题目
    pub fn process(&self, mut question: Question) -> ProcessOutcome {
        if question.answers.is_empty() {
            debug!("⏭️ 跳过题目 {} - 没有答案", question.id);
            return ProcessOutcome::Skipped;
        }

        if !question.has_correct_answers() {
            debug!("⏭️ 跳过题目 {} - 没有正确答案", question.id);
            return ProcessOutcome::Skipped;
        }

        let answers = std::mem::take(&mut question.answers);
        let (ranked, answers_ranked, answers_scored) = self.ranker.rank_answers(answers);
        question.answers = ranked;

        if !question.is_structurally_valid() {
            debug!("❌ 题目 {} 结构校验失败", question.id);
            return ProcessOutcome::ValidationFailed;
        }

        debug!(
            "✅ 题目 {}: 排名 {} 个答案, {} 个获得得分",
            question.id, answers_ranked, answers_scored
        );

        ProcessOutcome::Processed {
            question,
            answers_ranked,
            answers_scored,
        }
    }
}

/// 排名服务
///
/// 对一批题目逐个做排名，汇总各分类的计数
pub struct RankingService {
    processor: QuestionProcessor,
}

impl RankingService {
    pub fn new(scoring_values: Vec<u32>) -> Self {
        Self {
            processor: QuestionProcessor::new(AnswerRanker::new(scoring_values)),
        }
    }

    /// 批量排名
    pub fn rank_batch(&self, questions: Vec<Question>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for question in questions {
            match self.processor.process(question) {
                ProcessOutcome::Processed {
                    question,
                    answers_ranked,
                    answers_scored,
                } => {
                    outcome.processed_questions.push(question);
                    outcome.processed_count += 1;
                    outcome.answers_ranked += answers_ranked;
                    outcome.answers_scored += answers_scored;
                }
                ProcessOutcome::Skipped => outcome.skipped_count += 1,
                ProcessOutcome::ValidationFailed => outcome.validation_failed += 1,
            }
        }

        outcome
    }
}
