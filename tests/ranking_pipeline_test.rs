//! 完整流程集成测试
//!
//! 用内存版的 QuestionStore 驱动整个"排名 → 写回 → 资格分析 →
//! 对账 → 提交"流程，不依赖真实存储服务

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rank_question_submit::clients::{BulkUpdateResult, CreateFinalResult, QuestionStore};
use rank_question_submit::error::AppResult;
use rank_question_submit::models::{Answer, FinalQuestion, Question};
use rank_question_submit::{App, Config};

/// 内存版存储，记录每类调用次数供断言
#[derive(Default)]
struct MockStore {
    questions: Mutex<Vec<Question>>,
    final_collection: Mutex<Option<Vec<FinalQuestion>>>,
    next_final_id: AtomicUsize,
    bulk_update_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: Mutex<Vec<String>>,
}

impl MockStore {
    fn with_questions(questions: Vec<Question>) -> Arc<Self> {
        Arc::new(Self {
            questions: Mutex::new(questions),
            final_collection: Mutex::new(Some(Vec::new())),
            ..Default::default()
        })
    }

    fn stored_questions(&self) -> Vec<Question> {
        self.questions.lock().unwrap().clone()
    }

    fn stored_finals(&self) -> Vec<FinalQuestion> {
        self.final_collection
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_default()
    }
}

/// 本地包装类型：在集成测试 crate 里为共享句柄实现外部 trait（绕过孤儿规则）
struct ArcStore(Arc<MockStore>);

#[async_trait]
impl QuestionStore for ArcStore {
    async fn test_connection(&self) -> bool {
        self.0.test_connection().await
    }

    async fn fetch_all(&self) -> AppResult<Vec<Question>> {
        self.0.fetch_all().await
    }

    async fn bulk_update(&self, updated: &[Question]) -> AppResult<BulkUpdateResult> {
        self.0.bulk_update(updated).await
    }

    async fn fetch_final_collection(&self) -> Option<Vec<FinalQuestion>> {
        self.0.fetch_final_collection().await
    }

    async fn create_final(&self, records: &[FinalQuestion]) -> CreateFinalResult {
        self.0.create_final(records).await
    }

    async fn update_final(&self, existing_id: &str, record: &FinalQuestion) -> bool {
        self.0.update_final(existing_id, record).await
    }
}

#[async_trait]
impl QuestionStore for MockStore {
    async fn test_connection(&self) -> bool {
        true
    }

    async fn fetch_all(&self) -> AppResult<Vec<Question>> {
        Ok(self.questions.lock().unwrap().clone())
    }

    async fn bulk_update(&self, updated: &[Question]) -> AppResult<BulkUpdateResult> {
        self.bulk_update_calls.fetch_add(1, Ordering::SeqCst);

        let mut stored = self.questions.lock().unwrap();
        for question in updated {
            if let Some(slot) = stored.iter_mut().find(|q| q.id == question.id) {
                *slot = question.clone();
            }
        }

        Ok(BulkUpdateResult {
            updated_count: updated.len(),
            failed_count: 0,
        })
    }

    async fn fetch_final_collection(&self) -> Option<Vec<FinalQuestion>> {
        self.final_collection.lock().unwrap().clone()
    }

    async fn create_final(&self, records: &[FinalQuestion]) -> CreateFinalResult {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let mut collection = self.final_collection.lock().unwrap();
        let collection = collection.get_or_insert_with(Vec::new);

        for record in records {
            let id = self.next_final_id.fetch_add(1, Ordering::SeqCst);
            let mut stored = record.clone();
            stored.existing_id = Some(format!("final-{}", id));
            collection.push(stored);
        }

        CreateFinalResult {
            submitted_count: records.len(),
            success: true,
            message: format!("提交了 {} 条新记录", records.len()),
        }
    }

    async fn update_final(&self, existing_id: &str, record: &FinalQuestion) -> bool {
        self.update_calls
            .lock()
            .unwrap()
            .push(existing_id.to_string());

        let mut collection = self.final_collection.lock().unwrap();
        let Some(collection) = collection.as_mut() else {
            return false;
        };

        match collection
            .iter_mut()
            .find(|r| r.existing_id.as_deref() == Some(existing_id))
        {
            Some(slot) => {
                let mut updated = record.clone();
                updated.existing_id = Some(existing_id.to_string());
                *slot = updated;
                true
            }
            None => false,
        }
    }
}

fn test_config(scoring_values: Vec<u32>) -> Config {
    Config {
        api_base_url: "http://localhost:5000".to_string(),
        api_key: "test-key".to_string(),
        scoring_values,
        ..Config::default()
    }
}

fn answer(text: &str, is_correct: bool, response_count: u32) -> Answer {
    Answer {
        answer: text.to_string(),
        is_correct,
        response_count,
        rank: 0,
        score: 0,
    }
}

fn input_question(id: &str, prompt: &str, answers: Vec<Answer>) -> Question {
    Question {
        id: id.to_string(),
        question: prompt.to_string(),
        question_type: "Input".to_string(),
        question_category: "地理".to_string(),
        question_level: "easy".to_string(),
        times_answered: 26,
        times_skipped: 4,
        answers,
    }
}

#[tokio::test]
async fn test_end_to_end_input_question_ranking_and_submission() {
    // 作答次数 [10, 7, 7, 2] + 计分表 [100, 80, 60]
    // → 排名 [1, 2, 3, 4]，得分 [100, 80, 60, 0]，前 3 名进入最终题集
    let store = MockStore::with_questions(vec![input_question(
        "q1",
        "法国的首都是哪里？",
        vec![
            answer("paris", true, 7),
            answer("巴黎", true, 10),
            answer("Paris", true, 7),
            answer("PARIS", true, 2),
        ],
    )]);

    let app = App::with_store(&test_config(vec![100, 80, 60]), Box::new(ArcStore(store.clone())));
    let summary = app.run().await.expect("运行应该成功");

    assert_eq!(summary.total_questions, 1);
    assert_eq!(summary.processed_count, 1);
    assert_eq!(summary.updated_count, 1);
    assert_eq!(summary.answers_ranked, 4);
    assert_eq!(summary.answers_scored, 3);

    // 写回的排名结果
    let stored = store.stored_questions();
    let ranks: Vec<u32> = stored[0].answers.iter().map(|a| a.rank).collect();
    let scores: Vec<u32> = stored[0].answers.iter().map(|a| a.score).collect();
    let counts: Vec<u32> = stored[0].answers.iter().map(|a| a.response_count).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
    assert_eq!(scores, vec![100, 80, 60, 0]);
    assert_eq!(counts, vec![10, 7, 7, 2]);

    // 最终题集恰好收到排名前 3 的答案，is_correct 全部为 true
    assert_eq!(summary.final_ready_count, 1);
    assert_eq!(summary.final_new_count, 1);
    assert!(summary.final_submission_success);
    assert!(summary.success);

    let finals = store.stored_finals();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].answers.len(), 3);
    let final_counts: Vec<u32> = finals[0].answers.iter().map(|a| a.response_count).collect();
    assert_eq!(final_counts, vec![10, 7, 7]);
    assert!(finals[0].answers.iter().all(|a| a.is_correct));
    assert_eq!(finals[0].question_type, "Input");
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    // 远端状态未变时，第二次运行全部归类为无变化，最终题集零写入
    let store = MockStore::with_questions(vec![input_question(
        "q1",
        "法国的首都是哪里？",
        vec![
            answer("巴黎", true, 10),
            answer("paris", true, 7),
            answer("Paris", true, 5),
        ],
    )]);

    let config = test_config(vec![100, 80, 60]);

    let first = App::with_store(&config, Box::new(ArcStore(store.clone())))
        .run()
        .await
        .expect("第一次运行应该成功");
    assert_eq!(first.final_new_count, 1);
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);

    let second = App::with_store(&config, Box::new(ArcStore(store.clone())))
        .run()
        .await
        .expect("第二次运行应该成功");

    assert_eq!(second.final_new_count, 0);
    assert_eq!(second.final_updated_count, 0);
    assert_eq!(second.final_unchanged_count, 1);
    assert!(second.success);

    // 最终题集的提交/更新调用都没有增加
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
    assert!(store.update_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_changed_answers_trigger_per_record_update() {
    let store = MockStore::with_questions(vec![input_question(
        "q1",
        "法国的首都是哪里？",
        vec![
            answer("巴黎", true, 12),
            answer("paris", true, 7),
            answer("Paris", true, 5),
        ],
    )]);

    // 远端已有同题干的记录，但作答次数是旧值
    {
        let mut collection = store.final_collection.lock().unwrap();
        let collection = collection.as_mut().unwrap();
        collection.push(FinalQuestion {
            existing_id: Some("final-old".to_string()),
            question: "法国的首都是哪里？".to_string(),
            question_type: "Input".to_string(),
            question_category: "地理".to_string(),
            question_level: "easy".to_string(),
            times_skipped: 4,
            times_answered: 26,
            answers: vec![
                rank_final("巴黎", 1, 100, 10),
                rank_final("paris", 2, 80, 7),
                rank_final("Paris", 3, 60, 5),
            ],
        });
    }

    let summary = App::with_store(&test_config(vec![100, 80, 60]), Box::new(ArcStore(store.clone())))
        .run()
        .await
        .expect("运行应该成功");

    assert_eq!(summary.final_new_count, 0);
    assert_eq!(summary.final_updated_count, 1);
    assert_eq!(summary.final_unchanged_count, 0);

    // 更新调用带着远端ID，没有走批量新建
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        store.update_calls.lock().unwrap().as_slice(),
        &["final-old".to_string()]
    );

    // 远端记录被替换为新的作答次数
    let finals = store.stored_finals();
    assert_eq!(finals[0].answers[0].response_count, 12);
}

#[tokio::test]
async fn test_unknown_final_state_treats_everything_as_new() {
    let store = MockStore::with_questions(vec![input_question(
        "q1",
        "法国的首都是哪里？",
        vec![
            answer("巴黎", true, 10),
            answer("paris", true, 7),
            answer("Paris", true, 5),
        ],
    )]);

    // 无法确认远端现状
    *store.final_collection.lock().unwrap() = None;

    let summary = App::with_store(&test_config(vec![100, 80, 60]), Box::new(ArcStore(store.clone())))
        .run()
        .await
        .expect("运行应该成功");

    assert_eq!(summary.final_new_count, 1);
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_store_is_valid_terminal_state() {
    let store = MockStore::with_questions(vec![]);

    let summary = App::with_store(&test_config(vec![100, 80, 60]), Box::new(ArcStore(store.clone())))
        .run()
        .await
        .expect("空存储不是错误");

    assert!(summary.success);
    assert_eq!(summary.total_questions, 0);
    assert_eq!(store.bulk_update_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_correct_answers_skips_final_submission() {
    // 全部题目都被跳过 → 零写回 → 不做最终提交
    let store = MockStore::with_questions(vec![input_question(
        "q1",
        "没有正确答案的题目",
        vec![answer("错误答案", false, 5)],
    )]);

    let summary = App::with_store(&test_config(vec![100, 80, 60]), Box::new(ArcStore(store.clone())))
        .run()
        .await
        .expect("运行应该成功");

    assert_eq!(summary.skipped_count, 1);
    assert_eq!(summary.updated_count, 0);
    assert!(summary.success, "无事可做不算失败");
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    assert!(store.update_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_mcq_question_flows_to_final() {
    let mut mcq = input_question(
        "q2",
        "下列哪个是法国的首都？",
        vec![
            answer("伦敦", false, 3),
            answer("巴黎", true, 10),
            answer("柏林", false, 2),
            answer("马德里", false, 1),
        ],
    );
    mcq.question_type = "MCQ".to_string();

    let store = MockStore::with_questions(vec![mcq]);

    let summary = App::with_store(&test_config(vec![100, 80, 60]), Box::new(ArcStore(store.clone())))
        .run()
        .await
        .expect("运行应该成功");

    assert_eq!(summary.final_ready_count, 1);
    assert_eq!(summary.final_new_count, 1);

    // MCQ 提交全部 4 个选项，保留对错标记
    let finals = store.stored_finals();
    assert_eq!(finals[0].answers.len(), 4);
    assert_eq!(finals[0].answers.iter().filter(|a| a.is_correct).count(), 1);
    assert_eq!(finals[0].question_type, "MCQ");
}

fn rank_final(text: &str, rank: u32, score: u32, response_count: u32) -> rank_question_submit::FinalAnswer {
    rank_question_submit::FinalAnswer {
        answer: text.to_string(),
        response_count,
        is_correct: true,
        rank,
        score,
    }
}
