//! 排名与最终提交处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，驱动一次完整的运行：
//!
//! 1. **拉取**：从存储拉取全部题目（连接失败对整次运行是致命的）
//! 2. **排名**：逐题套用排名器，分类计数（处理/跳过/校验失败）
//! 3. **写回**：一次批量调用写回全部排名结果
//! 4. **资格分析**：重新拉取（以获取存储端可能做的归一化），逐题判定资格
//! 5. **对账**：与远端最终题集比对，归类新增/变化/无变化
//! 6. **提交**：新增走一次批量提交，变化逐条更新，无变化不再提交
//! 7. **汇总**：聚合各阶段计数，返回结构化的运行结果
//!
//! 写回为零时直接收尾，不会用空集去做最终提交。
//!
//! ## 设计特点
//!
//! - **顺序执行**：逐题、逐条顺序处理，保证更新顺序确定，
//!   同时把对存储服务的并发压力控制在一次一个请求
//! - **只做调度和统计**：排名/资格/对账的业务判断全部在 services 层
//! - **结果即状态**：每个阶段的结果显式累入 RunSummary，
//!   不依赖任何"最近一次操作"式的共享诊断字段

use std::time::Instant;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::clients::{BulkUpdateResult, HttpQuestionStore, QuestionStore};
use crate::config::Config;
use crate::models::{Question, RunSummary};
use crate::services::{Categorized, EligibilityService, EligibilitySummary, RankingService, ReconcileService};

/// 应用主结构
pub struct App {
    store: Box<dyn QuestionStore>,
    ranking: RankingService,
    eligibility: EligibilityService,
    reconcile: ReconcileService,
}

impl App {
    /// 初始化应用
    ///
    /// 校验配置并探测存储服务连通性，任一失败则整次运行在此终止
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        log_startup(&config);

        let store = HttpQuestionStore::new(&config)?;
        let app = Self::with_store(&config, Box::new(store));

        if !app.store.test_connection().await {
            anyhow::bail!("存储服务连接失败，终止运行");
        }

        Ok(app)
    }

    /// 用指定的存储实现构建应用（测试时注入内存实现）
    pub fn with_store(config: &Config, store: Box<dyn QuestionStore>) -> Self {
        info!("🔧 初始化服务，计分表: {:?}", config.scoring_values);

        Self {
            store,
            ranking: RankingService::new(config.scoring_values.clone()),
            eligibility: EligibilityService::new(),
            reconcile: ReconcileService::new(),
        }
    }

    /// 运行完整的排名与最终提交流程
    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();

        // ---- 拉取 ----
        let questions = self.store.fetch_all().await?;

        if questions.is_empty() {
            warn!("⚠️ 存储中没有题目，本次运行无事可做");
            let summary = RunSummary {
                success: true,
                final_submission_message: "存储为空，没有题目需要处理".to_string(),
                ..Default::default()
            };
            log_final_stats(&summary, started);
            return Ok(summary);
        }

        // ---- 排名 ----
        info!("⚙️ 开始排名 {} 个题目...", questions.len());
        let batch = self.ranking.rank_batch(questions);

        info!(
            "✓ 排名完成: {} 个处理, {} 个跳过, {} 个校验失败",
            batch.processed_count, batch.skipped_count, batch.validation_failed
        );

        // ---- 写回 ----
        let update_result = self.persist_rankings(&batch.processed_questions).await;

        let mut summary = RunSummary {
            total_questions: batch.processed_count + batch.skipped_count + batch.validation_failed,
            processed_count: batch.processed_count,
            skipped_count: batch.skipped_count,
            validation_failed_count: batch.validation_failed,
            updated_count: update_result.updated_count,
            failed_count: update_result.failed_count,
            answers_ranked: batch.answers_ranked,
            answers_scored: batch.answers_scored,
            ..Default::default()
        };

        // ---- 零更新直接收尾，不做最终提交 ----
        if summary.updated_count == 0 {
            info!("ℹ️ 没有题目更新了排名，跳过最终题集提交");
            summary.final_submission_message = "没有排名更新，跳过最终题集提交".to_string();
            summary.success = summary.failed_count == 0;
            log_final_stats(&summary, started);
            return Ok(summary);
        }

        // ---- 资格分析 ----
        // 重新拉取已写回的题目，以获取存储端可能做的归一化
        info!("🏆 排名已写回，开始分析最终题集资格...");
        let refreshed = match self.store.fetch_all().await {
            Ok(questions) => questions,
            Err(e) => {
                error!("❌ 重新拉取题目失败: {}", e);
                summary.final_submission_message = format!("重新拉取题目失败: {}", e);
                summary.success = true; // 排名已写回，本次运行仍有进展
                log_final_stats(&summary, started);
                return Ok(summary);
            }
        };

        let analysis = self.eligibility.summarize(&refreshed);
        log_eligibility_analysis(&analysis);

        summary.final_ready_count = analysis.ready;
        summary.final_needs_more_count = analysis.needs_more;

        if analysis.ready == 0 {
            info!("ℹ️ 没有题目符合最终题集要求，跳过提交");
            summary.final_submission_message = "没有题目符合最终题集要求".to_string();
            summary.success = true;
            log_final_stats(&summary, started);
            return Ok(summary);
        }

        // ---- 对账 ----
        let categorized = match self.store.fetch_final_collection().await {
            Some(remote) => self.reconcile.categorize(analysis.ready_questions, &remote),
            None => {
                warn!("⚠️ 无法确认最终题集现状，全部按新题提交");
                Categorized {
                    new: analysis.ready_questions,
                    ..Default::default()
                }
            }
        };

        info!("📊 最终题集对账结果:");
        info!("   📝 新题: {}", categorized.new.len());
        info!("   🔄 有变化: {}", categorized.changed.len());
        info!("   ✅ 无变化: {}", categorized.unchanged.len());

        // ---- 提交 ----
        self.submit_final(categorized, &mut summary).await;

        summary.success = summary.updated_count > 0
            || summary.final_new_count > 0
            || summary.final_updated_count > 0
            || summary.final_unchanged_count > 0;

        log_final_stats(&summary, started);
        Ok(summary)
    }

    /// 批量写回排名结果；网络不可达按全部失败计数，不中断后续阶段
    async fn persist_rankings(&self, questions: &[Question]) -> BulkUpdateResult {
        if questions.is_empty() {
            warn!("⚠️ 没有通过校验的题目需要写回");
            return BulkUpdateResult::default();
        }

        match self.store.bulk_update(questions).await {
            Ok(result) => result,
            Err(e) => {
                error!("❌ 批量写回失败: {}", e);
                BulkUpdateResult {
                    updated_count: 0,
                    failed_count: questions.len(),
                }
            }
        }
    }

    /// 提交对账结果：新题批量提交，变化的逐条更新
    async fn submit_final(&self, categorized: Categorized, summary: &mut RunSummary) {
        let mut message_parts = Vec::new();

        if !categorized.new.is_empty() {
            let result = self.store.create_final(&categorized.new).await;
            if result.success {
                summary.final_new_count = result.submitted_count;
                message_parts.push(format!("{} 条新记录已提交", result.submitted_count));
            } else {
                error!("❌ 新记录提交失败: {}", result.message);
                summary.final_failed_count += categorized.new.len();
                message_parts.push(format!("新记录提交失败: {}", result.message));
            }
        }

        for record in &categorized.changed {
            let Some(existing_id) = record.existing_id.as_deref() else {
                error!("❌ 题目 '{}' 缺少远端ID，无法更新", record.question);
                summary.final_failed_count += 1;
                continue;
            };

            if self.store.update_final(existing_id, record).await {
                summary.final_updated_count += 1;
            } else {
                summary.final_failed_count += 1;
            }
        }

        if summary.final_updated_count > 0 {
            message_parts.push(format!("{} 条记录已更新", summary.final_updated_count));
        }

        summary.final_unchanged_count = categorized.unchanged.len();
        if summary.final_unchanged_count > 0 {
            info!("ℹ️ {} 条记录无变化，跳过提交", summary.final_unchanged_count);
            message_parts.push(format!("{} 条记录无变化", summary.final_unchanged_count));
        }

        summary.final_submission_success = summary.final_new_count > 0
            || summary.final_updated_count > 0
            || summary.final_unchanged_count > 0;

        summary.final_submission_message = if message_parts.is_empty() {
            "未检测到变化".to_string()
        } else {
            message_parts.join("; ")
        };

        if summary.final_submission_success {
            info!("✅ 最终题集提交完成: {}", summary.final_submission_message);
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 启动调查问卷答案排名与最终提交处理器");
    info!("📡 存储服务: {}", config.questions_url());
    info!("{}", "=".repeat(60));
}

fn log_eligibility_analysis(analysis: &EligibilitySummary) {
    info!("📊 最终题集资格分析:");
    info!("   题目总数: {}", analysis.total);
    info!("   符合要求: {}", analysis.ready);
    info!("   答案不足: {}", analysis.needs_more);
    info!(
        "   Input 题: {} / MCQ 题: {} / 其他: {}",
        analysis.input_total, analysis.mcq_total, analysis.other_total
    );
    if analysis.needs_more > 0 {
        warn!(
            "⚠️ {} 个 Input 题目正确答案不足（至少需要 3 个）",
            analysis.needs_more
        );
    }
}

fn log_final_stats(summary: &RunSummary, started: Instant) {
    let elapsed = started.elapsed().as_secs_f64();

    info!("\n{}", "=".repeat(60));
    info!("📊 排名与最终提交完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("⏱️ 处理耗时: {:.2}s", elapsed);
    info!("📝 题目总数: {}", summary.total_questions);
    info!("✅ 已处理: {}", summary.processed_count);
    info!("⏭️ 已跳过: {}", summary.skipped_count);
    info!("💾 写回成功: {}", summary.updated_count);
    info!("❌ 写回失败: {}", summary.failed_count);
    info!("🏆 答案排名数: {}", summary.answers_ranked);
    info!("🎯 答案得分数: {}", summary.answers_scored);
    info!("📋 符合最终题集: {}", summary.final_ready_count);
    info!(
        "🚀 最终题集: 新增 {} / 更新 {} / 无变化 {} / 失败 {}",
        summary.final_new_count,
        summary.final_updated_count,
        summary.final_unchanged_count,
        summary.final_failed_count
    );

    if summary.validation_failed_count > 0 {
        warn!("⚠️ {} 个题目结构校验失败", summary.validation_failed_count);
    }

    if summary.success {
        info!("🏁 本次运行完成: {}", summary.final_submission_message);
    } else {
        warn!("⚠️ 本次运行未取得进展: {}", summary.final_submission_message);
    }
    info!("{}", "=".repeat(60));
}
