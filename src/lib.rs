//! # Rank Question Submit
//!
//! 调查问卷答案排名与最终题集提交工具
//!
//! ## 架构设计
//!
//! 本系统采用三层架构：
//!
//! ### ① 存储接口层（Clients）
//! - `clients/` - 抽象的题库存储接口与 HTTP 实现
//! - `QuestionStore` - 拉取题目、批量写回、最终题集的查询/提交/更新
//! - `HttpQuestionStore` - 基于 reqwest 的实现，封装鉴权和响应解析
//!
//! ### ② 业务规则层（Services）
//! - `services/` - 纯业务判断，不触碰存储
//! - `RankingService` - 正确答案按作答次数排名、按计分表赋分
//! - `EligibilityService` - 按题目类型判定最终题集资格并构建提交记录
//! - `ReconcileService` - 本地记录与远端现状对账（新增/变化/无变化）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/` - 驱动一次完整运行，聚合各阶段计数
//! - `App` - 拉取 → 排名 → 写回 → 资格分析 → 对账 → 提交 → 汇总
//!
//! ## 运行语义
//!
//! 每次运行都从头拉取、重算、对账，不缓存任何跨运行状态；
//! 远端状态未变时重复运行是幂等的：全部归类为无变化，零写入

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;

// 重新导出常用类型
pub use clients::{BulkUpdateResult, CreateFinalResult, HttpQuestionStore, QuestionStore};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Answer, FinalAnswer, FinalQuestion, Question, QuestionType, RunSummary};
pub use orchestrator::App;
pub use services::{EligibilityService, RankingService, ReconcileService};
