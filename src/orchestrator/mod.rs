//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层驱动一次完整的"排名 → 写回 → 资格分析 → 对账 → 提交"运行，
//! 是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! run_processor::App (驱动一次完整运行)
//!     ↓
//! services (业务规则：排名 / 资格 / 对账)
//!     ↓
//! clients (存储接口：QuestionStore / HttpQuestionStore)
//! ```
//!
//! ## 设计原则
//!
//! 1. **无业务逻辑**：只做调度和统计，排名/资格/对账的判断在 services 层
//! 2. **顺序确定**：所有外部调用顺序执行，重复运行结果可复现
//! 3. **幂等**：远端状态未变时，第二次运行全部归类为无变化，零写入

pub mod run_processor;

pub use run_processor::App;
