/// 一次完整运行的汇总结果
///
/// 每个阶段只往里累加计数，不依赖任何共享可变状态；
/// 编排器在运行结束时整体返回，取代"最近一次操作详情"式的全局诊断字段
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// 拉取到的题目总数
    pub total_questions: usize,
    /// 成功排名的题目数
    pub processed_count: usize,
    /// 跳过的题目数（无答案或无正确答案）
    pub skipped_count: usize,
    /// 结构校验失败的题目数
    pub validation_failed_count: usize,
    /// 写回存储成功的题目数
    pub updated_count: usize,
    /// 写回存储失败的题目数
    pub failed_count: usize,
    /// 被排名的答案总数
    pub answers_ranked: usize,
    /// 获得非零得分的答案总数
    pub answers_scored: usize,
    /// 符合最终题集要求的题目数
    pub final_ready_count: usize,
    /// 正确答案不足的 Input 题目数
    pub final_needs_more_count: usize,
    /// 最终题集：新提交数
    pub final_new_count: usize,
    /// 最终题集：更新数
    pub final_updated_count: usize,
    /// 最终题集：无变化数
    pub final_unchanged_count: usize,
    /// 最终题集：提交/更新失败数
    pub final_failed_count: usize,
    /// 最终题集提交是否成功
    pub final_submission_success: bool,
    /// 最终题集提交结果描述
    pub final_submission_message: String,
    /// 整次运行是否成功（取得进展，或确认无事可做）
    pub success: bool,
}
