use std::collections::BTreeMap;

use crate::models::task::TaskStatus;

/// 详情页抽到的一条子记录：某个发件人名下的一个运单号
///
/// 创建后不再修改，只参与聚合。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRecord {
    /// 发件人 ID（聚合桶的键）
    pub sender_id: String,
    /// 运单号（桶内去重的键）
    pub tracking_no: String,
}

impl ChildRecord {
    pub fn new(sender_id: impl Into<String>, tracking_no: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            tracking_no: tracking_no.into(),
        }
    }
}

/// 单个任务的最终审计记录
///
/// 生命周期：组装 → 追加到结果列表 → 不再修改。
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditRecord {
    /// 任务编号
    pub task_id: String,
    /// 任务完成时间
    pub complete_time: String,
    /// 任务状态
    pub status: TaskStatus,
    /// 每个发件人的运单数（含 NO_DATA 哨兵项）
    pub sender_counts: BTreeMap<String, usize>,
    /// 运单总数
    pub total_count: usize,
    /// 发件人数量（含哨兵项）
    pub sender_count: usize,
    /// 本条记录的生成时间
    pub processed_at: String,
}
