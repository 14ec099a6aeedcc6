//! 审计记录组装 - 业务能力层
//!
//! 纯组合器：候选任务 + 聚合完的桶 → 一条 AuditRecord。
//! 不做任何重试，重试属于定位器和翻页器。

use crate::models::{AuditRecord, TaskCandidate};
use crate::services::aggregator::TrackingAggregate;

/// 组装单个任务的最终审计记录
pub fn assemble(candidate: &TaskCandidate, aggregate: &TrackingAggregate) -> AuditRecord {
    let sender_counts = aggregate.read_counts();
    let total_count = sender_counts.values().sum();
    let sender_count = sender_counts.len();

    AuditRecord {
        task_id: candidate.task_id.clone(),
        complete_time: candidate.complete_time.clone(),
        status: candidate.status,
        sender_counts,
        total_count,
        sender_count,
        processed_at: chrono::Local::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChildRecord, TaskStatus};
    use crate::services::aggregator::NO_DATA_SENTINEL;

    #[test]
    fn test_assemble_totals() {
        let candidate = TaskCandidate::new(
            "DRT2025080401VEC".to_string(),
            "2025-08-04 10:00".to_string(),
            TaskStatus::Done,
        );
        let mut aggregate = TrackingAggregate::new();
        aggregate.fold(&[
            ChildRecord::new("1257601721", "PH251249207501S"),
            ChildRecord::new("1257601721", "PH251249207502S"),
            ChildRecord::new("1310000005", "PH251249207503S"),
        ]);

        let record = assemble(&candidate, &aggregate);
        assert_eq!(record.task_id, "DRT2025080401VEC");
        assert_eq!(record.total_count, 3);
        assert_eq!(record.sender_count, 2);
        assert_eq!(record.sender_counts.get("1257601721"), Some(&2));
        assert!(!record.processed_at.is_empty());
    }

    #[test]
    fn test_assemble_no_data_sentinel() {
        let candidate = TaskCandidate::for_specific("DRT2025080402ABC");
        let aggregate = TrackingAggregate::new();

        let record = assemble(&candidate, &aggregate);
        // 零收获任务不是空记录，而是显式哨兵项
        assert_eq!(record.sender_counts.get(NO_DATA_SENTINEL), Some(&0));
        assert_eq!(record.total_count, 0);
        assert_eq!(record.sender_count, 1);
    }
}
