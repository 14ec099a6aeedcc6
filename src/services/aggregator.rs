//! 聚合引擎 - 业务能力层
//!
//! 把详情页抽到的 (发件人, 运单号) 记录折叠进任务级的聚合桶，
//! 跨页全局去重，最后读出每个发件人的运单数。
//!
//! 桶本身就是全部状态：跨页折叠只是对每页的记录批重复调用
//! [`TrackingAggregate::fold`]，引擎不携带任何页边界信息。

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::warn;

use crate::models::ChildRecord;

/// 零收获哨兵：整个任务一条记录都没抽到时，计数表写成 `{"NO_DATA": 0}`，
/// 让下游能区分「任务确实为空」和「抽取悄悄失败」
pub const NO_DATA_SENTINEL: &str = "NO_DATA";

/// 任务级聚合桶：发件人 ID → 运单号集合
///
/// 不变式：
/// - 同一发件人下同一运单号跨页出现多次，只计一次；
/// - 同一运单号出现在两个发件人名下是数据不一致，记 WARN 日志，
///   按先写者优先保留，不做业务猜测。
#[derive(Debug, Default, Clone)]
pub struct TrackingAggregate {
    buckets: BTreeMap<String, BTreeSet<String>>,
    /// 运单号 → 第一次见到它时的发件人
    owners: HashMap<String, String>,
    conflicts: usize,
}

impl TrackingAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把一批子记录折叠进桶（幂等）
    pub fn fold(&mut self, records: &[ChildRecord]) {
        for record in records {
            self.insert(record);
        }
    }

    fn insert(&mut self, record: &ChildRecord) {
        match self.owners.get(&record.tracking_no) {
            // 换了发件人：数据不一致，先写者优先
            Some(owner) if owner != &record.sender_id => {
                warn!(
                    "⚠️ 运单号 {} 同时出现在发件人 {} 和 {} 名下，保留先出现的归属",
                    record.tracking_no, owner, record.sender_id
                );
                self.conflicts += 1;
            }
            // 同发件人重复出现：无操作
            Some(_) => {}
            None => {
                self.owners
                    .insert(record.tracking_no.clone(), record.sender_id.clone());
                self.buckets
                    .entry(record.sender_id.clone())
                    .or_default()
                    .insert(record.tracking_no.clone());
            }
        }
    }

    /// 读出每个发件人的运单数；空桶时返回 NO_DATA 哨兵项
    pub fn read_counts(&self) -> BTreeMap<String, usize> {
        if self.buckets.is_empty() {
            let mut sentinel = BTreeMap::new();
            sentinel.insert(NO_DATA_SENTINEL.to_string(), 0);
            return sentinel;
        }
        self.buckets
            .iter()
            .map(|(sender, trackings)| (sender.clone(), trackings.len()))
            .collect()
    }

    /// 全局去重后的运单总数
    pub fn distinct_total(&self) -> usize {
        self.owners.len()
    }

    /// 观测到的归属冲突次数
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(sender: &str, tracking: &str) -> ChildRecord {
        ChildRecord::new(sender, tracking)
    }

    #[test]
    fn test_fold_is_idempotent() {
        let batch = vec![rec("1257601721", "PH251249207501S"), rec("1257601721", "PH251249207502S")];

        let mut once = TrackingAggregate::new();
        once.fold(&batch);

        let mut twice = TrackingAggregate::new();
        twice.fold(&batch);
        twice.fold(&batch);

        assert_eq!(once.read_counts(), twice.read_counts());
        assert_eq!(twice.distinct_total(), 2);
    }

    #[test]
    fn test_cross_page_dedup_invariant() {
        let mut bucket = TrackingAggregate::new();
        // 第 1 页
        bucket.fold(&[
            rec("1257601721", "PH251249207501S"),
            rec("1257601721", "PH251249207502S"),
            rec("1310000005", "PH251249207503S"),
        ]);
        // 第 2 页：t2 重复出现，t4 新增
        bucket.fold(&[
            rec("1257601721", "PH251249207502S"),
            rec("1257601721", "PH251249207504S"),
        ]);

        let counts = bucket.read_counts();
        assert_eq!(counts.get("1257601721"), Some(&3));
        assert_eq!(counts.get("1310000005"), Some(&1));
        // 去重不变式：计数之和 == 去重后的运单总数
        assert_eq!(counts.values().sum::<usize>(), bucket.distinct_total());
    }

    #[test]
    fn test_conflicting_owner_keeps_first_writer() {
        let mut bucket = TrackingAggregate::new();
        bucket.fold(&[rec("1257601721", "PH251249207501S")]);
        bucket.fold(&[rec("1310000005", "PH251249207501S")]);

        let counts = bucket.read_counts();
        assert_eq!(counts.get("1257601721"), Some(&1));
        assert_eq!(counts.get("1310000005"), None);
        assert_eq!(bucket.conflicts(), 1);
        // 冲突的运单只计一次
        assert_eq!(bucket.distinct_total(), 1);
    }

    #[test]
    fn test_empty_bucket_yields_no_data_sentinel() {
        let bucket = TrackingAggregate::new();
        let counts = bucket.read_counts();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(NO_DATA_SENTINEL), Some(&0));
    }
}
