//! 导出服务 - 业务能力层
//!
//! 输出契约：
//! - JSON：完整审计记录列表；
//! - 明细 CSV：每个 (任务, 发件人) 一行；
//! - 任务汇总 CSV：每个任务一行；
//! - 发件人合计 CSV：跨任务按发件人累计（不含 NO_DATA 哨兵项）。
//!
//! 文件名带时间戳，全部落在配置的输出目录下。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::error::AuditError;
use crate::models::AuditRecord;
use crate::services::aggregator::NO_DATA_SENTINEL;

/// 导出服务
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// 按全部格式导出，返回生成的文件列表
    pub async fn export_all(&self, records: &[AuditRecord]) -> Result<Vec<PathBuf>> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let mut written = Vec::new();

        let json_path = self.output_dir.join(format!("spx_audit_{}.json", stamp));
        self.write(&json_path, &to_json(records)?).await?;
        written.push(json_path);

        let detail_path = self
            .output_dir
            .join(format!("spx_audit_detail_{}.csv", stamp));
        self.write(&detail_path, &detail_csv(records)).await?;
        written.push(detail_path);

        let summary_path = self
            .output_dir
            .join(format!("spx_audit_summary_{}.csv", stamp));
        self.write(&summary_path, &summary_csv(records)).await?;
        written.push(summary_path);

        let totals_path = self
            .output_dir
            .join(format!("spx_audit_sender_totals_{}.csv", stamp));
        self.write(&totals_path, &sender_totals_csv(records)).await?;
        written.push(totals_path);

        info!("📁 已导出 {} 个文件到 {}", written.len(), self.output_dir.display());
        Ok(written)
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        tokio::fs::write(path, content)
            .await
            .map_err(|e| AuditError::export_write_failed(path.display().to_string(), e))?;
        info!("✓ 已写入: {}", path.display());
        Ok(())
    }
}

// ========== 纯格式化函数 ==========

fn to_json(records: &[AuditRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// 简易 CSV 字段转义：含逗号/引号/换行时加引号
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// 明细视图：每个 (任务, 发件人) 一行
pub fn detail_csv(records: &[AuditRecord]) -> String {
    let mut out = String::from(
        "receive_task_id,complete_time,status,sender_id,tracking_count,total_task_quantity,sender_count,processed_at\n",
    );
    for record in records {
        for (sender_id, count) in &record.sender_counts {
            out.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                csv_field(&record.task_id),
                csv_field(&record.complete_time),
                record.status,
                csv_field(sender_id),
                count,
                record.total_count,
                record.sender_count,
                csv_field(&record.processed_at),
            ));
        }
    }
    out
}

/// 任务汇总视图：每个任务一行
pub fn summary_csv(records: &[AuditRecord]) -> String {
    let mut out = String::from(
        "receive_task_id,complete_time,status,total_senders,total_tracking_numbers,processed_at\n",
    );
    for record in records {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            csv_field(&record.task_id),
            csv_field(&record.complete_time),
            record.status,
            record.sender_count,
            record.total_count,
            csv_field(&record.processed_at),
        ));
    }
    out
}

/// 发件人合计视图：跨任务累计每个发件人的运单数
pub fn sender_totals_csv(records: &[AuditRecord]) -> String {
    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        for (sender_id, count) in &record.sender_counts {
            // 哨兵项只在单任务记录里有意义，不进合计
            if sender_id != NO_DATA_SENTINEL {
                *totals.entry(sender_id.as_str()).or_default() += count;
            }
        }
    }

    let mut out = String::from("sender_id,total_tracking_numbers\n");
    for (sender_id, total) in totals {
        out.push_str(&format!("{},{}\n", csv_field(sender_id), total));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    fn record(task_id: &str, counts: &[(&str, usize)]) -> AuditRecord {
        let sender_counts: BTreeMap<String, usize> = counts
            .iter()
            .map(|(s, c)| (s.to_string(), *c))
            .collect();
        AuditRecord {
            task_id: task_id.to_string(),
            complete_time: "2025-08-04 10:00".to_string(),
            status: TaskStatus::Done,
            total_count: sender_counts.values().sum(),
            sender_count: sender_counts.len(),
            sender_counts,
            processed_at: "2025-08-04T12:00:00+08:00".to_string(),
        }
    }

    #[test]
    fn test_detail_csv_one_row_per_task_sender_pair() {
        let records = vec![
            record("DRT2025080401AAA", &[("1257601721", 3), ("1310000005", 1)]),
            record("DRT2025080402BBB", &[("1257601721", 2)]),
        ];
        let csv = detail_csv(&records);
        let lines: Vec<&str> = csv.lines().collect();
        // 表头 + 3 个 (任务, 发件人) 对
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("DRT2025080401AAA,2025-08-04 10:00,Done,1257601721,3,4,2"));
        assert!(lines[3].starts_with("DRT2025080402BBB,2025-08-04 10:00,Done,1257601721,2,2,1"));
    }

    #[test]
    fn test_summary_csv_one_row_per_task() {
        let records = vec![record("DRT2025080401AAA", &[("1257601721", 3), ("1310000005", 1)])];
        let csv = summary_csv(&records);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("DRT2025080401AAA"));
        assert!(lines[1].contains(",2,4,"));
    }

    #[test]
    fn test_sender_totals_accumulate_across_tasks() {
        let records = vec![
            record("DRT2025080401AAA", &[("1257601721", 3)]),
            record("DRT2025080402BBB", &[("1257601721", 2), ("1310000005", 1)]),
            record("DRT2025080403CCC", &[(NO_DATA_SENTINEL, 0)]),
        ];
        let csv = sender_totals_csv(&records);
        assert!(csv.contains("1257601721,5\n"));
        assert!(csv.contains("1310000005,1\n"));
        // 哨兵项不进合计视图
        assert!(!csv.contains(NO_DATA_SENTINEL));
    }

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
