//! 任务列表扫描 - 编排层
//!
//! 逐页扫描收件任务列表，收集「已完成」的任务候选；
//! 非完成状态的任务记入跳过清单（带原状态），列表跨页去重。

use std::collections::HashSet;

use tracing::{info, warn};

use crate::infrastructure::DomSurface;
use crate::models::TaskCandidate;
use crate::services::pagination::{PagerState, PaginationWalker};
use crate::services::record_locator::locate_task_candidates;

/// 一次列表扫描的产出
#[derive(Debug, Default)]
pub struct ListScanOutcome {
    /// 留下来要审计的任务（状态为已完成）
    pub retained: Vec<TaskCandidate>,
    /// 因状态不是已完成而跳过的任务
    pub skipped: Vec<TaskCandidate>,
    /// 实际扫描的页数
    pub pages_scanned: u32,
}

/// 扫完整个任务列表
///
/// `max_tasks` 只约束留下来的任务数，凑够即提前停扫。
pub async fn scan_task_list<S: DomSurface>(
    surface: &S,
    walker: &PaginationWalker,
    max_tasks: Option<usize>,
) -> ListScanOutcome {
    let mut outcome = ListScanOutcome::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut pages_seen: u32 = 1;

    loop {
        let candidates = locate_task_candidates(surface).await;
        if candidates.is_empty() {
            warn!("⚠️ 任务列表第 {} 页没有识别到任何任务", pages_seen);
        }

        for candidate in candidates {
            // 跨页去重：同一任务在翻页时可能重复出现
            if !seen.insert(candidate.task_id.clone()) {
                continue;
            }
            if candidate.status.is_done() {
                outcome.retained.push(candidate);
            } else {
                info!(
                    "⏭️ 跳过任务 {} (状态: {})",
                    candidate.task_id, candidate.status
                );
                outcome.skipped.push(candidate);
            }
        }

        if let Some(cap) = max_tasks {
            if outcome.retained.len() >= cap {
                outcome.retained.truncate(cap);
                info!("已凑够 {} 个任务，停止扫描列表", cap);
                break;
            }
        }

        match walker.advance(surface, pages_seen).await {
            PagerState::Exhausted => break,
            _ => pages_seen += 1,
        }
    }

    outcome.pages_scanned = pages_seen;
    info!(
        "📋 列表扫描完成: {} 页, 保留 {} 个, 跳过 {} 个",
        outcome.pages_scanned,
        outcome.retained.len(),
        outcome.skipped.len()
    );
    outcome
}
