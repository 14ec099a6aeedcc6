//! 单任务审计流程 - 工作流层
//!
//! 职责：
//! 1. 打开任务详情页并等待内容就绪
//! 2. 逐页抽取 (发件人, 运单号) 子记录，折叠进聚合桶
//! 3. 翻页直到没有更多页
//! 4. 组装最终审计记录
//!
//! 失败语义：
//! - 详情页打不开是致命错误，向上抛，由编排层决定跳过还是熔断；
//! - 某一页抽取为空只记 WARN，继续翻页（别的页可能还有数据）。

use anyhow::Result;
use tracing::{info, warn};

use crate::infrastructure::DomSurface;
use crate::models::{AuditRecord, TaskCandidate};
use crate::services::aggregator::TrackingAggregate;
use crate::services::audit_assembler;
use crate::services::pagination::{PagerState, PaginationWalker};
use crate::services::record_locator::locate_tracking_records;
use crate::workflow::task_ctx::TaskCtx;

/// 单任务审计流程
pub struct TaskFlow {
    walker: PaginationWalker,
}

impl TaskFlow {
    pub fn new(max_pages: u32, wait_timeout_secs: u64) -> Self {
        Self {
            walker: PaginationWalker::new(max_pages, wait_timeout_secs),
        }
    }

    /// 跑完一个任务的详情页抽取，返回审计记录
    pub async fn run<S: DomSurface>(
        &self,
        surface: &S,
        candidate: &TaskCandidate,
        ctx: &TaskCtx,
    ) -> Result<AuditRecord> {
        info!("[任务 {}] 🔍 开始审计: {}", ctx.task_index, ctx.task_id);

        // 详情页打不开没有降级余地，直接向上抛
        surface.goto(&ctx.detail_url).await?;
        if !self.walker.wait_for_content(surface).await {
            warn!(
                "[任务 {}] ⚠️ 详情页内容迟迟未就绪，按当前状态继续抽取",
                ctx.task_index
            );
        }

        let mut aggregate = TrackingAggregate::new();
        let mut pages_seen: u32 = 1;

        loop {
            let batch = locate_tracking_records(surface).await;
            if batch.is_empty() {
                warn!(
                    "[任务 {}] ⚠️ 第 {} 页没有抽到任何子记录",
                    ctx.task_index, pages_seen
                );
            } else {
                info!(
                    "[任务 {}] 第 {} 页抽到 {} 条子记录",
                    ctx.task_index,
                    pages_seen,
                    batch.len()
                );
                aggregate.fold(&batch);
            }

            match self.walker.advance(surface, pages_seen).await {
                PagerState::Exhausted => break,
                _ => pages_seen += 1,
            }
        }

        let record = audit_assembler::assemble(candidate, &aggregate);
        info!(
            "[任务 {}] ✅ 完成: {} 页, {} 个发件人, {} 条运单{}",
            ctx.task_index,
            pages_seen,
            record.sender_count,
            record.total_count,
            if aggregate.conflicts() > 0 {
                format!(" ({} 次归属冲突)", aggregate.conflicts())
            } else {
                String::new()
            }
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 假详情页：两页子记录，第二页与第一页有一条重叠
    struct TwoPageDetailDom {
        page: AtomicUsize,
    }

    impl TwoPageDetailDom {
        fn new() -> Self {
            Self {
                page: AtomicUsize::new(0),
            }
        }
    }

    impl DomSurface for TwoPageDetailDom {
        async fn goto(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn eval(&self, js_code: String) -> Result<serde_json::Value> {
            if js_code.contains("probe:ready") {
                return Ok(serde_json::json!(true));
            }
            if js_code.contains("probe:tracking-table") {
                let rows = if self.page.load(Ordering::SeqCst) == 0 {
                    serde_json::json!([
                        ["1257601721", "x", "PH251249207501S"],
                        ["1257601721", "x", "PH251249207502S"],
                        ["1310000005", "x", "PH251249207503S"]
                    ])
                } else {
                    serde_json::json!([
                        ["1257601721", "x", "PH251249207502S"],
                        ["1257601721", "x", "PH251249207504S"]
                    ])
                };
                return Ok(rows);
            }
            if js_code.contains("probe:tracking-text-scan") {
                return Ok(serde_json::json!([]));
            }
            if js_code.contains("probe:pager") {
                let on_first = self.page.load(Ordering::SeqCst) == 0;
                return Ok(serde_json::json!({
                    "marks": [
                        { "text": "1", "cls": if on_first { "pager-item active" } else { "pager-item" } },
                        { "text": "2", "cls": if on_first { "pager-item" } else { "pager-item active" } }
                    ],
                    "totals": [],
                    "per_page": [],
                    "next_enabled": on_first
                }));
            }
            if js_code.contains("act:click-page") || js_code.contains("act:click-next") {
                self.page.store(1, Ordering::SeqCst);
                return Ok(serde_json::json!(true));
            }
            Ok(serde_json::json!(false))
        }

        async fn location(&self) -> Result<(String, String)> {
            Ok((String::new(), String::new()))
        }
    }

    #[tokio::test]
    async fn test_two_page_detail_dedups_across_pages() {
        let dom = TwoPageDetailDom::new();
        let flow = TaskFlow::new(50, 1);
        let candidate = TaskCandidate::new(
            "DRT2025080401VEC".to_string(),
            "2025-08-04 10:00".to_string(),
            TaskStatus::Done,
        );
        let ctx = TaskCtx::new("DRT2025080401VEC", 1, "https://example.test/detail");

        let record = flow.run(&dom, &candidate, &ctx).await.unwrap();
        // 两页共 5 行，PH...02S 重复，去重后 4 条
        assert_eq!(record.total_count, 4);
        assert_eq!(record.sender_count, 2);
        assert_eq!(record.sender_counts.get("1257601721"), Some(&3));
        assert_eq!(record.sender_counts.get("1310000005"), Some(&1));
    }
}
