//! 应用编排 - 编排层
//!
//! 职责：
//! 1. 连接浏览器、打开首页、等操作员完成登录
//! 2. 扫描任务列表（或按指定任务构造候选）
//! 3. 顺序跑每个任务的审计流程，节流、容错、熔断
//! 4. 导出结果并打印运行总结
//!
//! 中断语义：Ctrl+C 不丢已完成的记录，剩余任务记为未处理并照常导出。

use std::time::Duration;

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::browser::connect_to_browser_and_page;
use crate::config::Config;
use crate::infrastructure::{DomSurface, PageProbe};
use crate::models::{AuditRecord, TaskCandidate};
use crate::orchestrator::list_scanner::{scan_task_list, ListScanOutcome};
use crate::services::exporter::Exporter;
use crate::services::operator_gate::{ConsoleGate, OperatorGate};
use crate::services::pagination::PaginationWalker;
use crate::utils::logging;
use crate::workflow::{TaskCtx, TaskFlow};

/// 一轮运行的统计
#[derive(Debug, Default)]
pub struct RunStats {
    pub tasks_planned: usize,
    pub tasks_succeeded: usize,
    pub tasks_failed: usize,
    /// 被 Ctrl+C 或熔断打断
    pub interrupted: bool,
}

/// 一轮运行的完整产出
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub records: Vec<AuditRecord>,
    pub skipped: Vec<TaskCandidate>,
    pub stats: RunStats,
}

/// 跑完整轮审计（不含浏览器连接和导出，便于注入假页面测试）
pub async fn run_audit<S: DomSurface, G: OperatorGate>(
    surface: &S,
    gate: &G,
    config: &Config,
) -> Result<RunOutcome> {
    let walker = PaginationWalker::new(config.max_pages, config.wait_timeout_secs);
    let flow = TaskFlow::new(config.max_pages, config.wait_timeout_secs);

    // 登录闸门：自动化在这里停下来等人
    surface.goto(&config.homepage_url).await?;
    gate.wait_for_confirmation("🔑 请在浏览器中完成 SPX 面板登录").await?;

    info!("🌐 打开收件任务列表: {}", config.receive_task_url);
    surface.goto(&config.receive_task_url).await?;
    if !walker.wait_for_content(surface).await {
        warn!("⚠️ 任务列表内容迟迟未就绪，按当前状态继续");
    }

    // 指定任务模式：不扫列表，直接构造候选
    let scan = match &config.specific_task {
        Some(task_id) => {
            info!("🎯 指定任务模式: {}", task_id);
            ListScanOutcome {
                retained: vec![TaskCandidate::for_specific(task_id)],
                ..Default::default()
            }
        }
        None => scan_task_list(surface, &walker, config.max_tasks).await,
    };

    let mut outcome = RunOutcome {
        skipped: scan.skipped,
        stats: RunStats {
            tasks_planned: scan.retained.len(),
            ..Default::default()
        },
        ..Default::default()
    };

    let throttle = Duration::from_millis(config.min_request_interval_ms);
    let mut consecutive_failures: usize = 0;

    for (index, candidate) in scan.retained.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(throttle).await;
        }

        let ctx = TaskCtx::new(&candidate.task_id, index + 1, config.detail_url(&candidate.task_id));

        let result = tokio::select! {
            result = flow.run(surface, candidate, &ctx) => result,
            _ = tokio::signal::ctrl_c() => {
                warn!("🛑 收到中断信号，保留已完成的 {} 条记录", outcome.records.len());
                outcome.stats.interrupted = true;
                break;
            }
        };

        match result {
            Ok(record) => {
                outcome.records.push(record);
                outcome.stats.tasks_succeeded += 1;
                consecutive_failures = 0;
            }
            Err(e) => {
                error!("[任务 {}] ❌ 审计失败: {}", index + 1, e);
                outcome.stats.tasks_failed += 1;
                consecutive_failures += 1;
                if consecutive_failures >= config.max_consecutive_failures {
                    error!(
                        "🛑 连续 {} 个任务失败，触发熔断，停止本轮运行",
                        consecutive_failures
                    );
                    outcome.stats.interrupted = true;
                    break;
                }
            }
        }
    }

    Ok(outcome)
}

/// 应用：持有浏览器会话，把「连接 → 审计 → 导出」串成一次运行
pub struct App {
    config: Config,
    // 会话期间必须持有 Browser，否则 CDP 连接被提前释放
    _browser: Browser,
    probe: PageProbe,
}

impl App {
    /// 连接调试端口上的浏览器并定位工作页面
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::banner("SPX 收件任务审计");
        let (browser, page) = connect_to_browser_and_page(
            config.browser_debug_port,
            &config.homepage_url,
        )
        .await?;
        Ok(Self {
            config,
            _browser: browser,
            probe: PageProbe::new(page),
        })
    }

    /// 跑完整轮审计并导出
    pub async fn run(&self) -> Result<()> {
        let outcome = run_audit(&self.probe, &ConsoleGate, &self.config).await?;

        let mut files = Vec::new();
        if outcome.records.is_empty() && outcome.skipped.is_empty() {
            warn!("本轮没有任何任务被处理，跳过导出");
        } else {
            let exporter = Exporter::new(&self.config.output_dir);
            files = exporter.export_all(&outcome.records).await?;
        }

        self.print_summary(&outcome, &files);
        Ok(())
    }

    fn print_summary(&self, outcome: &RunOutcome, files: &[std::path::PathBuf]) {
        logging::banner("运行总结");
        info!("计划处理: {} 个任务", outcome.stats.tasks_planned);
        info!("成功: {} 个", outcome.stats.tasks_succeeded);
        info!("失败: {} 个", outcome.stats.tasks_failed);
        info!("状态不符跳过: {} 个", outcome.skipped.len());
        for skipped in outcome.skipped.iter().take(10) {
            info!("  ⏭️ {} ({})", skipped.task_id, skipped.status);
        }
        if outcome.skipped.len() > 10 {
            info!("  ... 另有 {} 个未列出", outcome.skipped.len() - 10);
        }

        let total_trackings: usize = outcome.records.iter().map(|r| r.total_count).sum();
        let total_senders: usize = outcome.records.iter().map(|r| r.sender_count).sum();
        info!("共计 {} 条运单记录, {} 个发件人条目", total_trackings, total_senders);

        for file in files {
            info!("📄 {}", file.display());
        }
        if outcome.stats.interrupted {
            warn!("本轮被提前中断，以上为部分结果");
        }
    }
}
