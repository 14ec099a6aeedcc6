//! 记录定位服务 - 业务能力层
//!
//! 面板的标记结构不稳定，所以不假设任何固定 DOM 形状：
//! 每种「可能的形状」写成一条声明式定位策略（容器查询 JS + 行解析函数），
//! 按固定优先级逐条尝试，**第一条产出有效记录的策略获胜**，
//! 绝不合并多条策略的结果（避免重叠匹配带来的重复抽取）。
//!
//! 其他约定：
//! - 策略内单行解析失败只跳过该行，不中止整批；
//! - 返回前按主键去重，先出现者保留，顺序稳定；
//! - 所有策略都没产出时返回空列表——这是正常结果（NotFound），不是错误。

use tracing::{debug, info, warn};

use crate::infrastructure::DomSurface;
use crate::models::{idents, ChildRecord, TaskCandidate};
use crate::services::status_classifier;

/// 声明式定位策略
///
/// `probe_js` 负责找到一组记录容器并把每条记录读成一行单元格文本；
/// `parse_row` 负责从一行里抽出并校验目标记录（校验失败返回 None）。
pub struct LocatorStrategy<T> {
    pub name: &'static str,
    pub probe_js: &'static str,
    pub parse_row: fn(&[String]) -> Option<T>,
}

/// 按策略链定位记录
///
/// 每条策略独立尝试：执行 JS 失败只算该策略失败，换下一条继续。
pub async fn locate<S: DomSurface, T>(
    surface: &S,
    strategies: &[LocatorStrategy<T>],
    key: fn(&T) -> &str,
) -> Vec<T> {
    for strategy in strategies {
        let rows: Vec<Vec<String>> = match surface.eval_as(strategy.probe_js.to_string()).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("策略 {} 执行失败，尝试下一条: {}", strategy.name, e);
                continue;
            }
        };

        debug!("策略 {} 找到 {} 行候选", strategy.name, rows.len());
        let records = parse_batch(&rows, strategy.parse_row, key);
        if !records.is_empty() {
            info!("✓ 策略 {} 命中 {} 条有效记录", strategy.name, records.len());
            return records;
        }
    }

    debug!("所有定位策略都没有产出有效记录");
    Vec::new()
}

/// 解析一批行：逐行解析（坏行跳过），再按主键稳定去重
pub fn parse_batch<T>(
    rows: &[Vec<String>],
    parse_row: fn(&[String]) -> Option<T>,
    key: fn(&T) -> &str,
) -> Vec<T> {
    let mut seen = std::collections::HashSet::new();
    let mut records = Vec::new();
    for row in rows {
        if let Some(record) = parse_row(row) {
            if seen.insert(key(&record).to_string()) {
                records.push(record);
            }
        }
    }
    records
}

// ========== 任务列表页的定位策略 ==========

/// 策略 1：标准表格行（每行的单元格文本 + 状态相关元素的 class 串）
const TASK_TABLE_JS: &str = r#"
/* probe:task-table */
(() => {
  const rows = Array.from(document.querySelectorAll('table tbody tr'));
  return rows.map(r => {
    const cells = Array.from(r.querySelectorAll('td')).map(c => c.innerText.trim());
    const hints = Array.from(
      r.querySelectorAll('[class*="status"],[class*="success"],[class*="fail"],[class*="pending"]')
    ).map(e => e.getAttribute('class') || '');
    return cells.concat(hints);
  });
})()
"#;

/// 策略 2：全文扫描含 DRT 的叶子节点，回溯到所在行
const TASK_TEXT_SCAN_JS: &str = r#"
/* probe:task-text-scan */
(() => {
  const out = [];
  const leaves = Array.from(document.querySelectorAll('body *'))
    .filter(e => e.childElementCount === 0 && e.textContent.includes('DRT'));
  for (const el of leaves) {
    const row = el.closest('tr');
    if (row) {
      out.push(Array.from(row.querySelectorAll('td')).map(c => c.innerText.trim()));
    } else if (el.parentElement) {
      out.push(Array.from(el.parentElement.children).map(c => c.textContent.trim()));
    } else {
      out.push([el.textContent.trim()]);
    }
  }
  return out;
})()
"#;

/// 从一行单元格解析任务候选
///
/// 主键必须通过任务编号格式校验；完成时间拿不到时记 "unknown"；
/// 状态由该行全部信号分类得出。
fn parse_task_row(cells: &[String]) -> Option<TaskCandidate> {
    let task_id = cells
        .iter()
        .map(|c| c.trim())
        .find(|c| idents::is_task_id(c))?
        .to_string();

    let complete_time = cells
        .iter()
        .map(|c| c.trim())
        .find(|c| looks_like_time(c))
        .unwrap_or("unknown")
        .to_string();

    let status = status_classifier::classify(cells);

    Some(TaskCandidate::new(task_id, complete_time, status))
}

/// 粗略判断一个单元格是不是时间（日期串或带冒号的时刻）
fn looks_like_time(cell: &str) -> bool {
    let has_date = cell.len() >= 7
        && cell
            .as_bytes()
            .windows(5)
            .any(|w| w[..4].iter().all(|b| b.is_ascii_digit()) && w[4] == b'-');
    let has_clock = cell.contains(':') && cell.chars().any(|c| c.is_ascii_digit());
    has_date || has_clock
}

/// 任务列表页的策略链（固定优先级）
pub const TASK_STRATEGIES: &[LocatorStrategy<TaskCandidate>] = &[
    LocatorStrategy {
        name: "task-table",
        probe_js: TASK_TABLE_JS,
        parse_row: parse_task_row,
    },
    LocatorStrategy {
        name: "task-text-scan",
        probe_js: TASK_TEXT_SCAN_JS,
        parse_row: parse_task_row,
    },
];

/// 定位当前列表页上的任务候选
pub async fn locate_task_candidates<S: DomSurface>(surface: &S) -> Vec<TaskCandidate> {
    locate(surface, TASK_STRATEGIES, |c| &c.task_id).await
}

// ========== 任务详情页的定位策略 ==========

/// 策略 1：标准表格行，按固定列位取值（第 1 列发件人，第 3 列运单号）
const TRACKING_TABLE_JS: &str = r#"
/* probe:tracking-table */
(() => {
  const rows = Array.from(document.querySelectorAll('table tbody tr'));
  return rows.map(r => Array.from(r.querySelectorAll('td')).map(c => c.innerText.trim()));
})()
"#;

/// 策略 2：全文扫描含 PH 的叶子节点，回溯到所在行
const TRACKING_TEXT_SCAN_JS: &str = r#"
/* probe:tracking-text-scan */
(() => {
  const out = [];
  const leaves = Array.from(document.querySelectorAll('body *'))
    .filter(e => e.childElementCount === 0 && /PH\d{8,}/.test(e.textContent));
  for (const el of leaves) {
    const row = el.closest('tr');
    if (row) {
      out.push(Array.from(row.querySelectorAll('td')).map(c => c.innerText.trim()));
    } else {
      out.push([el.textContent.trim()]);
    }
  }
  return out;
})()
"#;

/// 找不到发件人时的兜底桶
pub const UNKNOWN_SENDER: &str = "UNKNOWN_SENDER";

/// 按固定列位解析（严格：两个字段都必须通过格式校验）
fn parse_tracking_row_by_column(cells: &[String]) -> Option<ChildRecord> {
    if cells.len() < 3 {
        return None;
    }
    let sender = cells[0].trim();
    let tracking = cells[2].trim();
    if idents::is_sender_id(sender) && idents::is_tracking_no(tracking) {
        Some(ChildRecord::new(sender, tracking))
    } else {
        None
    }
}

/// 宽松解析：在整行文本里找运单号和发件人 ID
///
/// 发件人找不到时归入 UNKNOWN_SENDER，运单号本身仍必须通过校验。
fn parse_tracking_row_loose(cells: &[String]) -> Option<ChildRecord> {
    let joined = cells.join(" ");
    let tracking = idents::find_tracking_nos(&joined).into_iter().next()?;
    let sender = cells
        .iter()
        .map(|c| c.trim())
        .find(|c| idents::is_sender_id(c))
        .map(str::to_string)
        .or_else(|| idents::find_sender_id(&joined))
        .unwrap_or_else(|| UNKNOWN_SENDER.to_string());
    Some(ChildRecord::new(sender, tracking))
}

/// 任务详情页的策略链（固定优先级）
pub const TRACKING_STRATEGIES: &[LocatorStrategy<ChildRecord>] = &[
    LocatorStrategy {
        name: "tracking-table",
        probe_js: TRACKING_TABLE_JS,
        parse_row: parse_tracking_row_by_column,
    },
    LocatorStrategy {
        name: "tracking-text-scan",
        probe_js: TRACKING_TEXT_SCAN_JS,
        parse_row: parse_tracking_row_loose,
    },
];

/// 定位当前详情页上的运单记录
pub async fn locate_tracking_records<S: DomSurface>(surface: &S) -> Vec<ChildRecord> {
    locate(surface, TRACKING_STRATEGIES, |r| &r.tracking_no).await
}
