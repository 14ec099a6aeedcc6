//! 翻页服务 - 业务能力层
//!
//! 状态机：Scanning（本页已收割）→ Advancing（尝试去下一页）→ Exhausted（终止）。
//! 当前页/总页数每次都重新探测，不做持久化。
//!
//! Advancing 的解析顺序（每条独立尝试，第一条成功者生效）：
//! 1. 分页控件有显式页码标记 → 读 (current, total)，目标 current+1；
//! 2. 页面给出 "Total N" 和 "x / Page" → 向上取整算总页数；
//! 3. 只剩单步「下一页」按钮 → 仅在它没被禁用时使用。
//!
//! 三条都失败、或 current >= total 时进入 Exhausted；
//! 安全上限（默认 50 页）无条件强制终止，防止分页信号损坏导致死循环。

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::infrastructure::DomSurface;

/// 没有 "x / Page" 信号时按 SPX 默认每页条数算
const DEFAULT_ITEMS_PER_PAGE: u32 = 24;

/// 页游标（瞬时值，每次探测重新计算）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub current: u32,
    pub total: Option<u32>,
}

/// 翻页状态机的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    /// 当前页正在（或已经）收割
    Scanning,
    /// 正在尝试去下一页
    Advancing,
    /// 终止：没有更多页
    Exhausted,
}

/// 分页控件的一次快照（由探测 JS 产出）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagerSnapshot {
    /// 页码标记（文本 + class 串）
    pub marks: Vec<PagerMark>,
    /// 含 "Total N" 的文本
    pub totals: Vec<String>,
    /// 含 "x / Page" 的文本
    pub per_page: Vec<String>,
    /// 单步「下一页」按钮是否可用
    pub next_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagerMark {
    pub text: String,
    pub cls: String,
}

/// 游标读取结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorReading {
    /// 策略 1/2：读到了明确的 (current, total)
    Explicit(PageCursor),
    /// 策略 3：只知道「下一页」按钮可用
    NextAvailable,
    /// 什么信号都没有
    Exhausted,
}

/// 前进决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePlan {
    /// 跳到指定页码
    Target(u32),
    /// 单步点「下一页」
    NextStep,
    /// 不再前进
    Stop,
}

// ========== 纯决策函数（可独立测试） ==========

fn total_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Total\s+(\d+)").expect("Total 正则非法"))
}

fn per_page_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*/\s*Page").expect("每页条数正则非法"))
}

/// 从快照读出页游标（按固定优先级）
pub fn read_cursor(snapshot: &PagerSnapshot) -> CursorReading {
    // 策略 1：显式页码标记
    let active = snapshot
        .marks
        .iter()
        .find(|m| m.cls.contains("active"))
        .and_then(|m| m.text.trim().parse::<u32>().ok());
    let max_mark = snapshot
        .marks
        .iter()
        .filter(|m| !m.cls.contains("fast-move"))
        .filter_map(|m| m.text.trim().parse::<u32>().ok())
        .max();
    if let (Some(current), Some(max)) = (active, max_mark) {
        return CursorReading::Explicit(PageCursor {
            current,
            total: Some(max.max(current)),
        });
    }

    // 策略 2：从 "Total N" + "x / Page" 推导总页数
    let total_items = snapshot
        .totals
        .iter()
        .find_map(|t| total_re().captures(t))
        .and_then(|cap| cap[1].parse::<u32>().ok());
    if let Some(items) = total_items {
        let per_page = snapshot
            .per_page
            .iter()
            .find_map(|t| per_page_re().captures(t))
            .and_then(|cap| cap[1].parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_ITEMS_PER_PAGE);
        let total_pages = items.div_ceil(per_page).max(1);
        return CursorReading::Explicit(PageCursor {
            current: active.unwrap_or(1),
            total: Some(total_pages),
        });
    }

    // 策略 3：只剩「下一页」按钮
    if snapshot.next_enabled {
        return CursorReading::NextAvailable;
    }

    CursorReading::Exhausted
}

/// 决定是否前进、怎么前进
///
/// `pages_seen` 是本轮已经处理过的页数；达到安全上限时无条件停。
pub fn plan_advance(reading: &CursorReading, pages_seen: u32, max_pages: u32) -> AdvancePlan {
    if pages_seen >= max_pages {
        return AdvancePlan::Stop;
    }
    match reading {
        CursorReading::Explicit(cursor) => match cursor.total {
            Some(total) if cursor.current >= total => AdvancePlan::Stop,
            _ => AdvancePlan::Target(cursor.current + 1),
        },
        CursorReading::NextAvailable => AdvancePlan::NextStep,
        CursorReading::Exhausted => AdvancePlan::Stop,
    }
}

// ========== 页面探测 / 动作 JS ==========

const PAGER_PROBE_JS: &str = r#"
/* probe:pager */
(() => {
  const items = Array.from(document.querySelectorAll('li[class*="pager-item"]'));
  const marks = items.map(e => ({ text: e.innerText.trim(), cls: e.getAttribute('class') || '' }));
  const texts = Array.from(document.querySelectorAll('body *'))
    .filter(e => e.childElementCount === 0)
    .map(e => e.textContent.trim());
  const totals = texts.filter(t => /Total\s+\d+/.test(t));
  const per_page = texts.filter(t => /\d+\s*\/\s*Page/.test(t));
  const next = document.querySelector('span[class*="pager-next"]');
  const next_enabled = !!next && !((next.getAttribute('class') || '').includes('disabled'));
  return { marks, totals, per_page, next_enabled };
})()
"#;

const CLICK_PAGE_JS: &str = r#"
/* act:click-page */
(() => {
  const items = Array.from(document.querySelectorAll('li[class*="pager-item"]'))
    .filter(e => !((e.getAttribute('class') || '').includes('fast-move')));
  const target = items.find(e => e.innerText.trim() === '__TARGET__');
  if (target) { target.click(); return true; }
  return false;
})()
"#;

const CLICK_NEXT_JS: &str = r#"
/* act:click-next */
(() => {
  const next = document.querySelector('span[class*="pager-next"]');
  if (next && !((next.getAttribute('class') || '').includes('disabled'))) {
    next.click();
    return true;
  }
  return false;
})()
"#;

const JUMPER_JS: &str = r#"
/* act:jump-input */
(() => {
  const input = document.querySelector('input[class*="jumper-input"]');
  const button = document.querySelector('button[class*="jumper-button"]');
  if (!input || !button) return false;
  const setter = Object.getOwnPropertyDescriptor(window.HTMLInputElement.prototype, 'value').set;
  setter.call(input, '__TARGET__');
  input.dispatchEvent(new Event('input', { bubbles: true }));
  button.click();
  return true;
})()
"#;

const CONTENT_READY_JS: &str = r#"
/* probe:ready */
(() => document.readyState === 'complete'
  && (document.querySelectorAll('table tbody tr').length > 0
      || document.querySelectorAll('li[class*="pager-item"]').length > 0))()
"#;

// ========== 翻页器 ==========

/// 翻页器：读游标、执行前进、等待新页内容
pub struct PaginationWalker {
    max_pages: u32,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl PaginationWalker {
    pub fn new(max_pages: u32, wait_timeout_secs: u64) -> Self {
        Self {
            max_pages,
            wait_timeout: Duration::from_secs(wait_timeout_secs),
            poll_interval: Duration::from_millis(300),
        }
    }

    /// 探测当前分页控件并读出游标
    pub async fn probe_cursor<S: DomSurface>(&self, surface: &S) -> CursorReading {
        match surface.eval_as::<PagerSnapshot>(PAGER_PROBE_JS.to_string()).await {
            Ok(snapshot) => read_cursor(&snapshot),
            Err(e) => {
                warn!("分页控件探测失败，按无更多页处理: {}", e);
                CursorReading::Exhausted
            }
        }
    }

    /// 尝试前进到下一页
    ///
    /// 返回 `Scanning` 表示已经站在新页上（内容确认加载完），
    /// 返回 `Exhausted` 表示没有下一页或前进失败。
    pub async fn advance<S: DomSurface>(&self, surface: &S, pages_seen: u32) -> PagerState {
        let reading = self.probe_cursor(surface).await;
        let plan = plan_advance(&reading, pages_seen, self.max_pages);
        debug!("翻页决策: {:?} (已处理 {} 页)", plan, pages_seen);

        let clicked = match plan {
            AdvancePlan::Stop => {
                if pages_seen >= self.max_pages {
                    warn!("⚠️ 达到安全页数上限 ({} 页)，强制终止翻页", self.max_pages);
                }
                return PagerState::Exhausted;
            }
            AdvancePlan::Target(target) => self.jump_to(surface, target).await,
            AdvancePlan::NextStep => self.click_next(surface).await,
        };

        if !clicked {
            info!("所有前进策略都失败，视为已到最后一页");
            return PagerState::Exhausted;
        }

        // 确认新页内容加载完，再回到 Scanning；超时不挂死，降级为终止
        if self.wait_for_content(surface).await {
            PagerState::Scanning
        } else {
            warn!(
                "⚠️ 等待新页内容超时 ({} 秒)，终止翻页",
                self.wait_timeout.as_secs()
            );
            PagerState::Exhausted
        }
    }

    /// 跳到指定页码：点页码 → 点「下一页」→ 页码跳转输入框
    async fn jump_to<S: DomSurface>(&self, surface: &S, target: u32) -> bool {
        let click_page = CLICK_PAGE_JS.replace("__TARGET__", &target.to_string());
        if self.try_action(surface, click_page, "点击页码").await {
            return true;
        }
        if self.click_next(surface).await {
            return true;
        }
        let jumper = JUMPER_JS.replace("__TARGET__", &target.to_string());
        self.try_action(surface, jumper, "页码跳转输入框").await
    }

    async fn click_next<S: DomSurface>(&self, surface: &S) -> bool {
        self.try_action(surface, CLICK_NEXT_JS.to_string(), "下一页按钮")
            .await
    }

    async fn try_action<S: DomSurface>(&self, surface: &S, js: String, what: &str) -> bool {
        match surface.eval_as::<bool>(js).await {
            Ok(true) => {
                debug!("✓ {} 生效", what);
                true
            }
            Ok(false) => {
                debug!("{} 不可用", what);
                false
            }
            Err(e) => {
                warn!("{} 执行失败: {}", what, e);
                false
            }
        }
    }

    /// 有界等待：轮询页面就绪条件，直到成功或超时
    pub async fn wait_for_content<S: DomSurface>(&self, surface: &S) -> bool {
        let deadline = tokio::time::Instant::now() + self.wait_timeout;
        loop {
            if let Ok(true) = surface.eval_as::<bool>(CONTENT_READY_JS.to_string()).await {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mark(text: &str, cls: &str) -> PagerMark {
        PagerMark {
            text: text.to_string(),
            cls: cls.to_string(),
        }
    }

    #[test]
    fn test_read_cursor_from_explicit_marks() {
        let snapshot = PagerSnapshot {
            marks: vec![
                mark("1", "pager-item"),
                mark("2", "pager-item active"),
                mark("5", "pager-item"),
                mark("20", "pager-item fast-move"), // 快进按钮不算总页数
            ],
            ..Default::default()
        };
        assert_eq!(
            read_cursor(&snapshot),
            CursorReading::Explicit(PageCursor {
                current: 2,
                total: Some(5)
            })
        );
    }

    #[test]
    fn test_read_cursor_derived_from_totals() {
        let snapshot = PagerSnapshot {
            totals: vec!["Total 59".to_string()],
            per_page: vec!["24 / Page".to_string()],
            ..Default::default()
        };
        // ceil(59 / 24) = 3
        assert_eq!(
            read_cursor(&snapshot),
            CursorReading::Explicit(PageCursor {
                current: 1,
                total: Some(3)
            })
        );
    }

    #[test]
    fn test_read_cursor_derived_uses_default_per_page() {
        let snapshot = PagerSnapshot {
            totals: vec!["Total 59".to_string()],
            ..Default::default()
        };
        // 没有 "x / Page" 信号时按默认 24 条/页
        assert_eq!(
            read_cursor(&snapshot),
            CursorReading::Explicit(PageCursor {
                current: 1,
                total: Some(3)
            })
        );
    }

    #[test]
    fn test_read_cursor_next_button_fallback() {
        let snapshot = PagerSnapshot {
            next_enabled: true,
            ..Default::default()
        };
        assert_eq!(read_cursor(&snapshot), CursorReading::NextAvailable);

        let dead = PagerSnapshot::default();
        assert_eq!(read_cursor(&dead), CursorReading::Exhausted);
    }

    #[test]
    fn test_plan_advance_terminates_on_last_page() {
        let on_last = CursorReading::Explicit(PageCursor {
            current: 3,
            total: Some(3),
        });
        assert_eq!(plan_advance(&on_last, 3, 50), AdvancePlan::Stop);

        let beyond = CursorReading::Explicit(PageCursor {
            current: 4,
            total: Some(3),
        });
        assert_eq!(plan_advance(&beyond, 4, 50), AdvancePlan::Stop);

        let mid = CursorReading::Explicit(PageCursor {
            current: 2,
            total: Some(5),
        });
        assert_eq!(plan_advance(&mid, 2, 50), AdvancePlan::Target(3));
    }

    #[test]
    fn test_plan_advance_safety_bound() {
        // 就算信号说「永远有下一页」，到达上限也必须停
        assert_eq!(
            plan_advance(&CursorReading::NextAvailable, 50, 50),
            AdvancePlan::Stop
        );
        assert_eq!(
            plan_advance(&CursorReading::NextAvailable, 49, 50),
            AdvancePlan::NextStep
        );
        let open = CursorReading::Explicit(PageCursor {
            current: 50,
            total: Some(999),
        });
        assert_eq!(plan_advance(&open, 50, 50), AdvancePlan::Stop);
    }

    /// 假页面：最后一页的快照 + 记录有没有动作被触发
    struct LastPageDom {
        actions: AtomicUsize,
    }

    impl DomSurface for LastPageDom {
        async fn goto(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn eval(&self, js_code: String) -> Result<serde_json::Value> {
            if js_code.contains("probe:pager") {
                return Ok(serde_json::json!({
                    "marks": [
                        { "text": "1", "cls": "pager-item" },
                        { "text": "2", "cls": "pager-item active" }
                    ],
                    "totals": [],
                    "per_page": [],
                    "next_enabled": false
                }));
            }
            if js_code.contains("act:") {
                self.actions.fetch_add(1, Ordering::SeqCst);
            }
            Ok(serde_json::json!(true))
        }

        async fn location(&self) -> Result<(String, String)> {
            Ok((String::new(), String::new()))
        }
    }

    #[tokio::test]
    async fn test_advance_on_last_page_issues_no_action() {
        let dom = LastPageDom {
            actions: AtomicUsize::new(0),
        };
        let walker = PaginationWalker::new(50, 1);

        let state = walker.advance(&dom, 2).await;
        assert_eq!(state, PagerState::Exhausted);
        // current >= total：不允许发出任何导航动作
        assert_eq!(dom.actions.load(Ordering::SeqCst), 0);
    }
}
