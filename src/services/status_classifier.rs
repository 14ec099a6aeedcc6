//! 状态分类服务 - 业务能力层
//!
//! 纯函数：把一条记录附近的若干文本/样式信号映射为任务状态。
//! 不碰页面，不关心流程。
//!
//! 判定策略（明确约定，有测试兜着）：
//! - 单个信号内按 Done → Pending → Failed 的顺序取第一个命中的类别；
//! - 跨信号时，**最后一个**命中的信号说了算（沿用上游面板的实际表现）。

use phf::{phf_set, Set};

use crate::models::TaskStatus;

/// 「已完成」词表
static DONE_WORDS: Set<&'static str> = phf_set! {
    "done", "completed", "complete", "success", "finished",
};

/// 「处理中」词表
static PENDING_WORDS: Set<&'static str> = phf_set! {
    "pending", "processing", "in progress", "running",
};

/// 「失败/取消」词表
static FAILED_WORDS: Set<&'static str> = phf_set! {
    "failed", "fail", "error", "cancelled", "canceled",
};

/// 判断单个信号属于哪个类别
///
/// 信号可以是单元格文本，也可以是 class 属性串（如 "status-success"）。
fn signal_category(signal: &str) -> Option<TaskStatus> {
    let lower = signal.to_lowercase();
    if DONE_WORDS.iter().any(|w| lower.contains(w)) {
        return Some(TaskStatus::Done);
    }
    if PENDING_WORDS.iter().any(|w| lower.contains(w)) {
        return Some(TaskStatus::Pending);
    }
    if FAILED_WORDS.iter().any(|w| lower.contains(w)) {
        return Some(TaskStatus::Failed);
    }
    None
}

/// 扫描一条记录的全部信号并分类
///
/// 所有信号都会被扫描，不提前短路；没有任何命中时返回 `Unknown`。
pub fn classify<S: AsRef<str>>(signals: &[S]) -> TaskStatus {
    let mut current = TaskStatus::Unknown;
    for signal in signals {
        if let Some(status) = signal_category(signal.as_ref()) {
            current = status;
        }
    }
    current
}
