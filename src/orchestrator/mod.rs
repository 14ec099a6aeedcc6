//! 编排层：把工作流串成一轮完整运行

pub mod app;
pub mod list_scanner;

pub use app::{run_audit, App, RunOutcome, RunStats};
pub use list_scanner::{scan_task_list, ListScanOutcome};
