//! 业务能力层：无流程语义的可复用能力
//!
//! - 记录定位（多策略降级抽取）
//! - 翻页（纯决策 + 执行器）
//! - 状态分类（纯函数）
//! - 聚合引擎（跨页去重）
//! - 审计组装、导出、登录闸门

pub mod aggregator;
pub mod audit_assembler;
pub mod exporter;
pub mod operator_gate;
pub mod pagination;
pub mod record_locator;
pub mod status_classifier;

pub use aggregator::{TrackingAggregate, NO_DATA_SENTINEL};
pub use exporter::Exporter;
pub use operator_gate::{ConsoleGate, OperatorGate};
pub use pagination::{PagerState, PaginationWalker};
pub use record_locator::{locate_task_candidates, locate_tracking_records};
