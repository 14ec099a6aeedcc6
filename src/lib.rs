//! SPX 收件任务审计工具
//!
//! 连接已登录的浏览器，扫描 SPX 面板的收件任务列表，
//! 逐个打开已完成任务的详情页，跨页抽取并去重 (发件人, 运单号) 记录，
//! 最后导出 JSON / CSV 审计报表。
//!
//! 四层架构：
//!
//! ```text
//! orchestrator  编排层   一轮运行：登录闸门、列表扫描、熔断、导出
//!      ↓
//! workflow      工作流层 单任务流程：详情页逐页抽取 → 聚合 → 组装
//!      ↓
//! services      能力层   记录定位、翻页、状态分类、聚合、导出
//!      ↓
//! infrastructure 基础设施 页面探针（唯一的浏览器能力出口）
//! ```
//!
//! 所有页面读写都走 [`infrastructure::DomSurface`]，
//! 测试里注入脚本化假实现即可脱离浏览器跑整条流水线。

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

pub use config::Config;
pub use error::{AuditError, AuditResult};
pub use orchestrator::App;
