//! 工作流层：把业务能力串成完整的单任务流程

pub mod task_ctx;
pub mod task_flow;

pub use task_ctx::TaskCtx;
pub use task_flow::TaskFlow;
