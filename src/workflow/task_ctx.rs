//! 任务上下文 - 工作流层

/// 单个任务的处理上下文（贯穿详情页抽取全程的只读信息）
#[derive(Debug, Clone)]
pub struct TaskCtx {
    /// 收件任务 ID（DRT 开头）
    pub task_id: String,
    /// 本轮中的序号（从 1 开始，日志前缀用）
    pub task_index: usize,
    /// 详情页 URL
    pub detail_url: String,
}

impl TaskCtx {
    pub fn new(task_id: impl Into<String>, task_index: usize, detail_url: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            task_index,
            detail_url: detail_url.into(),
        }
    }
}
