use std::fmt;

/// 任务状态（封闭枚举）
///
/// 只有 `Done` 的任务才会进入详情页抽取；
/// 这是业务过滤条件，指定单个任务时会被绕过。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TaskStatus {
    /// 已完成
    Done,
    /// 处理中
    Pending,
    /// 失败 / 已取消
    Failed,
    /// 无法判断
    Unknown,
}

impl TaskStatus {
    /// 获取标准名称
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Done => "Done",
            TaskStatus::Pending => "Pending",
            TaskStatus::Failed => "Failed",
            TaskStatus::Unknown => "Unknown",
        }
    }

    pub fn is_done(self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 列表页扫描产出的候选任务
///
/// 分类完成后不再修改。
#[derive(Debug, Clone, serde::Serialize)]
pub struct TaskCandidate {
    /// 任务编号（DRT 前缀，已通过格式校验）
    pub task_id: String,
    /// 完成时间；页面上拿不到时为 "unknown"
    pub complete_time: String,
    /// 任务状态
    pub status: TaskStatus,
}

impl TaskCandidate {
    pub fn new(task_id: String, complete_time: String, status: TaskStatus) -> Self {
        Self {
            task_id,
            complete_time,
            status,
        }
    }

    /// 为「指定任务模式」合成候选：跳过状态过滤，直接按 Done 处理
    pub fn for_specific(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            complete_time: "unknown".to_string(),
            status: TaskStatus::Done,
        }
    }
}
