use serde::Deserialize;

/// 程序配置
///
/// 加载顺序：默认值 < audit_config.toml < 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SPX 首页（登录入口）
    pub homepage_url: String,
    /// 收件任务列表页
    pub receive_task_url: String,
    /// 任务详情页模板，`{task_id}` 会被替换为任务编号
    pub detail_url_template: String,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 单个任务最多翻页数（安全上限，防止分页信号损坏时死循环）
    pub max_pages: u32,
    /// 等待页面内容出现的超时（秒）
    pub wait_timeout_secs: u64,
    /// 相邻页面操作之间的最小间隔（毫秒），避免压垮对方页面
    pub min_request_interval_ms: u64,
    /// 最多处理的任务数（测试模式用），None 表示不限
    pub max_tasks: Option<usize>,
    /// 只处理指定任务编号；设置后跳过状态过滤
    pub specific_task: Option<String>,
    /// 连续失败多少个任务后熔断
    pub max_consecutive_failures: usize,
    /// 导出文件目录
    pub output_dir: String,
    /// 运行日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            homepage_url: "https://sp.spx.shopee.ph/".to_string(),
            receive_task_url: "https://sp.spx.shopee.ph/inbound-management/receive-task"
                .to_string(),
            detail_url_template:
                "https://sp.spx.shopee.ph/inbound-management/receive-task/detail/{task_id}"
                    .to_string(),
            browser_debug_port: 9222,
            max_pages: 50,
            wait_timeout_secs: 10,
            min_request_interval_ms: 2000,
            max_tasks: None,
            specific_task: None,
            max_consecutive_failures: 5,
            output_dir: ".".to_string(),
            output_log_file: "spx_audit.log".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从配置文件（如存在）和环境变量加载配置
    pub fn load() -> Self {
        let base = Self::from_file("audit_config.toml").unwrap_or_default();
        Self::overlay_env(base)
    }

    /// 仅从环境变量加载（默认值兜底）
    pub fn from_env() -> Self {
        Self::overlay_env(Self::default())
    }

    /// 尝试读取 TOML 配置文件
    fn from_file(path: &str) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                // 配置文件坏了不至于中止运行，退回默认值
                eprintln!("配置文件 {} 解析失败，使用默认配置: {}", path, e);
                None
            }
        }
    }

    /// 用环境变量覆盖已有配置
    fn overlay_env(base: Self) -> Self {
        Self {
            homepage_url: std::env::var("SPX_HOMEPAGE_URL").unwrap_or(base.homepage_url),
            receive_task_url: std::env::var("SPX_RECEIVE_TASK_URL")
                .unwrap_or(base.receive_task_url),
            detail_url_template: std::env::var("SPX_DETAIL_URL_TEMPLATE")
                .unwrap_or(base.detail_url_template),
            browser_debug_port: std::env::var("SPX_BROWSER_DEBUG_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.browser_debug_port),
            max_pages: std::env::var("SPX_MAX_PAGES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.max_pages),
            wait_timeout_secs: std::env::var("SPX_WAIT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.wait_timeout_secs),
            min_request_interval_ms: std::env::var("SPX_MIN_REQUEST_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.min_request_interval_ms),
            max_tasks: std::env::var("SPX_MAX_TASKS")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(base.max_tasks),
            specific_task: std::env::var("SPX_SPECIFIC_TASK").ok().or(base.specific_task),
            max_consecutive_failures: std::env::var("SPX_MAX_CONSECUTIVE_FAILURES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.max_consecutive_failures),
            output_dir: std::env::var("SPX_OUTPUT_DIR").unwrap_or(base.output_dir),
            output_log_file: std::env::var("SPX_OUTPUT_LOG_FILE").unwrap_or(base.output_log_file),
            verbose_logging: std::env::var("SPX_VERBOSE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.verbose_logging),
        }
    }

    /// 生成指定任务的详情页 URL
    pub fn detail_url(&self, task_id: &str) -> String {
        self.detail_url_template.replace("{task_id}", task_id)
    }
}
