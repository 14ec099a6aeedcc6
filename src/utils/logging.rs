//! 日志初始化与输出辅助

use std::io::Write;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化控制台日志
///
/// 默认级别 info，`verbose` 为 true 时提到 debug；
/// RUST_LOG 环境变量优先级最高。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("spx_receive_audit={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// 在运行日志文件里追加一条运行头
pub fn append_run_header(path: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(
        file,
        "===== 审计运行 @ {} =====",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    Ok(())
}

/// 打印分隔横幅
pub fn banner(title: &str) {
    info!("{}", "=".repeat(50));
    info!("  {}", title);
    info!("{}", "=".repeat(50));
}
