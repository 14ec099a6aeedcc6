//! 登录闸门 - 业务能力层
//!
//! 审计面板需要人工登录，自动化流程在登录处停下来等操作员确认。
//! 抽成 trait 是为了让编排层在测试里注入零等待的假闸门。

use anyhow::Result;

use crate::error::AuditError;

/// 操作员确认闸门
#[allow(async_fn_in_trait)]
pub trait OperatorGate {
    /// 打印提示并阻塞到操作员确认完成
    async fn wait_for_confirmation(&self, prompt: &str) -> Result<()>;
}

/// 控制台实现：提示后等一行回车
pub struct ConsoleGate;

impl OperatorGate for ConsoleGate {
    async fn wait_for_confirmation(&self, prompt: &str) -> Result<()> {
        println!("\n{}", prompt);
        println!("完成后按回车继续...");

        // 标准输入是阻塞读，放到阻塞线程里做
        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| ())
        })
        .await
        .map_err(|e| AuditError::Other(format!("等待操作员确认失败: {}", e)))??;

        Ok(())
    }
}
