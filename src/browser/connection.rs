use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::AuditError;

/// 连接到浏览器并获取 SPX 页面
///
/// 优先复用已经打开的 SPX 标签页（操作员可能已经登录过），
/// 找不到时创建新页面并导航到首页。
pub async fn connect_to_browser_and_page(
    port: u16,
    homepage_url: &str,
) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url)
        .await
        .map_err(|e| AuditError::browser_connection_failed(port, e))?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    // 查找已经打开的 SPX 页面
    for p in pages.iter() {
        if let Ok(Some(url)) = p.url().await {
            debug!("检查页面: {}", url);
            if url.contains("spx.shopee") {
                info!("✓ 复用已打开的 SPX 页面: {}", url);
                return Ok((browser, p.clone()));
            }
        }
    }

    // 没有找到，创建新页面并导航到首页
    debug!("未找到 SPX 页面，创建新页面并导航到: {}", homepage_url);
    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        e
    })?;
    page.goto(homepage_url)
        .await
        .map_err(|e| AuditError::navigation_failed(homepage_url, e))?;
    info!("已导航到: {}", homepage_url);

    Ok((browser, page))
}
