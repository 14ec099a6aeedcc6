//! 页面探针 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"导航 / 执行 JS / 读位置"三种能力。
//! 所有结构化抽取都通过注入 JS 拿 JSON 完成，上层不直接接触 DOM 句柄。

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// 页面能力接口
///
/// 生产实现是 [`PageProbe`]；测试里注入脚本化的假实现，
/// 整条抽取流水线就能脱离浏览器跑。
#[allow(async_fn_in_trait)]
pub trait DomSurface {
    /// 导航到指定 URL
    async fn goto(&self, url: &str) -> Result<()>;

    /// 执行 JS 代码并返回 JSON 结果
    async fn eval(&self, js_code: String) -> Result<JsonValue>;

    /// 读取当前位置 (url, title)
    async fn location(&self) -> Result<(String, String)>;

    /// 执行 JS 代码并反序列化为指定类型
    async fn eval_as<T: DeserializeOwned>(&self, js_code: String) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }
}

/// 页面探针
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 goto / eval / location 能力
/// - 不认识任务、运单、分页
/// - 不处理业务流程
pub struct PageProbe {
    page: Page,
}

impl PageProbe {
    /// 创建新的页面探针
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }
}

impl DomSurface for PageProbe {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn eval(&self, js_code: String) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    async fn location(&self) -> Result<(String, String)> {
        let url = self.page.url().await?.unwrap_or_default();
        let title = self.page.get_title().await?.unwrap_or_default();
        Ok((url, title))
    }
}
