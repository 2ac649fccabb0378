//! 页面执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"导航 / 执行 JS / 键盘输入"的能力

use anyhow::{Context, Result};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// 页面执行器
///
/// 职责：
/// - 持有 Page 资源
/// - 不认识注册记录，不处理查询流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 导航到指定 URL
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?;
        Ok(())
    }

    /// 执行 JS 代码并返回 JSON 结果
    ///
    /// # 参数
    /// - `js_code`: 要执行的 JavaScript 代码
    ///
    /// # 返回
    /// 返回 JSON 值
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 反复执行 `js_code` 直到 `ready` 返回 true 或超时
    ///
    /// # 参数
    /// - `js_code`: 每轮执行的 JavaScript 代码，结果需能反序列化为 `T`
    /// - `timeout`: 最长等待时间
    /// - `interval`: 两轮之间的间隔
    /// - `ready`: 判断结果是否已就绪
    ///
    /// # 返回
    /// 就绪时返回 `Some(结果)`，超时返回 `None`；JS 执行失败返回错误
    pub async fn poll_until<T, F>(
        &self,
        js_code: &str,
        timeout: Duration,
        interval: Duration,
        ready: F,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            let value: T = self.eval_as(js_code).await?;
            if ready(&value) {
                return Ok(Some(value));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(interval).await;
        }
    }

    /// 清空输入框，键入文本并回车提交
    ///
    /// # 参数
    /// - `selector`: 输入框的 CSS 选择器
    /// - `text`: 要键入的文本
    ///
    /// # 返回
    /// 找不到元素或键盘事件失败时返回错误
    pub async fn type_and_submit(&self, selector: &str, text: &str) -> Result<()> {
        let clear_js = format!(
            "(() => {{ const el = document.querySelector({}); if (el) {{ el.value = ''; }} return !!el; }})()",
            serde_json::to_string(selector)?
        );
        self.eval(clear_js).await?;

        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("找不到元素 {}", selector))?;
        element
            .click()
            .await?
            .type_str(text)
            .await?
            .press_key("Enter")
            .await?;
        Ok(())
    }
}
