use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::{drive_handler, SETTLE_DELAY};
use crate::error::{AppResult, BrowserError};

/// 连接到已开启调试端口的浏览器，新开一个标签页到搜索页
///
/// 只关闭自己打开的标签页，不影响用户已有的页面。
pub async fn connect_to_browser_and_page(
    port: u16,
    search_url: &str,
) -> AppResult<(Browser, Page, JoinHandle<()>)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, handler) = Browser::connect(&browser_url)
        .await
        .map_err(|source| BrowserError::ConnectionFailed { port, source })?;
    let handler_task = drive_handler(handler);
    sleep(SETTLE_DELAY).await;

    debug!("打开搜索页: {}", search_url);
    let page = match browser.new_page(search_url).await {
        Ok(page) => page,
        Err(e) => {
            error!("打开搜索页失败: {}", e);
            handler_task.abort();
            return Err(BrowserError::PageCreationFailed(e).into());
        }
    };

    info!("✓ 已连接浏览器 (端口 {})", port);
    Ok((browser, page, handler_task))
}
