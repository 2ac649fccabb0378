use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::{drive_handler, SETTLE_DELAY};
use crate::config::Config;
use crate::error::{AppResult, BrowserError};

/// 启动无头浏览器并打开搜索页
pub async fn launch_headless_browser(config: &Config) -> AppResult<(Browser, Page, JoinHandle<()>)> {
    info!("🚀 启动无头浏览器...");

    let mut builder = BrowserConfig::builder()
        .new_headless_mode()
        .request_timeout(config.request_timeout())
        .args(vec!["--disable-gpu", "--no-sandbox", "--disable-dev-shm-usage"]);
    if let Some(executable) = &config.chrome_executable {
        debug!("使用浏览器: {}", executable);
        builder = builder.chrome_executable(Path::new(executable));
    }
    let browser_config = builder.build().map_err(BrowserError::ConfigurationFailed)?;

    let (mut browser, handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        BrowserError::LaunchFailed(e)
    })?;
    let handler_task = drive_handler(handler);
    sleep(SETTLE_DELAY).await;

    let page = match browser.new_page(config.search_page_url.as_str()).await {
        Ok(page) => page,
        Err(e) => {
            error!("打开搜索页失败: {}", e);
            // 启动成功但页面失败时也要结束进程
            let _ = browser.close().await;
            handler_task.abort();
            return Err(BrowserError::PageCreationFailed(e).into());
        }
    };

    info!("✅ 无头浏览器已打开: {}", config.search_page_url);
    Ok((browser, page, handler_task))
}
