//! 浏览器会话
//!
//! 抓取策略在一次运行中只持有一个浏览器会话：开始时获取，
//! 所有编号复用，结束时（包括提前终止）显式关闭。

pub mod connection;
pub mod headless;

use std::time::Duration;

use chromiumoxide::{Browser, Handler, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppResult;

pub use connection::connect_to_browser_and_page;
pub use headless::launch_headless_browser;

/// 连接或启动后等待浏览器状态同步
const SETTLE_DELAY: Duration = Duration::from_millis(300);

/// 在后台驱动 CDP 事件流，出错即退出
fn drive_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("CDP 事件流结束: {}", e);
                break;
            }
        }
    })
}

/// 一次运行的浏览器会话
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    /// 由本程序启动（关闭时结束进程）还是连接到已有浏览器（只关闭自己的标签页）
    launched: bool,
}

impl BrowserSession {
    /// 获取会话：配置了调试端口则连接已有浏览器，否则启动无头浏览器
    pub async fn acquire(config: &Config) -> AppResult<Self> {
        match config.browser_debug_port {
            Some(port) => {
                let (browser, page, handler) =
                    connect_to_browser_and_page(port, &config.search_page_url).await?;
                Ok(Self {
                    browser,
                    page,
                    handler,
                    launched: false,
                })
            }
            None => {
                let (browser, page, handler) = launch_headless_browser(config).await?;
                Ok(Self {
                    browser,
                    page,
                    handler,
                    launched: true,
                })
            }
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 释放会话
    ///
    /// 未调用就被 drop 时，chromiumoxide 的 `Browser` 会在 drop 中结束自己启动的进程。
    pub async fn close(mut self) {
        if self.launched {
            if let Err(e) = self.browser.close().await {
                warn!("关闭浏览器失败: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                debug!("等待浏览器进程退出失败: {}", e);
            }
        } else if let Err(e) = self.page.clone().close().await {
            warn!("关闭标签页失败: {}", e);
        }
        self.handler.abort();
        info!("🧹 浏览器会话已释放");
    }
}
