//! 独立的无头浏览器会话
//!
//! 每个任务启动自己的浏览器进程，并使用一次性的用户数据目录，
//! 并发会话之间不共享缓存或状态。

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::models::task::Task;

/// 就绪信号的轮询间隔
const READINESS_POLL: Duration = Duration::from_millis(250);

/// 会话启动参数
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub readiness_selector: String,
    pub wait_timeout: Duration,
    pub settle_delay: Duration,
}

/// 一个渲染会话：浏览器进程 + 事件循环 + 独占的工作目录
///
/// 字段按声明顺序析构：先结束浏览器，再删除其工作目录。
pub struct RenderSession {
    browser: Browser,
    handler: AbortOnDrop,
    profile_dir: TempDir,
}

/// 析构时中止浏览器事件循环
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl RenderSession {
    /// 为任务启动一个独立的浏览器
    ///
    /// 工作目录分配失败返回 `SessionSetup`（致命），浏览器启动失败返回 `RendererCrash`。
    pub async fn open(options: &SessionOptions, task: &Task) -> Result<Self, FetchError> {
        let profile_dir = tempfile::Builder::new()
            .prefix(&format!("chrome_task_{}_", task.index))
            .tempdir()
            .map_err(|source| FetchError::SessionSetup { source })?;
        debug!("{} 会话目录: {}", task, profile_dir.path().display());

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir.path())
            .window_size(1920, 1080)
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
            ]);
        builder = if options.headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        if let Some(executable) = &options.chrome_executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(FetchError::crash)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(FetchError::crash)?;

        // 在后台处理浏览器事件
        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler: AbortOnDrop(handler),
            profile_dir,
        })
    }

    /// 导航到链接，等待就绪信号，返回渲染后的页面内容
    pub async fn capture(&self, task: &Task, options: &SessionOptions) -> Result<String, FetchError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(FetchError::crash)?;

        let ready = timeout(options.wait_timeout, async {
            page.goto(task.locator.as_str())
                .await
                .map_err(FetchError::crash)?;
            wait_for_selector(&page, &options.readiness_selector).await;
            Ok::<_, FetchError>(())
        })
        .await;

        match ready {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    secs: options.wait_timeout.as_secs(),
                })
            }
        }

        if !options.settle_delay.is_zero() {
            sleep(options.settle_delay).await;
        }

        page.content().await.map_err(FetchError::crash)
    }

    /// 关闭浏览器并回收工作目录
    pub async fn close(self) {
        let Self {
            mut browser,
            handler,
            profile_dir,
        } = self;

        if let Err(e) = browser.close().await {
            debug!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = browser.wait().await {
            debug!("等待浏览器退出失败: {}", e);
        }
        drop(browser);
        drop(handler);

        let path = profile_dir.path().to_path_buf();
        if let Err(e) = profile_dir.close() {
            warn!("清理会话目录失败 {}: {}", path.display(), e);
        }
    }
}

async fn wait_for_selector(page: &Page, selector: &str) {
    while page.find_element(selector).await.is_err() {
        sleep(READINESS_POLL).await;
    }
}
