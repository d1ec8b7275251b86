//! 渲染能力 - 基础设施层
//!
//! 持有稀缺资源（浏览器进程、会话目录），只暴露"渲染一个链接"的能力

use std::future::Future;

use tracing::debug;

use crate::browser::{RenderSession, SessionOptions};
use crate::error::FetchError;
use crate::models::task::Task;

/// 把一个链接渲染成完整的页面内容
///
/// 实现方负责会话的获取与释放；返回时该任务占用的所有资源都已回收。
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, task: &Task) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// 基于 chromiumoxide 的渲染器，每个任务一个独立浏览器
pub struct ChromeRenderer {
    options: SessionOptions,
}

impl ChromeRenderer {
    pub fn new(options: SessionOptions) -> Self {
        Self { options }
    }
}

impl Renderer for ChromeRenderer {
    async fn render(&self, task: &Task) -> Result<String, FetchError> {
        let session = RenderSession::open(&self.options, task).await?;
        let captured = session.capture(task, &self.options).await;
        // 无论成功与否都要关闭会话
        session.close().await;
        debug!("{} 会话已关闭", task);
        captured
    }
}
