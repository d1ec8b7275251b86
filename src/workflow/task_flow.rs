//! 单任务处理流程 - 流程层
//!
//! 流程顺序：
//! 1. 渲染（会话在渲染器内部获取与释放）
//! 2. 节流等待
//! 3. 空内容检查
//! 4. 抽取记录

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{AppResult, FetchError};
use crate::infrastructure::Renderer;
use crate::models::record::ExtractionResult;
use crate::models::task::Task;
use crate::services::RecordExtractor;
use crate::utils::logging::truncate_text;

/// 单任务处理流程
///
/// - 每个任务恰好产生一个 `ExtractionResult`
/// - 抓取失败被转换为 `Failure`，不向上传播
/// - 只有致命错误（会话目录无法分配）以 `Err` 返回
pub struct TaskFlow<R> {
    renderer: R,
    extractor: Arc<RecordExtractor>,
    pacing_delay: Duration,
}

impl<R: Renderer> TaskFlow<R> {
    pub fn new(renderer: R, extractor: Arc<RecordExtractor>, pacing_delay: Duration) -> Self {
        Self {
            renderer,
            extractor,
            pacing_delay,
        }
    }

    pub async fn run(&self, task: &Task) -> AppResult<ExtractionResult> {
        info!("{} 🔗 抓取: {}", task, task.locator);

        let rendered = self.renderer.render(task).await;

        // 节流等待计入任务耗时，期间仍占用并发名额
        if !self.pacing_delay.is_zero() {
            sleep(self.pacing_delay).await;
        }

        let content = match rendered {
            Ok(content) => content,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => return Ok(self.fail(task, e)),
        };

        if content.trim().is_empty() {
            return Ok(self.fail(task, FetchError::EmptyContent));
        }

        let record = self.extractor.extract(task, &content);
        debug!(
            "{} 抽取完成: 标题 '{}' | 表格 {} 行 | 信息 {} 行",
            task,
            truncate_text(&record.heading, 40),
            record.table.len(),
            record.info.len()
        );
        info!("{} ✓ 完成", task);

        Ok(ExtractionResult::Success {
            index: task.index,
            record,
        })
    }

    fn fail(&self, task: &Task, cause: FetchError) -> ExtractionResult {
        warn!("{} ❌ 失败: {} ({})", task, cause, task.locator);
        ExtractionResult::failure(task, cause.to_string())
    }
}
