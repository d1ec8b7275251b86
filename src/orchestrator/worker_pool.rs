//! 有界工作池 - 编排层
//!
//! 以至多 `max_workers` 的并发执行一组任务，按完成先后收集结果，
//! 每个结果都带着原始索引，全局顺序留给落盘时重建。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use crate::error::{AppError, AppResult, PoolError};
use crate::infrastructure::Renderer;
use crate::models::record::ExtractionResult;
use crate::models::task::Task;
use crate::workflow::TaskFlow;

/// 有界工作池
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    max_workers: usize,
}

impl WorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// 执行全部任务，返回与任务一一对应的结果
    ///
    /// 单个任务的失败（包括 panic）都被转换为 `Failure`；
    /// 只有致命错误会让整次调用返回 `Err`：出现后停止派发剩余任务，
    /// 等待已派发的任务结束再返回。
    pub async fn run<R: Renderer>(
        &self,
        flow: &Arc<TaskFlow<R>>,
        tasks: Vec<Task>,
    ) -> AppResult<Vec<ExtractionResult>> {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let aborted = Arc::new(AtomicBool::new(false));
        let expected = tasks.len();
        let mut dispatched = 0;
        let mut in_flight = FuturesUnordered::new();

        for task in tasks {
            let permit = semaphore.clone().acquire_owned().await.map_err(|e| {
                AppError::Pool(PoolError::PermitUnavailable {
                    reason: e.to_string(),
                })
            })?;

            // 名额释放前已置位，拿到名额后检查即可
            if aborted.load(Ordering::SeqCst) {
                warn!(
                    "出现致命错误，停止派发剩余 {} 个任务",
                    expected - dispatched
                );
                break;
            }

            let index = task.index;
            let locator = task.locator.clone();
            let flow = Arc::clone(flow);
            let abort_flag = Arc::clone(&aborted);

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = flow.run(&task).await;
                if result.is_err() {
                    abort_flag.store(true, Ordering::SeqCst);
                }
                result
            });
            in_flight.push(async move { (index, locator, handle.await) });
            dispatched += 1;
        }
        debug!("已派发 {}/{} 个任务 (并发上限 {})", dispatched, expected, self.max_workers);

        let mut results = Vec::with_capacity(expected);
        let mut fatal: Option<AppError> = None;

        while let Some((index, locator, joined)) = in_flight.next().await {
            match joined {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(e)) => {
                    error!("[#{}] 💥 致命错误: {}", index, e);
                    fatal.get_or_insert(e);
                }
                Err(e) => {
                    error!("[#{}] 任务执行失败: {}", index, e);
                    let task = Task::new(index, locator);
                    results.push(ExtractionResult::failure(&task, format!("任务异常退出: {}", e)));
                }
            }
        }

        match fatal {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}
