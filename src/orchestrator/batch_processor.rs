//! 批次检查点处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **切分批次**：把索引范围切成固定宽度的连续批次
//! 2. **断点续跑**：批次文件已存在则跳过
//! 3. **并发执行**：委托 `WorkerPool` 执行本批任务
//! 4. **有序落盘**：按索引排序后写出批次文件与失败文件
//!
//! 批次严格按范围升序处理；任何致命错误立即中止整轮运行。

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::error::AppResult;
use crate::infrastructure::Renderer;
use crate::models::batch::BatchRange;
use crate::models::task::LocatorSource;
use crate::orchestrator::worker_pool::WorkerPool;
use crate::services::{BatchOutcome, CheckpointStore};
use crate::utils::logging;
use crate::workflow::TaskFlow;

/// 一轮运行的统计
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub range: Option<BatchRange>,
    pub batches_total: usize,
    pub batches_written: usize,
    pub batches_skipped: usize,
    pub records: usize,
    pub failures: usize,
    pub written: Vec<BatchOutcome>,
    pub skipped: Vec<PathBuf>,
}

/// 批次检查点处理器
pub struct BatchProcessor<R> {
    flow: Arc<TaskFlow<R>>,
    pool: WorkerPool,
    store: CheckpointStore,
    batch_width: usize,
}

impl<R: Renderer> BatchProcessor<R> {
    pub fn new(
        flow: Arc<TaskFlow<R>>,
        pool: WorkerPool,
        store: CheckpointStore,
        batch_width: usize,
    ) -> Self {
        Self {
            flow,
            pool,
            store,
            batch_width: batch_width.max(1),
        }
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// 处理 `range` 内的全部批次
    pub async fn run(&self, source: &LocatorSource, range: BatchRange) -> AppResult<RunSummary> {
        self.store.prepare()?;

        let batches = range.split(self.batch_width);
        let total_batches = batches.len();
        let mut summary = RunSummary {
            range: Some(range),
            batches_total: total_batches,
            ..Default::default()
        };

        for (i, batch) in batches.into_iter().enumerate() {
            let batch_num = i + 1;

            if self.store.is_materialized(batch) {
                let path = self.store.output_path(batch);
                logging::log_batch_skipped(batch_num, total_batches, batch, &path);
                summary.batches_skipped += 1;
                summary.skipped.push(path);
                continue;
            }

            logging::log_batch_start(batch_num, total_batches, batch, range);

            let tasks = source.tasks(batch);
            let results = self.pool.run(&self.flow, tasks).await?;
            let outcome = self.store.commit(batch, results)?;

            logging::log_batch_complete(batch_num, &outcome);

            summary.batches_written += 1;
            summary.records += outcome.records;
            summary.failures += outcome.failures;
            summary.written.push(outcome);
        }

        info!(
            "范围 {} 处理结束: 写入 {} 批, 跳过 {} 批",
            range, summary.batches_written, summary.batches_skipped
        );
        Ok(summary)
    }
}
