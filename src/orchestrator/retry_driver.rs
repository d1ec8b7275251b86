//! 失败重试 - 编排层
//!
//! 一次调用只做一轮：读入失败集合，整体交给一次工作池调用（不再分批），
//! 成功的记录写入新的重试文件，仍然失败的链接覆盖原失败文件。
//! 需要多轮时由调用方重复调用。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::error::AppResult;
use crate::infrastructure::Renderer;
use crate::models::failure::FailureSet;
use crate::orchestrator::worker_pool::WorkerPool;
use crate::services::checkpoint_store::render_ordered;
use crate::services::{CheckpointStore, FailureStore};
use crate::utils::fs::write_atomic;
use crate::workflow::TaskFlow;

/// 一轮重试的结果
#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub failure_path: PathBuf,
    /// 本轮恢复的记录写入的文件；没有恢复任何记录时为 `None`
    pub output_path: Option<PathBuf>,
    pub attempted: usize,
    pub recovered: usize,
    pub still_failed: usize,
}

/// 失败重试驱动
pub struct RetryDriver<R> {
    flow: Arc<TaskFlow<R>>,
    pool: WorkerPool,
}

impl<R: Renderer> RetryDriver<R> {
    pub fn new(flow: Arc<TaskFlow<R>>, pool: WorkerPool) -> Self {
        Self { flow, pool }
    }

    /// 对单个失败文件执行一轮重试
    pub async fn retry(&self, failure_path: &Path) -> AppResult<RetryOutcome> {
        let failures = FailureStore::load(failure_path)?;
        let attempted = failures.len();

        if failures.is_empty() {
            info!("✓ {} 中没有待重试的链接", failure_path.display());
            return Ok(RetryOutcome {
                failure_path: failure_path.to_path_buf(),
                output_path: None,
                attempted: 0,
                recovered: 0,
                still_failed: 0,
            });
        }

        info!("🔁 重试 {} 个失败链接: {}", attempted, failure_path.display());
        let mut results = self.pool.run(&self.flow, failures.tasks()).await?;
        let content = render_ordered(&mut results);
        let still_failed = FailureSet::from_results(&results);
        let recovered = attempted - still_failed.len();

        // 先写恢复的记录，再覆盖失败文件，中断时最多导致重复抓取而不会丢记录
        let output_path = if recovered > 0 {
            let path = next_retry_path(failure_path);
            write_atomic(&path, content.as_bytes())?;
            info!("✅ 重试结果已保存: {}", path.display());
            Some(path)
        } else {
            None
        };

        FailureStore::write(failure_path, &still_failed)?;
        if still_failed.is_empty() {
            info!("🎉 {} 中的链接已全部重试成功", failure_path.display());
        } else {
            info!(
                "⚠️ 仍有 {} 个链接失败，已写回: {}",
                still_failed.len(),
                failure_path.display()
            );
        }

        Ok(RetryOutcome {
            failure_path: failure_path.to_path_buf(),
            output_path,
            attempted,
            recovered,
            still_failed: still_failed.len(),
        })
    }

    /// 对输出目录中每个仍有条目的失败文件各执行一轮重试
    pub async fn retry_all(&self, store: &CheckpointStore) -> AppResult<Vec<RetryOutcome>> {
        let paths = FailureStore::outstanding(store.output_dir(), store.prefix())?;
        info!("找到 {} 个待重试的失败文件", paths.len());

        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            outcomes.push(self.retry(&path).await?);
        }
        Ok(outcomes)
    }
}

/// `<失败文件名>_retry<N>.txt`，取第一个尚不存在的 N
fn next_retry_path(failure_path: &Path) -> PathBuf {
    let stem = failure_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "failed".to_string());
    let dir = failure_path.parent().unwrap_or_else(|| Path::new("."));

    (1..)
        .map(|n| dir.join(format!("{}_retry{}.txt", stem, n)))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| dir.join(format!("{}_retry.txt", stem)))
}
