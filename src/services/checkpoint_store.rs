//! 检查点存储 - 业务能力层
//!
//! 负责批次文件的命名、存在性判断与落盘。批次文件一旦写入就不再修改，
//! 它的存在本身就是"该批次已完成"的标记，不另设状态文件。

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::batch::BatchRange;
use crate::models::failure::FailureSet;
use crate::models::record::ExtractionResult;
use crate::services::failure_store::FailureStore;
use crate::utils::fs::{ensure_dir, write_atomic};

/// 单个批次的落盘结果
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub range: BatchRange,
    pub output_path: PathBuf,
    pub failure_path: Option<PathBuf>,
    pub records: usize,
    pub failures: usize,
}

/// 检查点存储
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    output_dir: PathBuf,
    prefix: String,
}

impl CheckpointStore {
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
        }
    }

    /// 创建输出目录，失败属于环境错误
    pub fn prepare(&self) -> AppResult<()> {
        ensure_dir(&self.output_dir)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn output_path(&self, range: BatchRange) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}_{}.txt", self.prefix, range.start, range.end))
    }

    pub fn failure_path(&self, range: BatchRange) -> PathBuf {
        self.output_dir
            .join(format!("{}_failed_{}_{}.json", self.prefix, range.start, range.end))
    }

    /// 只判断文件是否存在，不校验内容
    pub fn is_materialized(&self, range: BatchRange) -> bool {
        self.output_path(range).exists()
    }

    /// 提交一个批次：按索引排序后写出批次文件，有失败时同时写出失败文件
    ///
    /// 失败文件先于批次文件写入，批次文件出现时失败记录一定已经在盘上。
    pub fn commit(
        &self,
        range: BatchRange,
        mut results: Vec<ExtractionResult>,
    ) -> AppResult<BatchOutcome> {
        let content = render_ordered(&mut results);
        let failures = FailureSet::from_results(&results);
        let records = results.len() - failures.len();

        let failure_path = self.failure_path(range);
        let failure_path = if failures.is_empty() {
            remove_stale(&failure_path)?;
            None
        } else {
            FailureStore::write(&failure_path, &failures)?;
            warn!("⚠️ 失败链接已保存: {}", failure_path.display());
            Some(failure_path)
        };

        let output_path = self.output_path(range);
        write_atomic(&output_path, content.as_bytes())?;
        info!("✅ 检查点已保存: {}", output_path.display());

        Ok(BatchOutcome {
            range,
            output_path,
            failure_path,
            records,
            failures: failures.len(),
        })
    }
}

/// 按索引升序排列结果，并把成功记录以空行连接
pub fn render_ordered(results: &mut [ExtractionResult]) -> String {
    results.sort_by_key(ExtractionResult::index);
    results
        .iter()
        .filter_map(|result| match result {
            ExtractionResult::Success { record, .. } => Some(record.to_string()),
            ExtractionResult::Failure { .. } => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 上一次中断的尝试可能留下失败文件，本次全部成功时需要清掉
fn remove_stale(path: &Path) -> AppResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::file_write_failed(path.display().to_string(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::StructuredText;
    use crate::models::task::Task;

    fn success(index: usize) -> ExtractionResult {
        let task = Task::new(index, format!("https://example.org/{index}"));
        let mut record = StructuredText::empty(&task, "Heading");
        record.heading = format!("entry {index}");
        ExtractionResult::Success { index, record }
    }

    fn failure(index: usize) -> ExtractionResult {
        ExtractionResult::failure(
            &Task::new(index, format!("https://example.org/{index}")),
            "timeout",
        )
    }

    #[test]
    fn test_paths_are_named_by_range() {
        let store = CheckpointStore::new("/tmp/out", "dhatus");
        let range = BatchRange::new(250, 500);
        assert_eq!(store.output_path(range), PathBuf::from("/tmp/out/dhatus_250_500.txt"));
        assert_eq!(
            store.failure_path(range),
            PathBuf::from("/tmp/out/dhatus_failed_250_500.json")
        );
    }

    #[test]
    fn test_commit_orders_records_and_writes_failures() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path(), "dhatus");
        let range = BatchRange::new(0, 4);

        let outcome = store
            .commit(range, vec![success(3), failure(2), success(0), success(1)])
            .unwrap();

        assert_eq!(outcome.records, 3);
        assert_eq!(outcome.failures, 1);
        assert!(store.is_materialized(range));

        let content = std::fs::read_to_string(&outcome.output_path).unwrap();
        let heads: Vec<&str> = content
            .split("\n\n")
            .map(|block| block.lines().next().unwrap())
            .collect();
        assert_eq!(
            heads,
            vec![
                "[0] https://example.org/0",
                "[1] https://example.org/1",
                "[3] https://example.org/3"
            ]
        );

        let failures = FailureStore::load(outcome.failure_path.as_ref().unwrap()).unwrap();
        assert_eq!(failures.entries()[0].index, 2);
    }

    #[test]
    fn test_commit_without_failures_removes_stale_failure_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path(), "dhatus");
        let range = BatchRange::new(0, 1);
        std::fs::write(store.failure_path(range), "[\"stale\"]").unwrap();

        let outcome = store.commit(range, vec![success(0)]).unwrap();
        assert!(outcome.failure_path.is_none());
        assert!(!store.failure_path(range).exists());
    }
}
