//! 失败集合存取服务 - 业务能力层
//!
//! 只负责失败文件的读写，不关心批次或重试流程

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::failure::FailureSet;
use crate::utils::fs::write_atomic;

/// 失败文件存取
pub struct FailureStore;

impl FailureStore {
    /// 写入（覆盖）失败文件
    pub fn write(path: &Path, failures: &FailureSet) -> AppResult<()> {
        debug!("写入失败文件: {} ({} 条)", path.display(), failures.len());
        let json = serde_json::to_string_pretty(failures)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        write_atomic(path, json.as_bytes())
    }

    /// 读取失败文件
    pub fn load(path: &Path) -> AppResult<FailureSet> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::file_parse_failed(path.display().to_string(), e))
    }

    /// 列出目录中仍有未解决条目的失败文件，按文件名排序
    pub fn outstanding(dir: &Path, prefix: &str) -> AppResult<Vec<PathBuf>> {
        let marker = format!("{}_failed_", prefix);
        let entries = std::fs::read_dir(dir)
            .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("无法读取目录项 {}: {}", dir.display(), e);
                    continue;
                }
            };
            let is_failure_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&marker) && n.ends_with(".json"));
            if !is_failure_file {
                continue;
            }
            match Self::load(&path) {
                Ok(set) if !set.is_empty() => paths.push(path),
                Ok(_) => {}
                Err(e) => warn!("无法读取失败文件 {}: {}", path.display(), e),
            }
        }
        paths.sort();
        Ok(paths)
    }
}
