//! 文件写入工具

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{AppError, AppResult};

/// 原子写入：先写同目录下的临时文件，再重命名到目标路径
///
/// 中途中断只会留下临时文件，目标路径要么不存在，要么内容完整。
pub fn write_atomic(path: &Path, content: &[u8]) -> AppResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let display = path.display().to_string();

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| AppError::directory_unavailable(dir.display().to_string(), e))?;
    tmp.write_all(content)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| AppError::file_write_failed(display.clone(), e))?;
    tmp.persist(path)
        .map_err(|e| AppError::file_write_failed(display, e.error))?;
    Ok(())
}

/// 确保目录存在
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    std::fs::create_dir_all(path)
        .map_err(|e| AppError::directory_unavailable(path.display().to_string(), e))
}
