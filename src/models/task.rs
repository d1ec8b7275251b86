//! 任务与链接来源
//!
//! `Task` 把"这是原始列表中的第几个链接"这一信息从派发一直带到落盘。

use std::fmt::Display;
use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::batch::BatchRange;

/// 单个抓取任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// 链接在完整列表中的位置，唯一的排序键
    pub index: usize,
    /// 不透明的文档地址
    pub locator: String,
}

impl Task {
    pub fn new(index: usize, locator: impl Into<String>) -> Self {
        Self {
            index,
            locator: locator.into(),
        }
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[#{}]", self.index)
    }
}

/// 链接来源：启动时读取一次的有序链接列表
#[derive(Debug, Clone, Default)]
pub struct LocatorSource {
    locators: Vec<String>,
}

impl LocatorSource {
    pub fn new(locators: Vec<String>) -> Self {
        Self { locators }
    }

    /// 从 JSON 字符串数组文件加载
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let locators: Vec<String> = serde_json::from_str(&content)
            .map_err(|e| AppError::file_parse_failed(path.display().to_string(), e))?;
        Ok(Self { locators })
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// 把配置的 `[start, end)` 归一化到列表范围内
    ///
    /// 结束索引缺省或超过列表长度时取列表长度；起始索引越界则报错。
    pub fn resolve_range(&self, start: usize, end: Option<usize>) -> AppResult<BatchRange> {
        let len = self.locators.len();
        let end = end.map_or(len, |e| e.min(len));
        if start > end {
            return Err(AppError::Config(ConfigError::RangeOutOfBounds { start, end, len }));
        }
        Ok(BatchRange::new(start, end))
    }

    /// 生成某个范围内的全部任务，索引保持为原始位置
    pub fn tasks(&self, range: BatchRange) -> Vec<Task> {
        let end = range.end.min(self.locators.len());
        (range.start..end)
            .map(|index| Task::new(index, self.locators[index].clone()))
            .collect()
    }
}
