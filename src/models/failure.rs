//! 失败集合
//!
//! 每个批次最多一个失败文件，只由重试流程整体消费。

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::record::ExtractionResult;
use crate::models::task::Task;

/// 一条失败的链接
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedLocator {
    pub index: usize,
    pub locator: String,
}

/// 有序的失败链接集合
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FailureSet {
    entries: Vec<FailedLocator>,
}

impl FailureSet {
    pub fn new(mut entries: Vec<FailedLocator>) -> Self {
        entries.sort_by_key(|e| e.index);
        Self { entries }
    }

    /// 从一批结果中收集失败项，按索引排序
    pub fn from_results(results: &[ExtractionResult]) -> Self {
        let entries = results
            .iter()
            .filter_map(|r| match r {
                ExtractionResult::Failure { index, locator, .. } => Some(FailedLocator {
                    index: *index,
                    locator: locator.clone(),
                }),
                ExtractionResult::Success { .. } => None,
            })
            .collect();
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FailedLocator] {
        &self.entries
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.entries
            .iter()
            .map(|e| Task::new(e.index, e.locator.clone()))
            .collect()
    }
}

/// 旧格式只有链接字符串，索引取其在列表中的位置
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Pair { index: usize, locator: String },
    Bare(String),
}

impl<'de> Deserialize<'de> for FailureSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let stored = Vec::<StoredEntry>::deserialize(deserializer)?;
        let entries = stored
            .into_iter()
            .enumerate()
            .map(|(position, entry)| match entry {
                StoredEntry::Pair { index, locator } => FailedLocator { index, locator },
                StoredEntry::Bare(locator) => FailedLocator {
                    index: position,
                    locator,
                },
            })
            .collect();
        Ok(Self::new(entries))
    }
}
