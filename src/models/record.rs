//! 抽取结果模型

use std::fmt::Display;

use crate::models::task::Task;

/// 记录块结尾的分隔线
pub const RECORD_RULE_WIDTH: usize = 60;

/// 统一形状的结构化文本记录：标题行 + 表格段 + 可选信息段
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuredText {
    pub index: usize,
    pub locator: String,
    pub heading_label: String,
    pub heading: String,
    pub table: Vec<String>,
    pub info: Vec<String>,
}

impl StructuredText {
    /// 创建一个只有标识信息、字段全部为空的记录
    pub fn empty(task: &Task, heading_label: impl Into<String>) -> Self {
        Self {
            index: task.index,
            locator: task.locator.clone(),
            heading_label: heading_label.into(),
            ..Default::default()
        }
    }
}

impl Display for StructuredText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[{}] {}", self.index, self.locator)?;
        writeln!(f, "{}: {}", self.heading_label, self.heading)?;
        writeln!(f, "<<TABLE>>")?;
        for row in &self.table {
            writeln!(f, "{}", row)?;
        }
        writeln!(f, "</TABLE>")?;
        if !self.info.is_empty() {
            writeln!(f, "<<INFO>>")?;
            for line in &self.info {
                writeln!(f, "{}", line)?;
            }
            writeln!(f, "</INFO>")?;
        }
        write!(f, "{}", "-".repeat(RECORD_RULE_WIDTH))
    }
}

/// 单个任务的最终结果，每个任务恰好产生一个
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Success {
        index: usize,
        record: StructuredText,
    },
    Failure {
        index: usize,
        locator: String,
        cause: String,
    },
}

impl ExtractionResult {
    pub fn failure(task: &Task, cause: impl Into<String>) -> Self {
        ExtractionResult::Failure {
            index: task.index,
            locator: task.locator.clone(),
            cause: cause.into(),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ExtractionResult::Success { index, .. } | ExtractionResult::Failure { index, .. } => {
                *index
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_full_record() {
        let record = StructuredText {
            index: 3,
            locator: "https://example.org/shabda/3".to_string(),
            heading_label: "Sanskrit Header".to_string(),
            heading: "१ राम पुंलिङ्ग".to_string(),
            table: vec!["रामः\tरामौ\tरामाः".to_string()],
            info: vec!["Kosha Name: amara".to_string()],
        };

        let expected = format!(
            "[3] https://example.org/shabda/3\n\
             Sanskrit Header: १ राम पुंलिङ्ग\n\
             <<TABLE>>\n\
             रामः\tरामौ\tरामाः\n\
             </TABLE>\n\
             <<INFO>>\n\
             Kosha Name: amara\n\
             </INFO>\n\
             {}",
            "-".repeat(60)
        );
        assert_eq!(record.to_string(), expected);
    }

    #[test]
    fn test_render_omits_empty_info_and_keeps_empty_table() {
        let task = Task::new(0, "u");
        let rendered = StructuredText::empty(&task, "Heading").to_string();

        assert!(rendered.starts_with("[0] u\nHeading: \n<<TABLE>>\n</TABLE>\n"));
        assert!(!rendered.contains("<<INFO>>"));
        assert!(!rendered.contains("\n\n"));
    }
}
