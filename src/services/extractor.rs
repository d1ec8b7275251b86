//! 记录抽取服务 - 业务能力层
//!
//! 纯函数：渲染后的页面内容 → 一条 [`StructuredText`]。
//! 抽取不会失败，缺失的字段以空字符串/空段落输出。

use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppResult, ConfigError};
use crate::models::record::StructuredText;
use crate::models::schema::{ExtractionSchema, InfoRules, TableRules};
use crate::models::task::Task;
use crate::services::noise::{KeywordNoiseFilter, NoiseFilter};

/// 记录抽取器
///
/// 由 [`ExtractionSchema`] 编译而来，所有选择器在构造时解析完毕。
pub struct RecordExtractor {
    schema_name: String,
    readiness_selector: String,
    heading_label: String,
    heading: Selector,
    heading_parts: Vec<Selector>,
    table: CompiledTable,
    info: Option<CompiledInfo>,
    noise: Arc<dyn NoiseFilter>,
}

struct CompiledTable {
    section: Selector,
    section_header: Option<Selector>,
    rows: Selector,
    cells: Selector,
    fragments: Option<Selector>,
    fragment_separator: String,
    cell_separator: String,
    row_indent: String,
}

struct CompiledInfo {
    label: Selector,
    value: Selector,
    container: Option<Selector>,
    bare_label: Option<Selector>,
    bare_label_name: String,
    detail: Option<Selector>,
    detail_name: String,
    detail_min_chars: usize,
}

impl RecordExtractor {
    /// 编译模板，选择器或正则无效时返回配置错误
    pub fn compile(schema: &ExtractionSchema) -> AppResult<Self> {
        let name = schema.name.as_str();
        // 就绪信号在浏览器端使用，这里仅校验语法
        parse_selector(name, &schema.readiness_selector)?;

        Ok(Self {
            schema_name: schema.name.clone(),
            readiness_selector: schema.readiness_selector.clone(),
            heading_label: schema.heading_label.clone(),
            heading: parse_selector(name, &schema.heading.selector)?,
            heading_parts: schema
                .heading
                .parts
                .iter()
                .map(|css| parse_selector(name, css))
                .collect::<AppResult<_>>()?,
            table: CompiledTable::compile(name, &schema.table)?,
            info: schema
                .info
                .as_ref()
                .map(|rules| CompiledInfo::compile(name, rules))
                .transpose()?,
            noise: Arc::new(KeywordNoiseFilter::from_rules(name, &schema.noise)?),
        })
    }

    /// 替换噪声过滤器
    pub fn with_noise_filter(mut self, noise: Arc<dyn NoiseFilter>) -> Self {
        self.noise = noise;
        self
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn readiness_selector(&self) -> &str {
        &self.readiness_selector
    }

    /// 从渲染内容中抽取记录
    pub fn extract(&self, task: &Task, content: &str) -> StructuredText {
        let document = Html::parse_document(content);
        let mut record = StructuredText::empty(task, self.heading_label.as_str());

        record.heading = self.extract_heading(&document);
        record.table = self.extract_table(&document);
        if let Some(info) = &self.info {
            record.info = self.extract_info(info, &document);
        }
        record
    }

    fn extract_heading(&self, document: &Html) -> String {
        let Some(block) = document.select(&self.heading).next() else {
            return String::new();
        };

        if self.heading_parts.is_empty() {
            return collapsed_text(block);
        }

        self.heading_parts
            .iter()
            .filter_map(|part| block.select(part).next())
            .map(stripped_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn extract_table(&self, document: &Html) -> Vec<String> {
        let table = &self.table;
        let mut lines = Vec::new();

        for section in document.select(&table.section) {
            if let Some(header_selector) = &table.section_header {
                if let Some(header) = section.select(header_selector).next() {
                    let text = stripped_text(header);
                    if self.noise.is_noise(&text) {
                        continue;
                    }
                    if !text.is_empty() {
                        lines.push(text);
                    }
                }
            }

            for row in section.select(&table.rows) {
                let cells: Vec<String> = row
                    .select(&table.cells)
                    .map(|cell| table.cell_text(cell))
                    .collect();
                if cells.iter().all(|c| c.is_empty()) {
                    continue;
                }
                lines.push(format!(
                    "{}{}",
                    table.row_indent,
                    cells.join(&table.cell_separator)
                ));
            }
        }

        lines
    }

    fn extract_info(&self, info: &CompiledInfo, document: &Html) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        let mut push = |line: String| {
            if !lines.contains(&line) {
                lines.push(line);
            }
        };

        for label in document.select(&info.label) {
            let value = label
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|sibling| info.value.matches(sibling));
            if let Some(value) = value {
                push(format!("{}: {}", stripped_text(label), stripped_text(value)));
            }
        }

        if let Some(container) = &info.container {
            for block in document.select(container) {
                let label = block.select(&info.label).next();
                let value = block.select(&info.value).next();
                if let (Some(label), Some(value)) = (label, value) {
                    push(format!("{}: {}", stripped_text(label), stripped_text(value)));
                }
            }
        }

        if let Some(bare) = &info.bare_label {
            for block in document.select(bare) {
                if block.select(&info.value).next().is_some() {
                    continue;
                }
                let text = stripped_text(block);
                if !text.is_empty() && !self.noise.is_noise(&text) {
                    push(format!("{}: {}", info.bare_label_name, text));
                }
            }
        }

        if let Some(detail) = &info.detail {
            for span in document.select(detail) {
                let text = stripped_text(span);
                if text.chars().count() > info.detail_min_chars {
                    push(format!("{}: {}", info.detail_name, text));
                }
            }
        }

        lines
    }
}

impl CompiledTable {
    fn compile(schema: &str, rules: &TableRules) -> AppResult<Self> {
        Ok(Self {
            section: parse_selector(schema, &rules.section)?,
            section_header: parse_optional(schema, rules.section_header.as_deref())?,
            rows: parse_selector(schema, &rules.rows)?,
            cells: parse_selector(schema, &rules.cells)?,
            fragments: parse_optional(schema, rules.fragments.as_deref())?,
            fragment_separator: rules.fragment_separator.clone(),
            cell_separator: rules.cell_separator.clone(),
            row_indent: rules.row_indent.clone(),
        })
    }

    fn cell_text(&self, cell: ElementRef<'_>) -> String {
        match &self.fragments {
            Some(fragments) => cell
                .select(fragments)
                .map(stripped_text)
                .collect::<Vec<_>>()
                .join(&self.fragment_separator),
            None => stripped_text(cell),
        }
    }
}

impl CompiledInfo {
    fn compile(schema: &str, rules: &InfoRules) -> AppResult<Self> {
        Ok(Self {
            label: parse_selector(schema, &rules.label)?,
            value: parse_selector(schema, &rules.value)?,
            container: parse_optional(schema, rules.container.as_deref())?,
            bare_label: parse_optional(schema, rules.bare_label.as_deref())?,
            bare_label_name: rules.bare_label_name.clone(),
            detail: parse_optional(schema, rules.detail.as_deref())?,
            detail_name: rules.detail_name.clone(),
            detail_min_chars: rules.detail_min_chars,
        })
    }
}

fn parse_selector(schema: &str, css: &str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| {
        ConfigError::InvalidSelector {
            schema: schema.to_string(),
            selector: css.to_string(),
            reason: format!("{:?}", e),
        }
        .into()
    })
}

fn parse_optional(schema: &str, css: Option<&str>) -> AppResult<Option<Selector>> {
    css.map(|css| parse_selector(schema, css)).transpose()
}

/// 各文本片段折叠空白后直接拼接，结果不含换行
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
        .collect()
}

/// 所有空白折叠为单个空格
fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
