//! 抽取模板
//!
//! 字段名和选择器因来源站点而异，属于数据而不是代码，
//! 因此用 TOML 描述，启动时编译一次。

use serde::Deserialize;

/// 抽取模板的原始描述
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionSchema {
    pub name: String,
    /// 页面就绪信号：该选择器匹配到元素即视为渲染完成
    pub readiness_selector: String,
    /// 标题行的标签
    pub heading_label: String,
    pub heading: HeadingRules,
    pub table: TableRules,
    #[serde(default)]
    pub info: Option<InfoRules>,
    #[serde(default)]
    pub noise: NoiseRules,
}

/// 标题块规则
#[derive(Debug, Clone, Deserialize)]
pub struct HeadingRules {
    pub selector: String,
    /// 标题块内按顺序取出的子元素；为空时取整块文本
    #[serde(default)]
    pub parts: Vec<String>,
}

/// 表格段规则
#[derive(Debug, Clone, Deserialize)]
pub struct TableRules {
    /// 表格分节（一张表或一张卡片）
    pub section: String,
    /// 分节标题，命中噪声过滤时整节跳过
    #[serde(default)]
    pub section_header: Option<String>,
    pub rows: String,
    pub cells: String,
    /// 单元格内的片段，存在时以 `fragment_separator` 连接
    #[serde(default)]
    pub fragments: Option<String>,
    #[serde(default = "default_fragment_separator")]
    pub fragment_separator: String,
    #[serde(default = "default_cell_separator")]
    pub cell_separator: String,
    #[serde(default)]
    pub row_indent: String,
}

/// 信息段规则
#[derive(Debug, Clone, Deserialize)]
pub struct InfoRules {
    /// 标签元素，其后紧邻的 `value` 兄弟元素为值
    pub label: String,
    pub value: String,
    /// 同时包含标签与值的容器
    #[serde(default)]
    pub container: Option<String>,
    /// 只有名称、没有值的块
    #[serde(default)]
    pub bare_label: Option<String>,
    #[serde(default = "default_bare_label_name")]
    pub bare_label_name: String,
    /// 长文本明细
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default = "default_detail_name")]
    pub detail_name: String,
    /// 超过该字符数的文本才被视为明细
    #[serde(default = "default_detail_min_chars")]
    pub detail_min_chars: usize,
}

/// 噪声过滤规则
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoiseRules {
    /// 小写匹配的关键词黑名单
    #[serde(default)]
    pub keywords: Vec<String>,
    /// 有效文本必须匹配的模式，不匹配即视为噪声
    #[serde(default)]
    pub require_pattern: Option<String>,
}

fn default_fragment_separator() -> String {
    " | ".to_string()
}

fn default_cell_separator() -> String {
    "\t".to_string()
}

fn default_bare_label_name() -> String {
    "Name".to_string()
}

fn default_detail_name() -> String {
    "Detail".to_string()
}

fn default_detail_min_chars() -> usize {
    20
}
