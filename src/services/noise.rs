//! 噪声过滤能力 - 业务能力层
//!
//! 前端加载占位、离线提示之类的块不应被当成数据写入记录。
//! 漏判可以接受，这里不追求精确分类。

use regex::Regex;

use crate::error::{AppResult, ConfigError};
use crate::models::schema::NoiseRules;

/// 判断一段文本是否为噪声
pub trait NoiseFilter: Send + Sync {
    fn is_noise(&self, text: &str) -> bool;
}

impl<F> NoiseFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_noise(&self, text: &str) -> bool {
        self(text)
    }
}

/// 基于关键词黑名单（以及可选的必需模式）的过滤器
#[derive(Debug, Clone, Default)]
pub struct KeywordNoiseFilter {
    keywords: Vec<String>,
    require: Option<Regex>,
}

impl KeywordNoiseFilter {
    pub fn new(keywords: impl IntoIterator<Item = impl Into<String>>, require: Option<Regex>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
            require,
        }
    }

    pub fn from_rules(schema_name: &str, rules: &NoiseRules) -> AppResult<Self> {
        let require = match &rules.require_pattern {
            Some(pattern) => Some(Regex::new(pattern).map_err(|e| ConfigError::InvalidSelector {
                schema: schema_name.to_string(),
                selector: pattern.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };
        Ok(Self::new(rules.keywords.iter().cloned(), require))
    }
}

impl NoiseFilter for KeywordNoiseFilter {
    fn is_noise(&self, text: &str) -> bool {
        if let Some(require) = &self.require {
            if !require.is_match(text) {
                return true;
            }
        }
        let lowered = text.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}
