use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// 程序配置
///
/// 在入口处构建一次，此后只读地传入流水线。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 链接列表文件（JSON 字符串数组）
    pub locator_file: PathBuf,
    /// 批次输出目录
    pub output_dir: PathBuf,
    /// 输出文件名前缀
    pub file_prefix: String,
    /// 抽取模板：内置名称（shabda / dhatu）或 TOML 文件路径
    pub schema: String,
    /// 起始索引（含）
    pub start_index: usize,
    /// 结束索引（不含），缺省为列表长度
    pub end_index: Option<usize>,
    /// 每个检查点批次的宽度
    pub batch_width: usize,
    /// 同时持有渲染会话的最大任务数
    pub max_workers: usize,
    /// 等待页面就绪的超时（秒）
    pub wait_timeout_secs: u64,
    /// 页面就绪后的稳定等待（毫秒）
    pub settle_delay_ms: u64,
    /// 每个任务结束后的节流等待（毫秒）
    pub pacing_delay_ms: u64,
    /// 是否以无头模式启动浏览器
    pub headless: bool,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locator_file: PathBuf::from("all_dhatu_links.json"),
            output_dir: PathBuf::from("dhatu_scraped_chunks"),
            file_prefix: "dhatus".to_string(),
            schema: "dhatu".to_string(),
            start_index: 0,
            end_index: None,
            batch_width: 250,
            max_workers: 5,
            wait_timeout_secs: 100,
            settle_delay_ms: 1000,
            pacing_delay_ms: 2000,
            headless: true,
            chrome_executable: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从 TOML 文件加载，未出现的字段取默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        toml::from_str(&content)
            .map_err(|e| AppError::file_parse_failed(path.display().to_string(), e))
    }

    /// 仅使用默认值与环境变量
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 用 `HARVEST_*` 环境变量覆盖当前配置，无法解析的值被忽略
    pub fn with_env(self) -> Self {
        Self {
            locator_file: env_or("HARVEST_LOCATOR_FILE", self.locator_file),
            output_dir: env_or("HARVEST_OUTPUT_DIR", self.output_dir),
            file_prefix: env_or("HARVEST_FILE_PREFIX", self.file_prefix),
            schema: env_or("HARVEST_SCHEMA", self.schema),
            start_index: env_or("HARVEST_START_INDEX", self.start_index),
            end_index: env_parse("HARVEST_END_INDEX").or(self.end_index),
            batch_width: env_or("HARVEST_BATCH_WIDTH", self.batch_width),
            max_workers: env_or("HARVEST_MAX_WORKERS", self.max_workers),
            wait_timeout_secs: env_or("HARVEST_WAIT_TIMEOUT_SECS", self.wait_timeout_secs),
            settle_delay_ms: env_or("HARVEST_SETTLE_DELAY_MS", self.settle_delay_ms),
            pacing_delay_ms: env_or("HARVEST_PACING_DELAY_MS", self.pacing_delay_ms),
            headless: env_or("HARVEST_HEADLESS", self.headless),
            chrome_executable: env_parse("HARVEST_CHROME_EXECUTABLE").or(self.chrome_executable),
            verbose_logging: env_or("VERBOSE_LOGGING", self.verbose_logging),
        }
    }

    /// 校验配置的取值
    pub fn validate(&self) -> AppResult<()> {
        if self.max_workers == 0 {
            return Err(AppError::invalid_config("max_workers", "必须大于 0"));
        }
        if self.batch_width == 0 {
            return Err(AppError::invalid_config("batch_width", "必须大于 0"));
        }
        if let Some(end) = self.end_index {
            if self.start_index > end {
                return Err(AppError::invalid_config(
                    "start_index",
                    format!("起始索引 {} 大于结束索引 {}", self.start_index, end),
                ));
            }
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_or<T: FromStr>(name: &str, fallback: T) -> T {
    env_parse(name).unwrap_or(fallback)
}
