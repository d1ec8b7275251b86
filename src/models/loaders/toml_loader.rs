use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::schema::ExtractionSchema;

const SHABDA_SCHEMA: &str = include_str!("../../../schemas/shabda.toml");
const DHATU_SCHEMA: &str = include_str!("../../../schemas/dhatu.toml");

/// 按名称或路径加载抽取模板
///
/// 先匹配内置模板名，否则把参数当作 TOML 文件路径。
pub fn load_schema(name_or_path: &str) -> AppResult<ExtractionSchema> {
    match preset_schema(name_or_path) {
        Some(schema) => schema,
        None => {
            let path = Path::new(name_or_path);
            if !path.exists() {
                return Err(AppError::Config(ConfigError::UnknownSchema {
                    name: name_or_path.to_string(),
                }));
            }
            load_schema_file(path)
        }
    }
}

/// 内置模板
pub fn preset_schema(name: &str) -> Option<AppResult<ExtractionSchema>> {
    let source = match name {
        "shabda" => SHABDA_SCHEMA,
        "dhatu" => DHATU_SCHEMA,
        _ => return None,
    };
    Some(toml::from_str(source).map_err(|e| AppError::file_parse_failed(name, e)))
}

/// 从 TOML 文件加载抽取模板
pub fn load_schema_file(path: &Path) -> AppResult<ExtractionSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    let schema: ExtractionSchema = toml::from_str(&content)
        .map_err(|e| AppError::file_parse_failed(path.display().to_string(), e))?;
    tracing::info!("已加载抽取模板: {} ({})", schema.name, path.display());
    Ok(schema)
}
