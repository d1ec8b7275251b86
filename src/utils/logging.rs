/// 日志工具模块
///
/// 提供进度与统计信息的格式化输出
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Config;
use crate::models::batch::BatchRange;
use crate::orchestrator::{RetryOutcome, RunSummary};
use crate::services::BatchOutcome;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批次检查点抓取模式");
    info!(
        "📅 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📊 最大并发数: {}", config.max_workers);
    info!("📦 批次宽度: {}", config.batch_width);
    info!("🧩 抽取模板: {}", config.schema);
    info!("📁 输出目录: {}", config.output_dir.display());
    info!("{}", "=".repeat(60));
}

/// 记录链接加载信息
pub fn log_locators_loaded(total: usize, range: BatchRange, batch_width: usize) {
    info!("✓ 共读取 {} 个链接", total);
    info!(
        "📋 本次处理范围 {} ({} 个)，每批 {} 个",
        range,
        range.len(),
        batch_width
    );
    info!("💡 已存在的批次文件会被跳过\n");
}

/// 记录批次开始信息
pub fn log_batch_start(batch_num: usize, total_batches: usize, batch: BatchRange, range: BatchRange) {
    info!("\n{}", "=".repeat(60));
    info!("🚧 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批链接: {} / 范围 {}", batch, range);
    info!("{}", "=".repeat(60));
}

/// 记录批次跳过信息
pub fn log_batch_skipped(batch_num: usize, total_batches: usize, batch: BatchRange, path: &Path) {
    info!(
        "⏭️ 跳过第 {}/{} 批 {}: 已存在 {}",
        batch_num,
        total_batches,
        batch,
        path.display()
    );
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, outcome: &BatchOutcome) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成: 成功 {}/{}",
        batch_num,
        outcome.records,
        outcome.records + outcome.failures
    );
    info!("💾 {}", outcome.output_path.display());
    if let Some(path) = &outcome.failure_path {
        info!("⚠️ 失败 {} 个: {}", outcome.failures, path.display());
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `summary`: 本轮运行统计
/// - `outstanding`: 输出目录中仍有未解决条目的失败文件
pub fn print_final_stats(summary: &RunSummary, outstanding: &[PathBuf]) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!(
        "📦 批次: 写入 {} / 跳过 {} / 共 {}",
        summary.batches_written, summary.batches_skipped, summary.batches_total
    );
    info!("✅ 抽取记录: {}", summary.records);
    info!("❌ 本轮失败: {}", summary.failures);
    if outstanding.is_empty() {
        info!("🎉 没有未解决的失败文件");
    } else {
        warn!("⚠️ 未解决的失败文件 {} 个:", outstanding.len());
        for path in outstanding {
            warn!("   → {}", path.display());
        }
    }
    info!("{}", "=".repeat(60));
}

/// 打印重试统计信息
pub fn print_retry_stats(outcomes: &[RetryOutcome]) {
    info!("\n{}", "=".repeat(60));
    info!("📊 重试完成统计");
    info!("{}", "=".repeat(60));
    for outcome in outcomes {
        info!(
            "{}: 重试 {} / 恢复 {} / 仍失败 {}",
            outcome.failure_path.display(),
            outcome.attempted,
            outcome.recovered,
            outcome.still_failed
        );
        if let Some(path) = &outcome.output_path {
            info!("   💾 {}", path.display());
        }
    }
    let recovered: usize = outcomes.iter().map(|o| o.recovered).sum();
    let still_failed: usize = outcomes.iter().map(|o| o.still_failed).sum();
    info!("✅ 恢复: {}", recovered);
    info!("❌ 仍失败: {}", still_failed);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("रामः", 10), "रामः");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
    }
}
