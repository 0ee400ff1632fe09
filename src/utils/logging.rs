//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::models::{Outcome, RunStats, RunStatus};

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时默认 info，`verbose` 为 true 时默认 debug。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录运行开始信息
pub fn log_run_start(expected_old: &str, desired_new: &str, total: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始批量修改");
    info!("🔎 旧值: {}", truncate_text(expected_old, 80));
    info!("✏️ 新值: {}", truncate_text(desired_new, 80));
    info!("📋 列表共 {} 条记录", total);
    info!("{}", "=".repeat(60));
}

/// 记录单条记录开始
pub fn log_record_start(index: usize, total: usize) {
    info!("\n[记录 {}] {}", index, "─".repeat(30));
    info!("[记录 {}] 处理第 {}/{} 条记录", index, index, total);
}

/// 记录单条记录的最终结果
pub fn log_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Success { index, .. } => info!("[记录 {}] ✅ 成功", index),
        Outcome::Failed { index, reason } if reason.is_ambiguous() => {
            warn!("[记录 {}] ❓ 保存未确认，可能已生效: {}", index, reason)
        }
        Outcome::Failed { index, reason } => warn!("[记录 {}] ❌ 失败: {}", index, reason),
        Outcome::Skipped {
            index,
            observed_value,
            reason,
        } => info!(
            "[记录 {}] ⏭️ 跳过 ({}): {}",
            index,
            reason.code(),
            truncate_text(observed_value.as_deref().unwrap_or("<无法读取>"), 80)
        ),
        Outcome::Error { index, message } => warn!("[记录 {}] 💥 错误: {}", index, message),
    }
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &RunStats) {
    let status = match &stats.status {
        RunStatus::Running => "运行中".to_string(),
        RunStatus::Completed => "已完成".to_string(),
        RunStatus::Cancelled => "已停止".to_string(),
        RunStatus::Aborted { message } => format!("已中断: {}", message),
    };
    info!("\n{}", "=".repeat(60));
    info!("📊 批量修改统计 ({})", status);
    if let Some(ended_at) = stats.ended_at {
        info!("完成时间: {}", ended_at.format("%Y-%m-%d %H:%M:%S"));
    }
    info!("耗时: {} 秒", stats.elapsed().num_seconds());
    info!("{}", "=".repeat(60));
    info!("📋 已访问: {}/{}", stats.processed_count, stats.total_count);
    info!("🎯 匹配: {}", stats.matched_count);
    info!("✅ 成功: {}", stats.success_count());
    info!("❌ 失败: {}", stats.failed_count());
    info!("❓ 保存未确认: {}", stats.unconfirmed_count());
    info!("⏭️ 跳过: {}", stats.skipped_count());
    info!("💥 错误: {}", stats.error_count());
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
