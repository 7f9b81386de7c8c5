/// 日志工具模块
///
/// 提供日志初始化、启动横幅和最终统计的输出函数
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::orchestrator::RunSummary;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时默认 `info`，`verbose` 时为 `debug`。
/// 重复调用（例如在测试中）不会出错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 汉字练习纸生成");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📊 最大并发数: {}", config.max_concurrent_fetches);
    info!("📖 词典来源: {}", config.cedict_source);
    info!("{}", "=".repeat(60));
}

/// 记录汉字加载信息
///
/// # 参数
/// - `total`: 待处理汉字数
/// - `rejected`: 被拒绝的非汉字字符数
/// - `duplicates`: 去掉的重复汉字数
pub fn log_characters_loaded(total: usize, rejected: usize, duplicates: usize) {
    info!("✓ 共 {} 个待处理的汉字", total);
    if rejected > 0 {
        info!("🚫 {} 个非汉字字符已忽略", rejected);
    }
    if duplicates > 0 {
        info!("🔁 {} 个重复汉字已去除", duplicates);
    }
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RunSummary) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 完整: {}/{}", summary.complete.len(), summary.total);
    info!("🟡 部分: {}", summary.partial.len());
    for (character, missing) in &summary.partial {
        let names: Vec<&str> = missing.iter().map(|k| k.label()).collect();
        info!("   '{}' 缺少 {}", character, names.join("、"));
    }
    info!("⏭️ 跳过: {}", summary.skipped.len());
    for (character, reason) in &summary.skipped {
        info!("   '{}' {}", character, reason);
    }
    info!("🚫 非汉字输入: {}", summary.rejected.len());
    info!("{}", "=".repeat(60));
    match &summary.output_path {
        Some(path) => info!("\n练习纸已保存至: {}", path.display()),
        None => info!("\n没有生成输出文件"),
    }
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

/// 错误及其全部 source，用 `: ` 连接
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
