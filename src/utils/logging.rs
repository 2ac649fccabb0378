/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::models::{LookupTable, RowStatus};

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 本次运行的配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 CRO 编号查询 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📡 传输策略: {:?}", config.transport_strategy);
    info!("🏷️ 实体类型: {}", config.entity_type_filter);
    info!("{}", "=".repeat(60));
}

/// 记录规范化后的编号数量
pub fn log_identifiers_loaded(total: usize) {
    info!("✓ 共 {} 个待查询编号", total);
    info!("💡 逐个串行查询\n");
}

/// 记录进度
///
/// # 参数
/// - `done`: 已完成的编号数
/// - `total`: 编号总数
pub fn log_progress(done: usize, total: usize) {
    let percent = if total == 0 { 100 } else { done * 100 / total };
    info!("📊 进度: {}/{} ({}%)", done, total, percent);
}

/// 打印最终统计信息
///
/// # 参数
/// - `table`: 查询结果表
/// - `output_path`: 结果 CSV 的路径
pub fn print_final_stats(table: &LookupTable, output_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 查询完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 找到: {}", table.count(RowStatus::Found));
    info!("🔎 未找到: {}", table.count(RowStatus::NotFound));
    info!("❌ 失败: {}", table.count(RowStatus::Error));
    if table.halted_on_auth {
        info!("⏭️ 跳过 (认证失败): {}", table.count(RowStatus::Skipped));
    }
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最多保留的字符数
///
/// # 返回
/// 超长时截断并追加 "..."
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
