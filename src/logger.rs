//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 安装全局 tracing subscriber
///
/// 默认级别 info（`verbose` 时为 debug），`RUST_LOG` 可覆盖。
/// 重复调用不会报错，方便测试中使用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cro_entity_lookup={},warn", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
