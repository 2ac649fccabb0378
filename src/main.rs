use anyhow::Result;
use tracing::warn;

use cro_entity_lookup::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logger::init(config.verbose_logging);

    // 运行应用
    match App::new(config).run().await {
        Ok(_) => Ok(()),
        Err(e) if e.is_blocking() => {
            warn!("⚠️ {}", e);
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
