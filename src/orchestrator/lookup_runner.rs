//! 批量查询驱动 - 编排层
//!
//! 按规范化顺序逐个处理编号（严格串行），累积结果行，汇报进度。
//! 认证失败时不再发出任何请求，剩余编号各得到一行 "Skipped"。

use tracing::{error, info, warn};

use crate::clients::RegistryClient;
use crate::models::{EntityTypeFilter, Identifier, LookupTable, RowStatus};
use crate::services::classifier;
use crate::utils::logging;
use crate::workflow::{LookupCtx, LookupFlow, QueryPolicy};

/// 对整个编号列表执行查询
///
/// 单个编号的失败只会变成结果行，不会中断运行；
/// `progress(done, total)` 在每个编号完成后调用，只用于展示。
pub async fn run_lookup<P>(
    client: &dyn RegistryClient,
    identifiers: &[Identifier],
    filter: EntityTypeFilter,
    policy: QueryPolicy,
    mut progress: P,
) -> LookupTable
where
    P: FnMut(usize, usize) + Send,
{
    let total = identifiers.len();
    let flow = LookupFlow::new(client, policy);
    let mut table = LookupTable::default();
    let mut queries_issued = 0usize;

    info!("🔍 使用 {} 查询 {} 个编号 (类型: {})", client.name(), total, filter);

    for (index, identifier) in identifiers.iter().enumerate() {
        let ctx = LookupCtx::new(identifier.clone(), index + 1, total);
        let output = flow.run(&ctx, filter).await;
        queries_issued += output.queries_issued;

        let classification = output.classification;
        log_rows(&ctx, &classification.rows);
        table.rows.extend(classification.rows);

        progress(index + 1, total);
        logging::log_progress(index + 1, total);

        if classification.fatal {
            error!("{} ❌ 认证失败，停止剩余 {} 个编号的查询", ctx, total - index - 1);
            table
                .rows
                .extend(identifiers[index + 1..].iter().map(classifier::skipped));
            table.halted_on_auth = true;
            break;
        }
    }

    info!("共发出 {} 次请求", queries_issued);
    table
}

fn log_rows(ctx: &LookupCtx, rows: &[crate::models::ResultRow]) {
    for row in rows {
        match row.status {
            RowStatus::Found => {
                let name = row.record.as_ref().map(|r| r.name.as_str()).unwrap_or_default();
                info!("{} ✓ {}", ctx, logging::truncate_text(name, 60));
            }
            RowStatus::NotFound => info!("{} 未找到", ctx),
            RowStatus::Error | RowStatus::Skipped => {
                warn!("{} ⚠️ {}", ctx, row.error.as_deref().unwrap_or_default());
            }
        }
    }
}
