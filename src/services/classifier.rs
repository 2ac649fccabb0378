//! 结果分类与合并 - 业务能力层
//!
//! 把单次查询的 [`RawOutcome`] 变成结果行，并把同一编号的多个子查询合并

use crate::models::{EntityTypeFilter, Identifier, RawOutcome, RegistryRecord, ResultRow, RowStatus};
use tracing::debug;

/// 认证失败行的错误描述
pub const AUTH_FAILED: &str = "Authentication failed";
/// 认证失败后未查询编号的错误描述
pub const SKIPPED_AUTH_FAILED: &str = "Skipped - authentication failed";

/// 分类结果
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// 至少一行
    pub rows: Vec<ResultRow>,
    /// 认证失败，后续查询都会以同样方式失败
    pub fatal: bool,
}

/// 对单次查询结果分类
pub fn classify(identifier: &Identifier, filter: EntityTypeFilter, outcome: RawOutcome) -> Classification {
    let searched = identifier.as_str();

    let (rows, fatal) = match outcome {
        RawOutcome::Records(records) if !records.is_empty() => {
            (order_records(records, filter).into_iter().map(|r| ResultRow::found(searched, r)).collect(), false)
        }
        RawOutcome::Records(_) | RawOutcome::Empty => (vec![ResultRow::not_found(searched)], false),
        RawOutcome::AuthError(reason) => {
            debug!("{} 认证失败: {}", searched, reason);
            (vec![ResultRow::failed(searched, AUTH_FAILED)], true)
        }
        RawOutcome::TransportError { code: Some(code), .. } => {
            (vec![ResultRow::failed(searched, format!("HTTP {}", code))], false)
        }
        RawOutcome::TransportError { code: None, reason } => (vec![ResultRow::failed(searched, reason)], false),
        RawOutcome::Exception(message) => (vec![ResultRow::failed(searched, message)], false),
    };

    Classification { rows, fatal }
}

/// 合并同一编号的子查询结果（按子查询顺序：Company 在 Business 之前）
///
/// 只要有一行不是 Not Found，就去掉所有 Not Found 占位行；
/// 全部为空时只保留一行 Not Found。
pub fn merge(identifier: &Identifier, parts: Vec<Classification>) -> Classification {
    let fatal = parts.iter().any(|p| p.fatal);
    let all_rows: Vec<ResultRow> = parts.into_iter().flat_map(|p| p.rows).collect();

    let informative: Vec<ResultRow> = all_rows
        .into_iter()
        .filter(|row| row.status != RowStatus::NotFound)
        .collect();

    let rows = if informative.is_empty() {
        vec![ResultRow::not_found(identifier.as_str())]
    } else {
        informative
    };

    Classification { rows, fatal }
}

/// 认证失败后剩余编号的占位行
pub fn skipped(identifier: &Identifier) -> ResultRow {
    ResultRow::skipped(identifier.as_str(), SKIPPED_AUTH_FAILED)
}

/// 单次 Either 查询返回混合类型时，Company 排在 Business 前面（稳定排序）
fn order_records(mut records: Vec<RegistryRecord>, filter: EntityTypeFilter) -> Vec<RegistryRecord> {
    if filter == EntityTypeFilter::Either {
        records.sort_by_key(|r| match r.business_indicator {
            Some(indicator) => indicator as u8,
            None => u8::MAX,
        });
    }
    records
}
