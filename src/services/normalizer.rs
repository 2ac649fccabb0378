//! 编号规范化 - 业务能力层
//!
//! 把用户随手粘贴的文本或上传表格的一列，整理成干净、去重、保序的编号列表

use crate::error::{AppResult, InputError};
use crate::models::Identifier;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

static SEPARATORS: OnceLock<Regex> = OnceLock::new();

/// `,` 和换行都是分隔符，连续的分隔符视为一个
fn separators() -> &'static Regex {
    SEPARATORS.get_or_init(|| Regex::new(r"[,\r\n]+").expect("分隔符正则无效"))
}

/// 规范化自由文本输入
pub fn normalize_text(raw: &str) -> AppResult<Vec<Identifier>> {
    normalize_cells(std::iter::once(raw))
}

/// 规范化已拆分的输入（如 CSV 的一列），每个单元格再按同样规则拆分
pub fn normalize_cells<I, S>(cells: I) -> AppResult<Vec<Identifier>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut identifiers = Vec::new();
    let mut dropped = 0usize;

    for cell in cells {
        for token in separators().split(cell.as_ref()) {
            let Some(identifier) = Identifier::new(token) else {
                continue;
            };
            if seen.insert(identifier.dedup_key()) {
                identifiers.push(identifier);
            } else {
                dropped += 1;
            }
        }
    }

    if identifiers.is_empty() {
        return Err(InputError::NoIdentifiers.into());
    }

    debug!("规范化完成: {} 个编号, 去掉 {} 个重复", identifiers.len(), dropped);
    Ok(identifiers)
}

/// 把编号列表写回文本（每行一个），可再次输入规范化器
pub fn to_text(identifiers: &[Identifier]) -> String {
    identifiers
        .iter()
        .map(Identifier::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}
