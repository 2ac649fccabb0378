//! 查询上下文
//!
//! 封装"我正在查第几个编号"这一信息

use std::fmt::Display;

use crate::models::Identifier;

/// 单个编号的查询上下文
#[derive(Debug, Clone)]
pub struct LookupCtx {
    pub identifier: Identifier,
    /// 在规范化列表中的位置（从 1 开始，仅用于日志）
    pub position: usize,
    pub total: usize,
}

impl LookupCtx {
    pub fn new(identifier: Identifier, position: usize, total: usize) -> Self {
        Self {
            identifier,
            position,
            total,
        }
    }
}

impl Display for LookupCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{} 编号#{}]", self.position, self.total, self.identifier)
    }
}
