use super::record::RegistryRecord;

/// 单次查询尝试的原始结果（尚未分类）
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutcome {
    /// 找到一条或多条记录
    Records(Vec<RegistryRecord>),
    /// 正常的零匹配
    Empty,
    /// 非 2xx 响应或自动化层失败
    TransportError { code: Option<u16>, reason: String },
    /// 凭据被拒绝
    AuthError(String),
    /// 其他意外失败（网络、超时、解析）
    Exception(String),
}

impl RawOutcome {
    /// 由 HTTP 状态码构造传输错误
    pub fn http(code: u16, reason: impl Into<String>) -> Self {
        RawOutcome::TransportError {
            code: Some(code),
            reason: reason.into(),
        }
    }

    /// 认证失败会让后续所有查询以同样方式失败
    pub fn is_auth_error(&self) -> bool {
        matches!(self, RawOutcome::AuthError(_))
    }

    /// 是否值得再试一次：异常、超时、限流、5xx
    pub fn is_retryable(&self) -> bool {
        match self {
            RawOutcome::Exception(_) => true,
            RawOutcome::TransportError { code: Some(code), .. } => {
                *code == 408 || *code == 429 || (500..600).contains(code)
            }
            RawOutcome::TransportError { code: None, .. } => true,
            RawOutcome::Records(_) | RawOutcome::Empty | RawOutcome::AuthError(_) => false,
        }
    }
}

impl std::fmt::Display for RawOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawOutcome::Records(records) => write!(f, "{} 条记录", records.len()),
            RawOutcome::Empty => write!(f, "无结果"),
            RawOutcome::TransportError { code: Some(code), reason } => {
                write!(f, "HTTP {} ({})", code, reason)
            }
            RawOutcome::TransportError { code: None, reason } => write!(f, "传输错误: {}", reason),
            RawOutcome::AuthError(reason) => write!(f, "认证失败: {}", reason),
            RawOutcome::Exception(message) => write!(f, "异常: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(RawOutcome::http(503, "Service Unavailable").is_retryable());
        assert!(RawOutcome::http(429, "Too Many Requests").is_retryable());
        assert!(RawOutcome::Exception("timeout".into()).is_retryable());
        assert!(!RawOutcome::http(404, "Not Found").is_retryable());
        assert!(!RawOutcome::Empty.is_retryable());
        assert!(!RawOutcome::AuthError("401".into()).is_retryable());
    }
}
