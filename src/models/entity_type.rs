use serde::{Deserialize, Serialize};

/// 查询的实体类型过滤器
///
/// 决定每个编号需要发出哪些子查询，默认 `Either`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityTypeFilter {
    /// 公司
    #[serde(alias = "c", alias = "C", alias = "Company")]
    Company,
    /// 商号（Business Name）
    #[serde(alias = "b", alias = "B", alias = "Business")]
    Business,
    /// 两者皆可
    #[default]
    #[serde(alias = "e", alias = "E", alias = "Either", alias = "both")]
    Either,
}

impl EntityTypeFilter {
    /// 获取 `company_bus_ind` 参数代码
    pub fn code(self) -> &'static str {
        match self {
            EntityTypeFilter::Company => "C",
            EntityTypeFilter::Business => "B",
            EntityTypeFilter::Either => "E",
        }
    }

    /// 从代码或名称解析（不区分大小写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "company" => Some(EntityTypeFilter::Company),
            "b" | "business" => Some(EntityTypeFilter::Business),
            "e" | "either" | "both" => Some(EntityTypeFilter::Either),
            _ => None,
        }
    }

    /// 该过滤器是否接受某个类型的记录
    pub fn accepts(self, indicator: BusinessIndicator) -> bool {
        match self {
            EntityTypeFilter::Company => indicator == BusinessIndicator::Company,
            EntityTypeFilter::Business => indicator == BusinessIndicator::Business,
            EntityTypeFilter::Either => true,
        }
    }
}

impl std::fmt::Display for EntityTypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityTypeFilter::Company => "Company",
            EntityTypeFilter::Business => "Business",
            EntityTypeFilter::Either => "Either",
        };
        write!(f, "{}", name)
    }
}

/// 记录本身的类型标识（`company_bus_ind`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BusinessIndicator {
    /// 公司，排在商号前面
    Company,
    /// 商号
    Business,
}

impl BusinessIndicator {
    /// 从注册处返回的代码解析
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "C" | "c" => Some(BusinessIndicator::Company),
            "B" | "b" => Some(BusinessIndicator::Business),
            _ => None,
        }
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            BusinessIndicator::Company => "Company",
            BusinessIndicator::Business => "Business",
        }
    }
}

impl std::fmt::Display for BusinessIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
