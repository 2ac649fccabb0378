use serde::{Deserialize, Serialize};

use super::record::RegistryRecord;

/// 结果行的状态标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowStatus {
    Found,
    NotFound,
    Error,
    /// 认证失败后未查询
    Skipped,
}

impl RowStatus {
    pub fn label(self) -> &'static str {
        match self {
            RowStatus::Found => "Found",
            RowStatus::NotFound => "Not Found",
            RowStatus::Error => "Error",
            RowStatus::Skipped => "Skipped",
        }
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 结果表中的一行
///
/// 找到时携带完整记录；未找到或失败时只有状态和错误描述。
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub searched_identifier: String,
    pub status: RowStatus,
    pub record: Option<RegistryRecord>,
    pub error: Option<String>,
}

impl ResultRow {
    pub fn found(searched_identifier: impl Into<String>, record: RegistryRecord) -> Self {
        Self {
            searched_identifier: searched_identifier.into(),
            status: RowStatus::Found,
            record: Some(record),
            error: None,
        }
    }

    pub fn not_found(searched_identifier: impl Into<String>) -> Self {
        Self {
            searched_identifier: searched_identifier.into(),
            status: RowStatus::NotFound,
            record: None,
            error: None,
        }
    }

    pub fn failed(searched_identifier: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            searched_identifier: searched_identifier.into(),
            status: RowStatus::Error,
            record: None,
            error: Some(error.into()),
        }
    }

    pub fn skipped(searched_identifier: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            searched_identifier: searched_identifier.into(),
            status: RowStatus::Skipped,
            record: None,
            error: Some(error.into()),
        }
    }

    /// 转成导出用的扁平行，`number` 为 "No." 列（从 1 开始）
    pub fn to_export(&self, number: usize) -> ExportRow {
        let record = self.record.as_ref();
        let field = |f: fn(&RegistryRecord) -> String| record.map(f).unwrap_or_default();

        ExportRow {
            number,
            searched_number: self.searched_identifier.clone(),
            entity_number: field(|r| r.entity_number.clone()),
            company_name: field(|r| r.name.clone()),
            address: field(RegistryRecord::address),
            status: field(|r| r.status_description.clone()),
            company_type: field(|r| r.entity_type_description.clone()),
            place_of_business: field(|r| r.place_of_business.clone()),
            eircode: field(|r| r.postal_code.clone()),
            entity_type: field(|r| {
                r.business_indicator
                    .map(|i| i.name().to_string())
                    .unwrap_or_default()
            }),
            result: self.status.label().to_string(),
            error: self.error.clone().unwrap_or_default(),
        }
    }
}

/// CSV 导出格式（表头即列名）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "No.")]
    pub number: usize,
    #[serde(rename = "Searched Number")]
    pub searched_number: String,
    #[serde(rename = "Entity Number")]
    pub entity_number: String,
    #[serde(rename = "Company Name")]
    pub company_name: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Type")]
    pub company_type: String,
    #[serde(rename = "Place of Business")]
    pub place_of_business: String,
    #[serde(rename = "Eircode")]
    pub eircode: String,
    #[serde(rename = "Entity Type")]
    pub entity_type: String,
    #[serde(rename = "Result")]
    pub result: String,
    #[serde(rename = "Error")]
    pub error: String,
}

/// 一次查询运行的完整结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    pub rows: Vec<ResultRow>,
    /// 因认证失败提前终止
    pub halted_on_auth: bool,
}

impl LookupTable {
    pub fn count(&self, status: RowStatus) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }

    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| row.to_export(i + 1))
            .collect()
    }
}
