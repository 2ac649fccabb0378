//! CSV 导出服务 - 业务能力层
//!
//! 只负责把结果表写成带表头的 UTF-8 CSV

use crate::error::{AppError, AppResult};
use crate::models::{ExportRow, LookupTable};
use std::path::Path;
use tracing::info;

/// 结果表 → CSV 文本
pub fn to_csv_string(table: &LookupTable) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_rows(&mut writer, table, "<memory>")?;

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::csv("<memory>", e.into_error().into()))?;
    String::from_utf8(bytes).map_err(|e| {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, e);
        AppError::csv("<memory>", io.into())
    })
}

/// 写入 CSV 文件
pub async fn write_csv(table: &LookupTable, path: &Path) -> AppResult<()> {
    let content = to_csv_string(table)?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    info!("📥 结果已导出: {} ({} 行)", path.display(), table.rows.len());
    Ok(())
}

/// 解析导出的 CSV（用于校验导出结果）
pub fn parse_csv(content: &str) -> AppResult<Vec<ExportRow>> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    reader
        .deserialize()
        .collect::<Result<Vec<ExportRow>, csv::Error>>()
        .map_err(|e| AppError::csv("<input>", e))
}

fn write_rows<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    table: &LookupTable,
    path: &str,
) -> AppResult<()> {
    for row in table.export_rows() {
        writer.serialize(row).map_err(|e| AppError::csv(path, e))?;
    }
    writer.flush().map_err(|e| AppError::csv(path, e.into()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessIndicator, RegistryRecord, ResultRow};

    fn sample_table() -> LookupTable {
        let record = RegistryRecord {
            entity_number: "691054".to_string(),
            name: "ACME, TRADING \"IRELAND\" LIMITED".to_string(),
            status_description: "Normal".to_string(),
            entity_type_description: "LTD".to_string(),
            address_lines: vec!["1 Main Street".to_string(), "Dublin 2".to_string()],
            place_of_business: String::new(),
            postal_code: "D02 XY45".to_string(),
            business_indicator: Some(BusinessIndicator::Company),
        };
        LookupTable {
            rows: vec![
                ResultRow::found("691054", record),
                ResultRow::not_found("602047"),
                ResultRow::failed("700001", "HTTP 503"),
            ],
            halted_on_auth: false,
        }
    }

    #[test]
    fn test_header_row() {
        let csv = to_csv_string(&sample_table()).unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(
            header,
            "No.,Searched Number,Entity Number,Company Name,Address,Status,Type,Place of Business,Eircode,Entity Type,Result,Error"
        );
    }

    #[test]
    fn test_export_then_parse_keeps_order() {
        let table = sample_table();
        let parsed = parse_csv(&to_csv_string(&table).unwrap()).unwrap();

        assert_eq!(parsed.len(), table.rows.len());
        let searched: Vec<_> = parsed.iter().map(|r| r.searched_number.as_str()).collect();
        assert_eq!(searched, vec!["691054", "602047", "700001"]);
        assert_eq!(parsed[0].company_name, "ACME, TRADING \"IRELAND\" LIMITED");
        assert_eq!(parsed[1].result, "Not Found");
        assert_eq!(parsed[2].error, "HTTP 503");
    }

    #[tokio::test]
    async fn test_write_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entity_results.csv");
        write_csv(&sample_table(), &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_csv(&content).unwrap().len(), 3);
    }
}
