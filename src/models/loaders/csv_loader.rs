use crate::error::{AppError, AppResult, InputError};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// 从上传的 CSV 文件中读取编号所在列
///
/// `column` 为 None 时取第一列。空单元格直接跳过，其余单元格原样返回，
/// 拆分与去重交给规范化器。
pub async fn load_identifier_column(path: &Path, column: Option<&str>) -> AppResult<Vec<String>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let cells = read_identifier_column(&content, column)
        .map_err(|e| with_path(e, &path.display().to_string()))?;

    info!(
        "📄 已从 {} 读取 {} 个单元格",
        path.file_name().unwrap_or_default().to_string_lossy(),
        cells.len()
    );
    Ok(cells)
}

/// 从 CSV 文本中读取指定列
pub fn read_identifier_column(content: &str, column: Option<&str>) -> AppResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(|e| AppError::csv("<input>", e))?.clone();

    let index = match column {
        Some(name) => headers
            .iter()
            .position(|h| h.trim() == name.trim())
            .ok_or_else(|| InputError::ColumnNotFound {
                column: name.to_string(),
            })?,
        None => 0,
    };
    debug!("编号列: {:?} (索引 {})", headers.get(index), index);

    let mut cells = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::csv("<input>", e))?;
        if let Some(cell) = record.get(index) {
            if !cell.trim().is_empty() {
                cells.push(cell.to_string());
            }
        }
    }

    Ok(cells)
}

fn with_path(err: AppError, path: &str) -> AppError {
    match err {
        AppError::File(crate::error::FileError::Csv { source, .. }) => AppError::csv(path, source),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_named_column() {
        let csv = "name,Entity Number\nAcme,691054\nBlank,\nOther, 602047 \n";
        let cells = read_identifier_column(csv, Some("Entity Number")).unwrap();
        assert_eq!(cells, vec!["691054", " 602047 "]);
    }

    #[test]
    fn test_read_first_column_by_default() {
        let csv = "number\n691054\n602047\n";
        let cells = read_identifier_column(csv, None).unwrap();
        assert_eq!(cells, vec!["691054", "602047"]);
    }

    #[test]
    fn test_missing_column() {
        let err = read_identifier_column("a,b\n1,2\n", Some("company_num")).unwrap_err();
        assert!(matches!(
            err,
            AppError::Input(InputError::ColumnNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "company_num").unwrap();
        writeln!(file, "691054").unwrap();
        writeln!(file, "691054").unwrap();

        let cells = load_identifier_column(file.path(), Some("company_num"))
            .await
            .unwrap();
        assert_eq!(cells.len(), 2);
    }
}
