// ==========================================
// DataNaut 数据中心 - 表格写出
// ==========================================
// 输入: 表头 + 已字符串化的行（列顺序与表头一致）
// 输出: CSV（UTF-8）或 Excel 字节
// 模板 = 零数据行的同一写出
// ==========================================

use crate::datahub::error::{DataHubError, DataHubResult};
use crate::datahub::file_parser::TableFormat;

/// 写出结果（交给调用方作为下载响应）
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn new(filename: impl Into<String>, format: TableFormat, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: format.content_type(),
            bytes,
        }
    }
}

/// 表格写出器
pub trait TableWriter {
    fn write(&self, headers: &[&str], rows: &[Vec<String>]) -> DataHubResult<Vec<u8>>;
}

pub struct CsvTableWriter;

impl TableWriter for CsvTableWriter {
    fn write(&self, headers: &[&str], rows: &[Vec<String>]) -> DataHubResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| DataHubError::WriteError(e.to_string()))
    }
}

pub struct XlsxTableWriter {
    sheet_name: String,
}

impl XlsxTableWriter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }
}

#[cfg(feature = "xlsx")]
impl TableWriter for XlsxTableWriter {
    fn write(&self, headers: &[&str], rows: &[Vec<String>]) -> DataHubResult<Vec<u8>> {
        use rust_xlsxwriter::Workbook;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name)?;

        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header)?;
        }
        for (idx, row) in rows.iter().enumerate() {
            let row_idx = (idx + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                // 空值不落单元格，回读时为 Empty
                if !value.is_empty() {
                    sheet.write_string(row_idx, col as u16, value)?;
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

#[cfg(not(feature = "xlsx"))]
impl TableWriter for XlsxTableWriter {
    fn write(&self, _headers: &[&str], _rows: &[Vec<String>]) -> DataHubResult<Vec<u8>> {
        Err(DataHubError::SpreadsheetSupportDisabled)
    }
}

/// 按格式写出
///
/// # 参数
/// - sheet_name: 仅 Excel 使用（工作表名）
pub fn write_table(
    format: TableFormat,
    sheet_name: &str,
    headers: &[&str],
    rows: &[Vec<String>],
) -> DataHubResult<Vec<u8>> {
    match format {
        TableFormat::Csv => CsvTableWriter.write(headers, rows),
        TableFormat::Xlsx => XlsxTableWriter::new(sheet_name).write(headers, rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_quotes_and_header_only() {
        let bytes = CsvTableWriter
            .write(
                &["name", "notes"],
                &[vec!["Acme, Inc.".to_string(), "says \"hi\"".to_string()]],
            )
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "name,notes\n\"Acme, Inc.\",\"says \"\"hi\"\"\"\n");

        let template = CsvTableWriter.write(&["code", "name"], &[]).unwrap();
        assert_eq!(template, b"code,name\n");
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_xlsx_reads_back() {
        use crate::datahub::file_parser::{TableReader, XlsxTableReader};
        use crate::datahub::value_parser::CellValue;

        let bytes = write_table(
            TableFormat::Xlsx,
            "vendors",
            &["name", "website"],
            &[vec!["Acme".to_string(), String::new()]],
        )
        .unwrap();
        let data = XlsxTableReader::new(None).read(&bytes).unwrap();

        assert_eq!(data.headers, vec!["name", "website"]);
        assert_eq!(data.rows[0].get("name"), Some(&CellValue::from("Acme")));
        assert!(data.rows[0].get("website").map_or(true, CellValue::is_blank));
    }

    #[cfg(not(feature = "xlsx"))]
    #[test]
    fn test_xlsx_disabled() {
        let err = write_table(TableFormat::Xlsx, "vendors", &["name"], &[]).unwrap_err();
        assert!(err.is_configuration());
    }
}
