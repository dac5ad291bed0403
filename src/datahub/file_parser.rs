// ==========================================
// DataNaut 数据中心 - 表格读取器
// ==========================================
// 支持: CSV (.csv) / Excel (.xlsx/.xlsm/.xltx/.xltm)
// 输出: 按原始表头键控的 RawRow（表头标准化在校验阶段进行）
// 约定: 完全空白的行被跳过
// ==========================================

use crate::datahub::error::{DataHubError, DataHubResult};
use crate::datahub::value_parser::CellValue;
use csv::ReaderBuilder;
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

// ==========================================
// UploadedFile - 上传文件（文件名 + 全部字节）
// ==========================================
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// 从磁盘读取（CLI 使用）
    pub fn from_path<P: AsRef<Path>>(path: P) -> DataHubResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| DataHubError::UnreadableFile(format!("{}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }

    /// 小写扩展名（含 '.'），无扩展名时为空串
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }
}

// ==========================================
// TableFormat - 表格格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// 按文件扩展名判定格式
    pub fn from_filename(name: &str) -> DataHubResult<Self> {
        let ext = UploadedFile::new(name, Vec::new()).extension();
        match ext.as_str() {
            ".csv" => Ok(TableFormat::Csv),
            ".xlsx" | ".xlsm" | ".xltx" | ".xltm" => Ok(TableFormat::Xlsx),
            _ => Err(DataHubError::UnsupportedFormat(ext)),
        }
    }

    /// 解析显式格式参数（"csv" / "xlsx"）
    pub fn parse(value: &str) -> DataHubResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "csv" => Ok(TableFormat::Csv),
            "xlsx" => Ok(TableFormat::Xlsx),
            other => Err(DataHubError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            TableFormat::Csv => "text/csv; charset=utf-8",
            TableFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

// ==========================================
// RawRow - 原始行（保持列顺序）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.push((header.into(), value));
    }

    /// 按原始表头取值（重复表头时取最后一个）
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .rev()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_blank())
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for RawRow {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 读取结果
#[derive(Debug, Clone, Default)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ==========================================
// TableReader Trait
// ==========================================
pub trait TableReader {
    /// 解析文件字节为表头 + 原始行
    fn read(&self, bytes: &[u8]) -> DataHubResult<TableData>;
}

// ==========================================
// CSV 读取器
// ==========================================
// 解码顺序: UTF-8（去 BOM）→ 配置的旧编码 → UTF-8 替换字符
pub struct CsvTableReader {
    fallback: &'static Encoding,
}

impl CsvTableReader {
    /// # 参数
    /// - fallback_label: WHATWG 编码标签（如 "windows-1251"）
    pub fn new(fallback_label: &str) -> DataHubResult<Self> {
        let fallback = Encoding::for_label(fallback_label.trim().as_bytes())
            .ok_or_else(|| DataHubError::UnknownEncoding(fallback_label.to_string()))?;
        Ok(Self { fallback })
    }

    /// UTF-8（去 BOM）→ 回退编码 → UTF-8 替换字符
    ///
    /// 默认回退编码 windows-1251 映射全部 256 个字节，解码不会报错，
    /// 因此默认配置下替换字符分支不可达；回退编码为 utf-8、shift_jis 等时才可能走到。
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
        if !had_errors {
            return text;
        }

        let (text, had_errors) = self.fallback.decode_without_bom_handling(bytes);
        if !had_errors {
            tracing::debug!(encoding = self.fallback.name(), "CSV 使用回退编码解码");
            return text;
        }

        tracing::warn!("CSV 编码无法识别，使用替换字符解码");
        String::from_utf8_lossy(bytes)
    }
}

impl TableReader for CsvTableReader {
    fn read(&self, bytes: &[u8]) -> DataHubResult<TableData> {
        let text = self.decode(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        // 表头保持原样
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: RawRow = headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    let value = record
                        .get(idx)
                        .map(CellValue::from)
                        .unwrap_or(CellValue::Empty);
                    (header.clone(), value)
                })
                .collect();

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(TableData { headers, rows })
    }
}

// ==========================================
// Excel 读取器
// ==========================================
// 读取公式缓存值；数字与日期保留原生类型
pub struct XlsxTableReader {
    sheet: Option<String>,
}

impl XlsxTableReader {
    /// # 参数
    /// - sheet: 指定工作表名；不存在时回退到第一个工作表
    pub fn new(sheet: Option<String>) -> Self {
        Self { sheet }
    }
}

#[cfg(feature = "xlsx")]
impl TableReader for XlsxTableReader {
    fn read(&self, bytes: &[u8]) -> DataHubResult<TableData> {
        use calamine::{open_workbook_from_rs, Reader, Xlsx};
        use std::io::Cursor;

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = match &self.sheet {
            Some(name) if sheet_names.contains(name) => name.clone(),
            _ => sheet_names
                .first()
                .cloned()
                .ok_or_else(|| DataHubError::ExcelParseError("workbook has no sheets".to_string()))?,
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for data_row in range.rows() {
            let values: Vec<CellValue> = data_row.iter().map(cell_from_excel).collect();
            if values.iter().all(CellValue::is_blank) {
                continue;
            }

            // 第一个非空行为表头
            if headers.is_none() {
                headers = Some(values.iter().map(|v| v.to_string().trim().to_string()).collect());
                continue;
            }
            let header_names = headers.as_deref().unwrap_or_default();

            let mut row = RawRow::new();
            for (idx, header) in header_names.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                let value = values.get(idx).cloned().unwrap_or(CellValue::Empty);
                row.push(header.clone(), value);
            }
            rows.push(row);
        }

        Ok(TableData {
            headers: headers.unwrap_or_default(),
            rows,
        })
    }
}

#[cfg(not(feature = "xlsx"))]
impl TableReader for XlsxTableReader {
    fn read(&self, _bytes: &[u8]) -> DataHubResult<TableData> {
        Err(DataHubError::SpreadsheetSupportDisabled)
    }
}

#[cfg(feature = "xlsx")]
fn cell_from_excel(cell: &calamine::Data) -> CellValue {
    use calamine::Data;

    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) if value.time() == chrono::NaiveTime::MIN => CellValue::Date(value.date()),
            Some(value) => CellValue::DateTime(value),
            None => CellValue::String(cell.to_string()),
        },
        Data::DateTimeIso(s) => chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(CellValue::DateTime)
            .or_else(|_| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map(CellValue::Date))
            .unwrap_or_else(|_| CellValue::String(s.clone())),
        // 错误值 / 时长按文本保留
        _ => CellValue::String(cell.to_string()),
    }
}

// ==========================================
// 通用读取入口
// ==========================================

/// 读取选项
#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub fallback_encoding: String,
    pub sheet_name: Option<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            fallback_encoding: "windows-1251".to_string(),
            sheet_name: None,
        }
    }
}

/// 读取上传文件
///
/// # 参数
/// - upload: 上传文件
/// - format: 显式格式（优先于扩展名）
/// - options: 编码回退与工作表选择
pub fn read_tabular_file(
    upload: &UploadedFile,
    format: Option<TableFormat>,
    options: &ReadOptions,
) -> DataHubResult<TableData> {
    let format = match format {
        Some(f) => f,
        None => TableFormat::from_filename(&upload.name)?,
    };

    match format {
        TableFormat::Csv => CsvTableReader::new(&options.fallback_encoding)?.read(&upload.bytes),
        TableFormat::Xlsx => XlsxTableReader::new(options.sheet_name.clone()).read(&upload.bytes),
    }
}
