// ==========================================
// DataNaut 数据中心 - 导入导出错误类型
// ==========================================
// 两级错误:
// - FieldError: 单元格级，可恢复，记入 ValidationResult 后继续处理
// - DataHubError: 批次级，致命，调用方整体回滚
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 单元格转换失败（行级，不中断批次）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 行级转换结果
pub type FieldResult<T> = Result<T, FieldError>;

/// 批次级错误（中断整个导入）
#[derive(Error, Debug)]
pub enum DataHubError {
    // ===== 配置类错误（联系运维，而非修改文件）=====
    #[error("Unsupported file type '{0}'. Please upload CSV or Excel (.xlsx).")]
    UnsupportedFormat(String),

    #[error("Spreadsheet support is not enabled in this build. Please upload CSV or contact support.")]
    SpreadsheetSupportDisabled,

    #[error("Unknown Data Hub entity: {0}")]
    UnknownEntity(String),

    #[error("Unknown text encoding configured: {0}")]
    UnknownEncoding(String),

    // ===== 文件类错误 =====
    #[error("Could not read the uploaded file: {0}")]
    UnreadableFile(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    #[error("Excel parse failed: {0}")]
    ExcelParseError(String),

    #[error("Export failed: {0}")]
    WriteError(String),

    // ===== 依赖与一致性错误 =====
    #[error("Vendor not found for {entity}: {vendor_name} ({entity}={record}). Import vendors first.")]
    VendorNotFound {
        entity: &'static str,
        vendor_name: String,
        record: String,
    },

    #[error("Invalid notice_period_days '{value}' for contract '{contract_name}'. Allowed: {allowed}.")]
    InvalidNoticePeriod {
        value: String,
        contract_name: String,
        allowed: String,
    },

    #[error("Contract '{0}': notice_date is set but end_date is missing.")]
    NoticeDateWithoutEndDate(String),

    #[error("Contract '{contract_name}': notice_date ({notice_date}) must be on/before end_date ({end_date}).")]
    NoticeDateAfterEndDate {
        contract_name: String,
        notice_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
    },

    // ===== 存储错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DataHubError {
    /// 是否为配置类错误（提示"联系支持"而非"修正文件"）
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DataHubError::UnsupportedFormat(_)
                | DataHubError::SpreadsheetSupportDisabled
                | DataHubError::UnknownEntity(_)
                | DataHubError::UnknownEncoding(_)
        )
    }
}

impl From<std::io::Error> for DataHubError {
    fn from(err: std::io::Error) -> Self {
        DataHubError::UnreadableFile(err.to_string())
    }
}

impl From<csv::Error> for DataHubError {
    fn from(err: csv::Error) -> Self {
        DataHubError::CsvParseError(err.to_string())
    }
}

impl From<rusqlite::Error> for DataHubError {
    fn from(err: rusqlite::Error) -> Self {
        DataHubError::Repository(RepositoryError::from(err))
    }
}

#[cfg(feature = "xlsx")]
impl From<calamine::XlsxError> for DataHubError {
    fn from(err: calamine::XlsxError) -> Self {
        DataHubError::ExcelParseError(err.to_string())
    }
}

#[cfg(feature = "xlsx")]
impl From<rust_xlsxwriter::XlsxError> for DataHubError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        DataHubError::WriteError(err.to_string())
    }
}

/// Result 类型别名
pub type DataHubResult<T> = Result<T, DataHubError>;
