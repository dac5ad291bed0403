// ==========================================
// DataNaut 数据中心 - API 层错误类型
// ==========================================
// 职责: 将核心/仓储错误转换为调用方可直接展示的错误
// 分类: 配置类（联系支持）与数据类（修正文件）分开
// ==========================================

use crate::datahub::error::DataHubError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 配置类错误
    // ==========================================
    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    SpreadsheetSupportDisabled(String),

    /// 未知实体键（调用方按 404 处理）
    #[error("{0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ==========================================
    // 数据类错误
    // ==========================================
    #[error("{0}")]
    InvalidInput(String),

    /// 导入失败（整批回滚）
    #[error("{label}: import failed. {message}")]
    ImportFailed { label: String, message: String },

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("Database transaction failed: {0}")]
    DatabaseTransactionError(String),
}

impl ApiError {
    /// 是否为配置类错误
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ApiError::UnsupportedFormat(_)
                | ApiError::SpreadsheetSupportDisabled(_)
                | ApiError::NotFound(_)
                | ApiError::ConfigurationError(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={}) not found", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("lock acquisition failed: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("unique constraint: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("foreign key: {}", msg))
            }
        }
    }
}

// ==========================================
// 从 DataHubError 转换（不带实体标签）
// ==========================================
impl From<DataHubError> for ApiError {
    fn from(err: DataHubError) -> Self {
        match err {
            DataHubError::UnsupportedFormat(_) => ApiError::UnsupportedFormat(err.to_string()),
            DataHubError::SpreadsheetSupportDisabled => {
                ApiError::SpreadsheetSupportDisabled(err.to_string())
            }
            DataHubError::UnknownEntity(_) => ApiError::NotFound(err.to_string()),
            DataHubError::UnknownEncoding(_) => ApiError::ConfigurationError(err.to_string()),
            DataHubError::WriteError(msg) => ApiError::ExportFailed(msg),
            DataHubError::Repository(repo) => ApiError::from(repo),
            other => ApiError::InvalidInput(other.to_string()),
        }
    }
}

/// 导入错误转换: 配置类保持原分类，其余带实体标签
pub(crate) fn import_error(label: &str, err: DataHubError) -> ApiError {
    if err.is_configuration() {
        return ApiError::from(err);
    }
    ApiError::ImportFailed {
        label: label.to_string(),
        message: err.to_string(),
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
