// ==========================================
// DataNaut 数据中心 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("Record not found: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("Database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("Database lock failed: {0}")]
    LockError(String),

    #[error("Database transaction failed: {0}")]
    DatabaseTransactionError(String),

    #[error("Database query failed: {0}")]
    DatabaseQueryError(String),

    #[error("Unique constraint violated: {0}")]
    UniqueConstraintViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
