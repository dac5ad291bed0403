// ==========================================
// DataNaut 数据中心 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 幂等建表（CREATE TABLE IF NOT EXISTS）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "DATANAUT_DB_PATH";

/// 默认数据库路径
///
/// 优先级: DATANAUT_DB_PATH > 用户数据目录/datanaut/datanaut.db > ./datanaut.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./datanaut.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("datanaut");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("datanaut.db");
        }
    }

    path.to_string_lossy().to_string()
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER NOT NULL,
    applied_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS vendor (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    name                    TEXT NOT NULL,
    name_key                TEXT NOT NULL UNIQUE,
    vendor_type             TEXT,
    tags                    TEXT,
    primary_contact_name    TEXT,
    primary_contact_email   TEXT,
    website                 TEXT,
    notes                   TEXT,
    created_at              TEXT NOT NULL,
    updated_at              TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cost_center (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    code                TEXT NOT NULL UNIQUE,
    name                TEXT NOT NULL,
    business_unit       TEXT,
    region              TEXT,
    default_approver    TEXT,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS service (
    id                          INTEGER PRIMARY KEY AUTOINCREMENT,
    vendor_id                   INTEGER NOT NULL REFERENCES vendor(id),
    name                        TEXT NOT NULL,
    name_key                    TEXT NOT NULL,
    category                    TEXT,
    service_code                TEXT,
    default_currency            TEXT,
    default_billing_frequency   TEXT,
    owner_display               TEXT,
    list_price                  TEXT,
    allocation_split            TEXT,
    created_at                  TEXT NOT NULL,
    updated_at                  TEXT NOT NULL,
    UNIQUE (vendor_id, name_key)
);

CREATE TABLE IF NOT EXISTS contract (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    owner               TEXT NOT NULL,
    vendor_id           INTEGER NOT NULL REFERENCES vendor(id),
    contract_name       TEXT NOT NULL,
    contract_name_key   TEXT NOT NULL,
    contract_id         TEXT,
    contract_id_key     TEXT,
    contract_type       TEXT,
    entity              TEXT,
    annual_value        TEXT,
    currency            TEXT,
    start_date          TEXT,
    end_date            TEXT,
    renewal_date        TEXT,
    notice_period_days  INTEGER,
    notice_date         TEXT,
    status              TEXT,
    uploaded_by         TEXT,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_contract_natural_key
    ON contract (owner, vendor_id, contract_name_key);

CREATE TABLE IF NOT EXISTS invoice (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    owner               TEXT NOT NULL,
    vendor_id           INTEGER NOT NULL REFERENCES vendor(id),
    contract_id         INTEGER REFERENCES contract(id) ON DELETE SET NULL,
    invoice_number      TEXT NOT NULL,
    invoice_number_key  TEXT NOT NULL,
    invoice_date        TEXT NOT NULL,
    currency            TEXT NOT NULL,
    total_amount        TEXT NOT NULL,
    tax_amount          TEXT,
    period_start        TEXT,
    period_end          TEXT,
    notes               TEXT,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL,
    UNIQUE (owner, vendor_id, invoice_number_key)
);
"#;

/// 幂等建表，并在首次建库时写入 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    if read_schema_version(conn)?.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
            [CURRENT_SCHEMA_VERSION],
        )?;
    }
    Ok(())
}

/// 读取 schema_version（若表不存在或为空则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
