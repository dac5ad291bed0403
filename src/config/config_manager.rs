// ==========================================
// DataNaut 数据中心 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope，scope_id = 'global')
// 约定: 配置缺失或格式错误时使用默认值并记录告警
// ==========================================

use crate::datahub::file_parser::TableFormat;
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 合同通知期（逗号分隔的天数）
    pub const ALLOWED_NOTICE_PERIODS: &str = "datahub.allowed_notice_periods";

    // 导出
    pub const EXPORT_FILENAME_PREFIX: &str = "datahub.export_filename_prefix";
    pub const DEFAULT_FORMAT: &str = "datahub.default_format";

    // CSV 旧编码回退（WHATWG 标签）
    pub const CSV_FALLBACK_ENCODING: &str = "datahub.csv_fallback_encoding";
}

/// 默认允许的通知期（天）
pub const DEFAULT_NOTICE_PERIODS: [i64; 4] = [30, 60, 90, 120];

// ==========================================
// DataHubConfig - 数据中心配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataHubConfig {
    pub allowed_notice_periods: Vec<i64>,
    pub export_filename_prefix: String,
    #[serde(skip)]
    pub default_format: TableFormat,
    pub csv_fallback_encoding: String,
}

impl Default for DataHubConfig {
    fn default() -> Self {
        Self {
            allowed_notice_periods: DEFAULT_NOTICE_PERIODS.to_vec(),
            export_filename_prefix: "datanaut".to_string(),
            default_format: TableFormat::Csv,
            csv_fallback_encoding: "windows-1251".to_string(),
        }
    }
}

impl DataHubConfig {
    /// 通知期列表的展示形式（"30, 60, 90, 120"）
    pub fn allowed_notice_periods_display(&self) -> String {
        self.allowed_notice_periods
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 解析逗号分隔的天数列表；任一项非法或列表为空时返回 None
fn parse_notice_periods(raw: &str) -> Option<Vec<i64>> {
    let periods = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().ok().filter(|d| *d > 0))
        .collect::<Option<Vec<_>>>()?;
    (!periods.is_empty()).then_some(periods)
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        read_global_value(&conn, key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 加载数据中心配置快照
    pub fn load_datahub_config(&self) -> RepositoryResult<DataHubConfig> {
        let conn = self.get_conn()?;
        load_datahub_config(&conn)
    }
}

fn read_global_value(conn: &Connection, key: &str) -> RepositoryResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

/// 在给定连接上加载配置（导入事务内复用）
pub fn load_datahub_config(conn: &Connection) -> RepositoryResult<DataHubConfig> {
    let mut config = DataHubConfig::default();

    if let Some(raw) = read_global_value(conn, config_keys::ALLOWED_NOTICE_PERIODS)? {
        match parse_notice_periods(&raw) {
            Some(periods) => config.allowed_notice_periods = periods,
            None => tracing::warn!(
                config_key = config_keys::ALLOWED_NOTICE_PERIODS,
                raw_value = %raw,
                "通知期配置格式错误，使用默认值"
            ),
        }
    }

    if let Some(raw) = read_global_value(conn, config_keys::EXPORT_FILENAME_PREFIX)? {
        let prefix = raw.trim();
        if !prefix.is_empty() {
            config.export_filename_prefix = prefix.to_string();
        }
    }

    if let Some(raw) = read_global_value(conn, config_keys::DEFAULT_FORMAT)? {
        match TableFormat::parse(&raw) {
            Ok(format) => config.default_format = format,
            Err(_) => tracing::warn!(
                config_key = config_keys::DEFAULT_FORMAT,
                raw_value = %raw,
                "默认格式配置无效，使用 csv"
            ),
        }
    }

    if let Some(raw) = read_global_value(conn, config_keys::CSV_FALLBACK_ENCODING)? {
        if !raw.trim().is_empty() {
            config.csv_fallback_encoding = raw.trim().to_string();
        }
    }

    Ok(config)
}
