// ==========================================
// DataNaut 数据中心 - Data Hub API
// ==========================================
// 职责: 调用方（请求处理器 / CLI）使用的门面
// 操作: 概览、导入、导出、模板
// ==========================================

use crate::api::error::{import_error, ApiError, ApiResult};
use crate::config::{ConfigManager, DataHubConfig};
use crate::datahub::exporter;
use crate::datahub::file_parser::{TableFormat, UploadedFile};
use crate::datahub::importer::DataHubImporter;
use crate::datahub::registry::EntityKind;
use crate::datahub::table_writer::ExportFile;
use crate::datahub::upsert::ImportSummary;
use crate::datahub::validator::ValidationErrorItem;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::error::RepositoryError;
use crate::repository::{
    ContractRepository, CostCenterRepository, InvoiceRepository, ServiceRepository,
    VendorRepository,
};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, instrument};

/// 导入 API 响应
#[derive(Debug, Clone, Serialize)]
pub struct ImportApiResponse {
    pub batch_id: String,
    pub entity: EntityKind,
    pub label: String,
    pub summary: ImportSummary,
    pub skipped_rows: Vec<usize>,
    pub errors: Vec<ValidationErrorItem>,
    pub warnings: Vec<String>,
    pub headers_in_file: Vec<String>,
    pub elapsed_ms: u64,
    /// 面向用户的结果说明
    pub message: String,
}

/// 实体概览
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub key: String,
    pub label: String,
    pub count: i64,
}

/// Data Hub API
pub struct DataHubApi {
    conn: Arc<Mutex<Connection>>,
}

impl DataHubApi {
    /// 打开数据库并确保表结构存在
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(RepositoryError::from)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 共享同一连接的配置管理器
    pub fn config_manager(&self) -> ConfigManager {
        ConfigManager::from_connection(Arc::clone(&self.conn))
    }

    fn get_conn(&self) -> ApiResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::from(RepositoryError::LockError(e.to_string())))
    }

    fn load_config(&self) -> ApiResult<DataHubConfig> {
        Ok(self.config_manager().load_datahub_config()?)
    }

    /// 解析格式参数（缺省时使用配置的默认格式）
    fn resolve_format(&self, format: Option<&str>) -> ApiResult<TableFormat> {
        match format {
            Some(value) => Ok(TableFormat::parse(value)?),
            None => Ok(self.load_config()?.default_format),
        }
    }

    /// 概览: 每个实体的记录数（合同/发票仅计当前用户）
    pub fn list_entities(&self, owner: &str) -> ApiResult<Vec<EntitySummary>> {
        let conn = self.get_conn()?;
        let mut items = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            let count = match kind {
                EntityKind::Vendors => VendorRepository::new(&conn).count()?,
                EntityKind::CostCenters => CostCenterRepository::new(&conn).count()?,
                EntityKind::Services => ServiceRepository::new(&conn).count()?,
                EntityKind::Contracts => ContractRepository::new(&conn).count_for_owner(owner)?,
                EntityKind::Invoices => InvoiceRepository::new(&conn).count_for_owner(owner)?,
            };
            items.push(EntitySummary {
                key: kind.key().to_string(),
                label: kind.label().to_string(),
                count,
            });
        }
        Ok(items)
    }

    /// 模板表头（导入页展示）
    pub fn template_headers(&self, entity: &str) -> ApiResult<Vec<String>> {
        let kind = EntityKind::from_key(entity)?;
        Ok(kind.template_headers().iter().map(|h| h.to_string()).collect())
    }

    /// 导入上传文件
    ///
    /// # 参数
    /// - entity: 实体键（vendors / cost-centers / services / contracts / invoices）
    /// - upload: 上传文件
    /// - owner: 当前用户
    /// - format: 显式格式（"csv" / "xlsx"），缺省按扩展名
    #[instrument(skip(self, upload), fields(file = %upload.name))]
    pub fn import(
        &self,
        entity: &str,
        upload: &UploadedFile,
        owner: &str,
        format: Option<&str>,
    ) -> ApiResult<ImportApiResponse> {
        let kind = EntityKind::from_key(entity)?;
        if upload.bytes.is_empty() {
            return Err(ApiError::InvalidInput(
                "Please choose a CSV or XLSX file to upload.".to_string(),
            ));
        }
        let format = format.map(TableFormat::parse).transpose()?;

        let mut conn = self.get_conn()?;
        let report = DataHubImporter::import(&mut conn, kind, upload, owner, format)
            .map_err(|e| import_error(kind.label(), e))?;

        let message = format!(
            "{}: import completed. Created: {}, updated: {}.",
            kind.label(),
            report.summary.created,
            report.summary.updated
        );
        info!(batch_id = %report.batch_id, message = %message, "导入 API 完成");

        Ok(ImportApiResponse {
            batch_id: report.batch_id,
            entity: kind,
            label: kind.label().to_string(),
            summary: report.summary,
            skipped_rows: report.skipped_rows,
            errors: report.errors,
            warnings: report.warnings,
            headers_in_file: report.headers_in_file,
            elapsed_ms: report.elapsed_ms,
            message,
        })
    }

    /// 导出实体数据
    pub fn export(&self, entity: &str, owner: &str, format: Option<&str>) -> ApiResult<ExportFile> {
        let kind = EntityKind::from_key(entity)?;
        let format = self.resolve_format(format)?;
        let config = self.load_config()?;
        let conn = self.get_conn()?;
        Ok(exporter::export(&conn, kind, owner, format, &config)?)
    }

    /// 下载空模板
    pub fn template(&self, entity: &str, format: Option<&str>) -> ApiResult<ExportFile> {
        let kind = EntityKind::from_key(entity)?;
        let format = self.resolve_format(format)?;
        Ok(exporter::template(kind, format)?)
    }
}
