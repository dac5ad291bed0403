// ==========================================
// DataNaut 数据中心 - 导入编排
// ==========================================
// 流程: 识别格式 → 读取 → 校验 → 合并（单事务）
// 事务: 任一批次级错误 → 整批回滚，不留部分写入
// ==========================================

use crate::config::load_datahub_config;
use crate::datahub::error::DataHubResult;
use crate::datahub::file_parser::{read_tabular_file, ReadOptions, TableFormat, UploadedFile};
use crate::datahub::registry::EntityKind;
use crate::datahub::upsert::{upsert_rows, ImportSummary, UpsertContext};
use crate::datahub::validator::{validate_rows, ValidationErrorItem};
use rusqlite::Connection;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub const NO_DATA_ROWS_WARNING: &str = "The uploaded file has no data rows.";

/// 单次导入结果
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub entity: EntityKind,
    pub summary: ImportSummary,
    /// 未合并的行号（校验错误或自然键缺失）
    pub skipped_rows: Vec<usize>,
    pub errors: Vec<ValidationErrorItem>,
    pub warnings: Vec<String>,
    pub headers_in_file: Vec<String>,
    pub elapsed_ms: u64,
}

// ==========================================
// DataHubImporter
// ==========================================
pub struct DataHubImporter;

impl DataHubImporter {
    /// 导入一个上传文件
    ///
    /// # 参数
    /// - conn: 数据库连接（内部开启事务）
    /// - kind: 目标实体
    /// - upload: 上传文件（文件名用于识别格式）
    /// - owner: 导入用户（合同/发票归属）
    /// - format: 显式格式，优先于扩展名
    ///
    /// # 返回
    /// - Ok(ImportReport): 已提交
    /// - Err: 批次级错误，事务已回滚
    #[instrument(skip(conn, upload), fields(file = %upload.name, batch_id))]
    pub fn import(
        conn: &mut Connection,
        kind: EntityKind,
        upload: &UploadedFile,
        owner: &str,
        format: Option<TableFormat>,
    ) -> DataHubResult<ImportReport> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(batch_id = %batch_id, entity = %kind, owner = %owner, "开始导入");

        let config = load_datahub_config(conn)?;

        // === 步骤 1: 读取文件 ===
        debug!("步骤 1: 读取文件");
        let options = ReadOptions {
            fallback_encoding: config.csv_fallback_encoding.clone(),
            sheet_name: None,
        };
        let table = read_tabular_file(upload, format, &options)?;
        debug!(rows = table.rows.len(), headers = table.headers.len(), "文件读取完成");

        if table.rows.is_empty() {
            warn!(batch_id = %batch_id, "文件无数据行");
            // 表头级告警（缺失必填列 / 未知列）照常输出
            let mut warnings = validate_rows(&[], &table.headers, kind.spec()).warnings;
            warnings.push(NO_DATA_ROWS_WARNING.to_string());
            return Ok(ImportReport {
                batch_id,
                entity: kind,
                summary: ImportSummary::default(),
                skipped_rows: Vec::new(),
                errors: Vec::new(),
                warnings,
                headers_in_file: table.headers,
                elapsed_ms: start_time.elapsed().as_millis() as u64,
            });
        }

        // === 步骤 2: 校验 ===
        debug!("步骤 2: 校验");
        let validation = validate_rows(&table.rows, &table.headers, kind.spec());
        for warning in &validation.warnings {
            warn!(batch_id = %batch_id, warning = %warning, "批次告警");
        }
        for error in &validation.errors {
            warn!(
                row = error.row,
                column = %error.column,
                message = %error.message,
                "行级校验错误"
            );
        }

        // === 步骤 3: 合并（单事务）===
        debug!("步骤 3: 合并");
        let ctx = UpsertContext {
            owner,
            config: &config,
        };
        let tx = conn.transaction()?;
        let report = upsert_rows(
            kind,
            &tx,
            ctx,
            &validation.clean_rows,
            &validation.rows_with_errors(),
        )?;
        tx.commit()?;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            batch_id = %batch_id,
            created = report.summary.created,
            updated = report.summary.updated,
            skipped = report.skipped_rows.len(),
            errors = validation.errors.len(),
            elapsed_ms = elapsed_ms,
            "导入完成"
        );

        Ok(ImportReport {
            batch_id,
            entity: kind,
            summary: report.summary,
            skipped_rows: report.skipped_rows,
            errors: validation.errors,
            warnings: validation.warnings,
            headers_in_file: validation.headers_in_file,
            elapsed_ms,
        })
    }
}
