// ==========================================
// DataNaut 数据中心 - 增量合并（Upsert）
// ==========================================
// 模式: 每个实体一个策略（自然键查找 + 应用）
//       通用循环负责跳过错误行与计数
// 覆写: 稀疏覆写，空单元格永不擦除已有数据
// 事务: 由调用方持有，本模块任一错误 → 整批回滚
// ==========================================

pub mod contract;
pub mod cost_center;
pub mod invoice;
pub mod service;
pub mod vendor;

use crate::config::DataHubConfig;
use crate::datahub::dataset_spec::CleanRow;
use crate::datahub::error::{DataHubError, DataHubResult};
use crate::datahub::registry::EntityKind;
use crate::domain::vendor::Vendor;
use crate::repository::vendor_repo::VendorRepository;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashSet;

pub use contract::ContractUpsert;
pub use cost_center::CostCenterUpsert;
pub use invoice::InvoiceUpsert;
pub use service::ServiceUpsert;
pub use vendor::VendorUpsert;

/// 单行合并结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// 自然键缺失，无可合并内容
    Skipped,
}

/// 创建/更新计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}

/// 合并批次结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpsertReport {
    pub summary: ImportSummary,
    /// 未合并的行号（1-based）
    pub skipped_rows: Vec<usize>,
}

// ==========================================
// UpsertStrategy Trait
// ==========================================
pub trait UpsertStrategy {
    type Record;

    /// 按自然键查找已有记录
    ///
    /// 依赖缺失（如供应商不存在）返回批次级错误
    fn find_existing(&self, row: &CleanRow) -> DataHubResult<Option<Self::Record>>;

    /// 更新已有记录（稀疏覆写）或新建记录
    fn apply(&self, existing: Option<Self::Record>, row: &CleanRow) -> DataHubResult<UpsertOutcome>;
}

/// 批次上下文
#[derive(Debug, Clone, Copy)]
pub struct UpsertContext<'a> {
    /// 导入用户（合同/发票归属）
    pub owner: &'a str,
    pub config: &'a DataHubConfig,
}

/// 通用合并循环
///
/// # 参数
/// - rows: 校验后的行（与原始行一一对应）
/// - rows_with_errors: 含校验错误的行号，整行跳过
pub fn run_upsert<S: UpsertStrategy>(
    strategy: &S,
    rows: &[CleanRow],
    rows_with_errors: &HashSet<usize>,
) -> DataHubResult<UpsertReport> {
    let mut report = UpsertReport::default();

    for (idx, row) in rows.iter().enumerate() {
        let row_number = idx + 1;
        if rows_with_errors.contains(&row_number) {
            report.skipped_rows.push(row_number);
            continue;
        }

        let existing = strategy.find_existing(row)?;
        match strategy.apply(existing, row)? {
            UpsertOutcome::Created => report.summary.created += 1,
            UpsertOutcome::Updated => report.summary.updated += 1,
            UpsertOutcome::Skipped => report.skipped_rows.push(row_number),
        }
    }

    Ok(report)
}

/// 按实体分派到对应策略
pub fn upsert_rows(
    kind: EntityKind,
    conn: &Connection,
    ctx: UpsertContext<'_>,
    rows: &[CleanRow],
    rows_with_errors: &HashSet<usize>,
) -> DataHubResult<UpsertReport> {
    match kind {
        EntityKind::Vendors => run_upsert(&VendorUpsert::new(conn), rows, rows_with_errors),
        EntityKind::CostCenters => {
            run_upsert(&CostCenterUpsert::new(conn), rows, rows_with_errors)
        }
        EntityKind::Services => run_upsert(&ServiceUpsert::new(conn), rows, rows_with_errors),
        EntityKind::Contracts => {
            run_upsert(&ContractUpsert::new(conn, ctx), rows, rows_with_errors)
        }
        EntityKind::Invoices => run_upsert(&InvoiceUpsert::new(conn, ctx), rows, rows_with_errors),
    }
}

/// 稀疏覆写：仅在新值存在时替换
pub(crate) fn overwrite<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

/// 查找依赖的供应商，不存在时中断批次
///
/// # 参数
/// - entity: 错误信息中的实体名（service/contract/invoice）
/// - record: 错误信息中的记录标识
pub(crate) fn require_vendor(
    conn: &Connection,
    entity: &'static str,
    vendor_name: &str,
    record: &str,
) -> DataHubResult<Vendor> {
    VendorRepository::new(conn)
        .find_by_name(vendor_name)?
        .ok_or_else(|| DataHubError::VendorNotFound {
            entity,
            vendor_name: vendor_name.to_string(),
            record: record.to_string(),
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::datahub::dataset_spec::{CleanRow, FieldValue};
    use crate::db::init_schema;
    use rusqlite::Connection;

    pub fn conn() -> Connection {
        let conn = crate::db::open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    pub fn row(fields: &[(&'static str, FieldValue)]) -> CleanRow {
        let mut row = CleanRow::new();
        for (k, v) in fields {
            row.insert(*k, Some(v.clone()));
        }
        row
    }

    pub fn s(v: &str) -> FieldValue {
        FieldValue::Str(v.to_string())
    }
}
