// ==========================================
// DataNaut 数据中心 - 导出与模板
// ==========================================
// 行格式: 按模板表头顺序的字符串；小数原样、日期 ISO，保证可回导
// 排序: 见各仓储 list 方法
// ==========================================

use crate::config::DataHubConfig;
use crate::datahub::error::DataHubResult;
use crate::datahub::file_parser::TableFormat;
use crate::datahub::registry::EntityKind;
use crate::datahub::table_writer::{write_table, ExportFile};
use crate::repository::{
    ContractRepository, CostCenterRepository, InvoiceRepository, ServiceRepository,
    VendorRepository,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::info;

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn decimal(value: Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

/// 读取实体数据并转为导出行
///
/// # 参数
/// - owner: 合同/发票仅导出该用户的数据
pub fn export_rows(conn: &Connection, kind: EntityKind, owner: &str) -> DataHubResult<Vec<Vec<String>>> {
    let rows = match kind {
        EntityKind::Vendors => VendorRepository::new(conn)
            .list_all()?
            .into_iter()
            .map(|v| {
                vec![
                    v.name,
                    text(&v.vendor_type),
                    text(&v.tags),
                    text(&v.primary_contact_name),
                    text(&v.primary_contact_email),
                    text(&v.website),
                    text(&v.notes),
                ]
            })
            .collect(),
        EntityKind::CostCenters => CostCenterRepository::new(conn)
            .list_all()?
            .into_iter()
            .map(|cc| vec![cc.code, cc.name, text(&cc.business_unit), text(&cc.region)])
            .collect(),
        EntityKind::Services => ServiceRepository::new(conn)
            .list_for_export()?
            .into_iter()
            .map(|row| {
                let s = row.service;
                vec![
                    row.vendor_name,
                    s.name,
                    text(&s.category),
                    text(&s.service_code),
                    text(&s.default_currency),
                    text(&s.default_billing_frequency),
                    text(&s.owner_display),
                    decimal(s.list_price),
                    text(&s.allocation_split),
                ]
            })
            .collect(),
        EntityKind::Contracts => ContractRepository::new(conn)
            .list_for_export(owner)?
            .into_iter()
            .map(|row| {
                let c = row.contract;
                vec![
                    row.vendor_name,
                    c.contract_name,
                    text(&c.contract_id),
                    text(&c.contract_type),
                    text(&c.entity),
                    decimal(c.annual_value),
                    text(&c.currency),
                    date(c.start_date),
                    date(c.end_date),
                    date(c.renewal_date),
                    c.notice_period_days.map(|d| d.to_string()).unwrap_or_default(),
                    date(c.notice_date),
                    text(&c.status),
                ]
            })
            .collect(),
        EntityKind::Invoices => InvoiceRepository::new(conn)
            .list_for_export(owner)?
            .into_iter()
            .map(|row| {
                let i = row.invoice;
                vec![
                    row.vendor_name,
                    text(&row.contract_name),
                    i.invoice_number,
                    i.invoice_date.to_string(),
                    i.currency,
                    i.total_amount.to_string(),
                    decimal(i.tax_amount),
                    date(i.period_start),
                    date(i.period_end),
                    text(&i.notes),
                ]
            })
            .collect(),
    };
    Ok(rows)
}

/// 导出文件名: {prefix}_{entity}_{YYYYMMDD_HHMMSS}.{ext}
pub fn export_filename(
    prefix: &str,
    kind: EntityKind,
    format: TableFormat,
    at: DateTime<Utc>,
) -> String {
    format!(
        "{}_{}_{}.{}",
        prefix,
        kind.key(),
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// 导出实体数据
pub fn export(
    conn: &Connection,
    kind: EntityKind,
    owner: &str,
    format: TableFormat,
    config: &DataHubConfig,
) -> DataHubResult<ExportFile> {
    let rows = export_rows(conn, kind, owner)?;
    let bytes = write_table(format, kind.key(), kind.template_headers(), &rows)?;
    let filename = export_filename(&config.export_filename_prefix, kind, format, Utc::now());

    info!(entity = %kind, rows = rows.len(), filename = %filename, "导出完成");
    Ok(ExportFile::new(filename, format, bytes))
}

/// 模板: 仅表头
pub fn template(kind: EntityKind, format: TableFormat) -> DataHubResult<ExportFile> {
    let bytes = write_table(format, kind.key(), kind.template_headers(), &[])?;
    Ok(ExportFile::new(
        format!("template_{}.{}", kind.key(), format.extension()),
        format,
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};
    use crate::domain::contract::Contract;
    use crate::domain::vendor::{Service, Vendor};
    use chrono::TimeZone;
    use std::str::FromStr;

    fn conn() -> Connection {
        let conn = open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_export_filename() {
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            export_filename("datanaut", EntityKind::CostCenters, TableFormat::Csv, at),
            "datanaut_cost-centers_20250309_140507.csv"
        );
    }

    #[test]
    fn test_template_is_header_only() {
        let file = template(EntityKind::CostCenters, TableFormat::Csv).unwrap();
        assert_eq!(file.filename, "template_cost-centers.csv");
        assert_eq!(file.content_type, "text/csv; charset=utf-8");
        assert_eq!(file.bytes, b"code,name,business_unit,region\n");
    }

    #[test]
    fn test_services_sorted_by_vendor_then_name() {
        let conn = conn();
        let vendors = VendorRepository::new(&conn);
        let mut zeta = Vendor::new("Zeta");
        vendors.insert(&mut zeta).unwrap();
        let mut acme = Vendor::new("acme");
        vendors.insert(&mut acme).unwrap();

        let services = ServiceRepository::new(&conn);
        services.insert(&mut Service::new(zeta.id, "Alpha")).unwrap();
        let mut priced = Service::new(acme.id, "Feed");
        priced.list_price = Some(Decimal::from_str("1234.50").unwrap());
        services.insert(&mut priced).unwrap();
        services.insert(&mut Service::new(acme.id, "Desk")).unwrap();

        let rows = export_rows(&conn, EntityKind::Services, "alice").unwrap();
        let keys: Vec<(&str, &str)> = rows.iter().map(|r| (r[0].as_str(), r[1].as_str())).collect();
        assert_eq!(keys, vec![("acme", "Desk"), ("acme", "Feed"), ("Zeta", "Alpha")]);
        assert_eq!(rows[1][7], "1234.50");
        assert_eq!(rows[0].len(), EntityKind::Services.template_headers().len());
    }

    #[test]
    fn test_contracts_owner_scoped() {
        let conn = conn();
        let mut vendor = Vendor::new("Acme");
        VendorRepository::new(&conn).insert(&mut vendor).unwrap();
        let repo = ContractRepository::new(&conn);
        let mut mine = Contract::new("alice", vendor.id, "Feed");
        mine.end_date = NaiveDate::from_ymd_opt(2025, 12, 31);
        mine.notice_period_days = Some(90);
        repo.insert(&mut mine).unwrap();
        repo.insert(&mut Contract::new("bob", vendor.id, "Other")).unwrap();

        let rows = export_rows(&conn, EntityKind::Contracts, "alice").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "Feed");
        assert_eq!(rows[0][8], "2025-12-31");
        assert_eq!(rows[0][10], "90");
    }
}
