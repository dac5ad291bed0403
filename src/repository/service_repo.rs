// ==========================================
// DataNaut 数据中心 - 服务目录数据仓储
// ==========================================
// 自然键: (vendor_id, name_key) 唯一
// ==========================================

use crate::domain::vendor::Service;
use crate::repository::codec::{decimal_column, decimal_to_sql, natural_key};
use crate::repository::error::RepositoryResult;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SERVICE_COLUMNS: &str = r#"
    s.id, s.vendor_id, s.name, s.category, s.service_code, s.default_currency,
    s.default_billing_frequency, s.owner_display, s.list_price, s.allocation_split,
    s.created_at, s.updated_at
"#;

/// 服务 + 所属供应商名（导出用）
#[derive(Debug, Clone)]
pub struct ServiceExportRow {
    pub vendor_name: String,
    pub service: Service,
}

/// 服务目录仓储
pub struct ServiceRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ServiceRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Service> {
        Ok(Service {
            id: row.get(0)?,
            vendor_id: row.get(1)?,
            name: row.get(2)?,
            category: row.get(3)?,
            service_code: row.get(4)?,
            default_currency: row.get(5)?,
            default_billing_frequency: row.get(6)?,
            owner_display: row.get(7)?,
            list_price: decimal_column(row, 8)?,
            allocation_split: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    /// 按 (供应商, 名称) 查找（名称大小写不敏感）
    pub fn find_by_vendor_and_name(
        &self,
        vendor_id: i64,
        name: &str,
    ) -> RepositoryResult<Option<Service>> {
        let sql = format!(
            "SELECT {} FROM service s WHERE s.vendor_id = ?1 AND s.name_key = ?2",
            SERVICE_COLUMNS
        );
        let service = self
            .conn
            .query_row(&sql, params![vendor_id, natural_key(name)], Self::map_row)
            .optional()?;
        Ok(service)
    }

    pub fn insert(&self, service: &mut Service) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO service (
                vendor_id, name, name_key, category, service_code, default_currency,
                default_billing_frequency, owner_display, list_price, allocation_split,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                service.vendor_id,
                service.name,
                natural_key(&service.name),
                service.category,
                service.service_code,
                service.default_currency,
                service.default_billing_frequency,
                service.owner_display,
                decimal_to_sql(service.list_price),
                service.allocation_split,
                service.created_at,
                service.updated_at,
            ],
        )?;
        service.id = self.conn.last_insert_rowid();
        Ok(())
    }

    pub fn update(&self, service: &Service) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            UPDATE service SET
                name = ?2, name_key = ?3, category = ?4, service_code = ?5,
                default_currency = ?6, default_billing_frequency = ?7,
                owner_display = ?8, list_price = ?9, allocation_split = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
            params![
                service.id,
                service.name,
                natural_key(&service.name),
                service.category,
                service.service_code,
                service.default_currency,
                service.default_billing_frequency,
                service.owner_display,
                decimal_to_sql(service.list_price),
                service.allocation_split,
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    /// 全部服务（按供应商名、服务名排序）
    pub fn list_for_export(&self) -> RepositoryResult<Vec<ServiceExportRow>> {
        let sql = format!(
            r#"
            SELECT {}, v.name
            FROM service s
            JOIN vendor v ON v.id = s.vendor_id
            ORDER BY v.name COLLATE NOCASE, s.name COLLATE NOCASE, s.id
            "#,
            SERVICE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ServiceExportRow {
                    service: Self::map_row(row)?,
                    vendor_name: row.get(12)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM service", [], |row| row.get(0))?;
        Ok(count)
    }
}
