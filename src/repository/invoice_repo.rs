// ==========================================
// DataNaut 数据中心 - 发票数据仓储
// ==========================================
// 自然键: (owner, vendor_id, invoice_number_key) 唯一
// ==========================================

use crate::domain::contract::Invoice;
use crate::repository::codec::{
    decimal_column, decimal_to_sql, natural_key, required_decimal_column,
};
use crate::repository::error::RepositoryResult;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const INVOICE_COLUMNS: &str = r#"
    i.id, i.owner, i.vendor_id, i.contract_id, i.invoice_number, i.invoice_date,
    i.currency, i.total_amount, i.tax_amount, i.period_start, i.period_end, i.notes,
    i.created_at, i.updated_at
"#;

/// 发票 + 供应商名 + 关联合同名（导出用）
#[derive(Debug, Clone)]
pub struct InvoiceExportRow {
    pub vendor_name: String,
    pub contract_name: Option<String>,
    pub invoice: Invoice,
}

/// 发票仓储
pub struct InvoiceRepository<'c> {
    conn: &'c Connection,
}

impl<'c> InvoiceRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Invoice> {
        Ok(Invoice {
            id: row.get(0)?,
            owner: row.get(1)?,
            vendor_id: row.get(2)?,
            contract_id: row.get(3)?,
            invoice_number: row.get(4)?,
            invoice_date: row.get(5)?,
            currency: row.get(6)?,
            total_amount: required_decimal_column(row, 7)?,
            tax_amount: decimal_column(row, 8)?,
            period_start: row.get(9)?,
            period_end: row.get(10)?,
            notes: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    pub fn find_by_natural_key(
        &self,
        owner: &str,
        vendor_id: i64,
        invoice_number: &str,
    ) -> RepositoryResult<Option<Invoice>> {
        let sql = format!(
            r#"
            SELECT {} FROM invoice i
            WHERE i.owner = ?1 AND i.vendor_id = ?2 AND i.invoice_number_key = ?3
            "#,
            INVOICE_COLUMNS
        );
        let invoice = self
            .conn
            .query_row(
                &sql,
                params![owner, vendor_id, natural_key(invoice_number)],
                Self::map_row,
            )
            .optional()?;
        Ok(invoice)
    }

    pub fn insert(&self, invoice: &mut Invoice) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO invoice (
                owner, vendor_id, contract_id, invoice_number, invoice_number_key,
                invoice_date, currency, total_amount, tax_amount, period_start,
                period_end, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                invoice.owner,
                invoice.vendor_id,
                invoice.contract_id,
                invoice.invoice_number,
                natural_key(&invoice.invoice_number),
                invoice.invoice_date,
                invoice.currency,
                invoice.total_amount.to_string(),
                decimal_to_sql(invoice.tax_amount),
                invoice.period_start,
                invoice.period_end,
                invoice.notes,
                invoice.created_at,
                invoice.updated_at,
            ],
        )?;
        invoice.id = self.conn.last_insert_rowid();
        Ok(())
    }

    pub fn update(&self, invoice: &Invoice) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            UPDATE invoice SET
                contract_id = ?2, invoice_number = ?3, invoice_number_key = ?4,
                invoice_date = ?5, currency = ?6, total_amount = ?7, tax_amount = ?8,
                period_start = ?9, period_end = ?10, notes = ?11, updated_at = ?12
            WHERE id = ?1
            "#,
            params![
                invoice.id,
                invoice.contract_id,
                invoice.invoice_number,
                natural_key(&invoice.invoice_number),
                invoice.invoice_date,
                invoice.currency,
                invoice.total_amount.to_string(),
                decimal_to_sql(invoice.tax_amount),
                invoice.period_start,
                invoice.period_end,
                invoice.notes,
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    /// 用户的全部发票（发票日期倒序，其次 id 倒序）
    pub fn list_for_export(&self, owner: &str) -> RepositoryResult<Vec<InvoiceExportRow>> {
        let sql = format!(
            r#"
            SELECT {}, v.name, c.contract_name
            FROM invoice i
            JOIN vendor v ON v.id = i.vendor_id
            LEFT JOIN contract c ON c.id = i.contract_id
            WHERE i.owner = ?1
            ORDER BY i.invoice_date DESC, i.id DESC
            "#,
            INVOICE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![owner], |row| {
                Ok(InvoiceExportRow {
                    invoice: Self::map_row(row)?,
                    vendor_name: row.get(14)?,
                    contract_name: row.get(15)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_for_owner(&self, owner: &str) -> RepositoryResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM invoice WHERE owner = ?1",
            params![owner],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
