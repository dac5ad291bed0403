// ==========================================
// DataNaut 数据中心 - 合同数据仓储
// ==========================================
// 归属: 所有查询均限定 owner
// 自然键: (owner, vendor_id, contract_name_key[, contract_id_key])
// ==========================================

use crate::domain::contract::Contract;
use crate::repository::codec::{decimal_column, decimal_to_sql, natural_key};
use crate::repository::error::RepositoryResult;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const CONTRACT_COLUMNS: &str = r#"
    c.id, c.owner, c.vendor_id, c.contract_name, c.contract_id, c.contract_type,
    c.entity, c.annual_value, c.currency, c.start_date, c.end_date, c.renewal_date,
    c.notice_period_days, c.notice_date, c.status, c.uploaded_by,
    c.created_at, c.updated_at
"#;

/// 合同 + 供应商名（导出用）
#[derive(Debug, Clone)]
pub struct ContractExportRow {
    pub vendor_name: String,
    pub contract: Contract,
}

/// 合同仓储
pub struct ContractRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ContractRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Contract> {
        Ok(Contract {
            id: row.get(0)?,
            owner: row.get(1)?,
            vendor_id: row.get(2)?,
            contract_name: row.get(3)?,
            contract_id: row.get(4)?,
            contract_type: row.get(5)?,
            entity: row.get(6)?,
            annual_value: decimal_column(row, 7)?,
            currency: row.get(8)?,
            start_date: row.get(9)?,
            end_date: row.get(10)?,
            renewal_date: row.get(11)?,
            notice_period_days: row.get(12)?,
            notice_date: row.get(13)?,
            status: row.get(14)?,
            uploaded_by: row.get(15)?,
            created_at: row.get(16)?,
            updated_at: row.get(17)?,
        })
    }

    /// 按自然键查找
    ///
    /// # 参数
    /// - contract_id: 给定时作为附加匹配条件（大小写不敏感）
    ///
    /// # 返回
    /// 多条命中时取最早创建的一条
    pub fn find_by_natural_key(
        &self,
        owner: &str,
        vendor_id: i64,
        contract_name: &str,
        contract_id: Option<&str>,
    ) -> RepositoryResult<Option<Contract>> {
        let contract = match contract_id {
            Some(contract_id) => {
                let sql = format!(
                    r#"
                    SELECT {} FROM contract c
                    WHERE c.owner = ?1 AND c.vendor_id = ?2
                      AND c.contract_name_key = ?3 AND c.contract_id_key = ?4
                    ORDER BY c.id LIMIT 1
                    "#,
                    CONTRACT_COLUMNS
                );
                self.conn
                    .query_row(
                        &sql,
                        params![owner, vendor_id, natural_key(contract_name), natural_key(contract_id)],
                        Self::map_row,
                    )
                    .optional()?
            }
            None => {
                let sql = format!(
                    r#"
                    SELECT {} FROM contract c
                    WHERE c.owner = ?1 AND c.vendor_id = ?2 AND c.contract_name_key = ?3
                    ORDER BY c.id LIMIT 1
                    "#,
                    CONTRACT_COLUMNS
                );
                self.conn
                    .query_row(
                        &sql,
                        params![owner, vendor_id, natural_key(contract_name)],
                        Self::map_row,
                    )
                    .optional()?
            }
        };
        Ok(contract)
    }

    /// 按名称查找（可选限定供应商），用于发票关联合同
    pub fn find_by_name(
        &self,
        owner: &str,
        vendor_id: Option<i64>,
        contract_name: &str,
    ) -> RepositoryResult<Option<Contract>> {
        let sql = format!(
            r#"
            SELECT {} FROM contract c
            WHERE c.owner = ?1 AND c.contract_name_key = ?2
              AND (?3 IS NULL OR c.vendor_id = ?3)
            ORDER BY c.id LIMIT 1
            "#,
            CONTRACT_COLUMNS
        );
        let contract = self
            .conn
            .query_row(
                &sql,
                params![owner, natural_key(contract_name), vendor_id],
                Self::map_row,
            )
            .optional()?;
        Ok(contract)
    }

    pub fn insert(&self, contract: &mut Contract) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO contract (
                owner, vendor_id, contract_name, contract_name_key, contract_id,
                contract_id_key, contract_type, entity, annual_value, currency,
                start_date, end_date, renewal_date, notice_period_days, notice_date,
                status, uploaded_by, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19
            )
            "#,
            params![
                contract.owner,
                contract.vendor_id,
                contract.contract_name,
                natural_key(&contract.contract_name),
                contract.contract_id,
                contract.contract_id.as_deref().map(natural_key),
                contract.contract_type,
                contract.entity,
                decimal_to_sql(contract.annual_value),
                contract.currency,
                contract.start_date,
                contract.end_date,
                contract.renewal_date,
                contract.notice_period_days,
                contract.notice_date,
                contract.status,
                contract.uploaded_by,
                contract.created_at,
                contract.updated_at,
            ],
        )?;
        contract.id = self.conn.last_insert_rowid();
        Ok(())
    }

    pub fn update(&self, contract: &Contract) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            UPDATE contract SET
                vendor_id = ?2, contract_name = ?3, contract_name_key = ?4,
                contract_id = ?5, contract_id_key = ?6, contract_type = ?7,
                entity = ?8, annual_value = ?9, currency = ?10, start_date = ?11,
                end_date = ?12, renewal_date = ?13, notice_period_days = ?14,
                notice_date = ?15, status = ?16, uploaded_by = ?17, updated_at = ?18
            WHERE id = ?1
            "#,
            params![
                contract.id,
                contract.vendor_id,
                contract.contract_name,
                natural_key(&contract.contract_name),
                contract.contract_id,
                contract.contract_id.as_deref().map(natural_key),
                contract.contract_type,
                contract.entity,
                decimal_to_sql(contract.annual_value),
                contract.currency,
                contract.start_date,
                contract.end_date,
                contract.renewal_date,
                contract.notice_period_days,
                contract.notice_date,
                contract.status,
                contract.uploaded_by,
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    /// 用户的全部合同（最新创建在前）
    pub fn list_for_export(&self, owner: &str) -> RepositoryResult<Vec<ContractExportRow>> {
        let sql = format!(
            r#"
            SELECT {}, v.name
            FROM contract c
            JOIN vendor v ON v.id = c.vendor_id
            WHERE c.owner = ?1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
            CONTRACT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![owner], |row| {
                Ok(ContractExportRow {
                    contract: Self::map_row(row)?,
                    vendor_name: row.get(18)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_for_owner(&self, owner: &str) -> RepositoryResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM contract WHERE owner = ?1",
            params![owner],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
