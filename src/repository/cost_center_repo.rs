// ==========================================
// DataNaut 数据中心 - 成本中心数据仓储
// ==========================================
// 自然键: code（精确匹配，唯一）
// ==========================================

use crate::domain::cost_center::CostCenter;
use crate::repository::error::RepositoryResult;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COST_CENTER_COLUMNS: &str = r#"
    id, code, name, business_unit, region, default_approver, created_at, updated_at
"#;

/// 成本中心仓储
pub struct CostCenterRepository<'c> {
    conn: &'c Connection,
}

impl<'c> CostCenterRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<CostCenter> {
        Ok(CostCenter {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            business_unit: row.get(3)?,
            region: row.get(4)?,
            default_approver: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<CostCenter>> {
        let sql = format!(
            "SELECT {} FROM cost_center WHERE code = ?1",
            COST_CENTER_COLUMNS
        );
        let cost_center = self
            .conn
            .query_row(&sql, params![code.trim()], Self::map_row)
            .optional()?;
        Ok(cost_center)
    }

    pub fn insert(&self, cost_center: &mut CostCenter) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO cost_center (
                code, name, business_unit, region, default_approver, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                cost_center.code,
                cost_center.name,
                cost_center.business_unit,
                cost_center.region,
                cost_center.default_approver,
                cost_center.created_at,
                cost_center.updated_at,
            ],
        )?;
        cost_center.id = self.conn.last_insert_rowid();
        Ok(())
    }

    pub fn update(&self, cost_center: &CostCenter) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            UPDATE cost_center SET
                code = ?2, name = ?3, business_unit = ?4, region = ?5,
                default_approver = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
            params![
                cost_center.id,
                cost_center.code,
                cost_center.name,
                cost_center.business_unit,
                cost_center.region,
                cost_center.default_approver,
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    /// 全部成本中心（按 code 排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<CostCenter>> {
        let sql = format!(
            "SELECT {} FROM cost_center ORDER BY code, id",
            COST_CENTER_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM cost_center", [], |row| row.get(0))?;
        Ok(count)
    }
}
