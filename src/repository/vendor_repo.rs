// ==========================================
// DataNaut 数据中心 - 供应商数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 自然键: name_key = lower(trim(name))，唯一
// ==========================================

use crate::domain::vendor::Vendor;
use crate::repository::codec::natural_key;
use crate::repository::error::RepositoryResult;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const VENDOR_COLUMNS: &str = r#"
    id, name, vendor_type, tags, primary_contact_name, primary_contact_email,
    website, notes, created_at, updated_at
"#;

/// 供应商仓储
/// 职责: 管理 vendor 表的读写（连接或事务由调用方持有）
pub struct VendorRepository<'c> {
    conn: &'c Connection,
}

impl<'c> VendorRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Vendor> {
        Ok(Vendor {
            id: row.get(0)?,
            name: row.get(1)?,
            vendor_type: row.get(2)?,
            tags: row.get(3)?,
            primary_contact_name: row.get(4)?,
            primary_contact_email: row.get(5)?,
            website: row.get(6)?,
            notes: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    /// 按名称查找（大小写不敏感）
    ///
    /// # 返回
    /// - Ok(Some(Vendor)): 找到
    /// - Ok(None): 未找到
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Vendor>> {
        let sql = format!("SELECT {} FROM vendor WHERE name_key = ?1", VENDOR_COLUMNS);
        let vendor = self
            .conn
            .query_row(&sql, params![natural_key(name)], Self::map_row)
            .optional()?;
        Ok(vendor)
    }

    /// 插入新供应商，回填 id
    pub fn insert(&self, vendor: &mut Vendor) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO vendor (
                name, name_key, vendor_type, tags, primary_contact_name,
                primary_contact_email, website, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                vendor.name,
                natural_key(&vendor.name),
                vendor.vendor_type,
                vendor.tags,
                vendor.primary_contact_name,
                vendor.primary_contact_email,
                vendor.website,
                vendor.notes,
                vendor.created_at,
                vendor.updated_at,
            ],
        )?;
        vendor.id = self.conn.last_insert_rowid();
        Ok(())
    }

    /// 按 id 整行更新（updated_at 取当前时间）
    pub fn update(&self, vendor: &Vendor) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            UPDATE vendor SET
                name = ?2, name_key = ?3, vendor_type = ?4, tags = ?5,
                primary_contact_name = ?6, primary_contact_email = ?7,
                website = ?8, notes = ?9, updated_at = ?10
            WHERE id = ?1
            "#,
            params![
                vendor.id,
                vendor.name,
                natural_key(&vendor.name),
                vendor.vendor_type,
                vendor.tags,
                vendor.primary_contact_name,
                vendor.primary_contact_email,
                vendor.website,
                vendor.notes,
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    /// 全部供应商（按名称排序，导出用）
    pub fn list_all(&self) -> RepositoryResult<Vec<Vendor>> {
        let sql = format!(
            "SELECT {} FROM vendor ORDER BY name COLLATE NOCASE, id",
            VENDOR_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let vendors = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(vendors)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM vendor", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_find_case_insensitive() {
        let conn = setup();
        let repo = VendorRepository::new(&conn);

        let mut vendor = Vendor::new("Bloomberg LP");
        vendor.website = Some("https://bloomberg.com".to_string());
        repo.insert(&mut vendor).unwrap();
        assert!(vendor.id > 0);

        let found = repo.find_by_name("  BLOOMBERG lp ").unwrap().unwrap();
        assert_eq!(found.id, vendor.id);
        assert_eq!(found.website.as_deref(), Some("https://bloomberg.com"));
        assert!(repo.find_by_name("Refinitiv").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let conn = setup();
        let repo = VendorRepository::new(&conn);
        repo.insert(&mut Vendor::new("Acme")).unwrap();
        assert!(repo.insert(&mut Vendor::new("ACME")).is_err());
    }

    #[test]
    fn test_update_and_list_order() {
        let conn = setup();
        let repo = VendorRepository::new(&conn);
        let mut zeta = Vendor::new("zeta");
        repo.insert(&mut zeta).unwrap();
        repo.insert(&mut Vendor::new("Alpha")).unwrap();

        zeta.name = "Zeta".to_string();
        zeta.notes = Some("renamed".to_string());
        repo.update(&zeta).unwrap();

        let names: Vec<String> = repo.list_all().unwrap().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
        assert_eq!(repo.count().unwrap(), 2);
    }
}
