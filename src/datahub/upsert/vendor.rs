// ==========================================
// 供应商合并策略
// ==========================================
// 自然键: name（大小写不敏感）；更新时名称大小写以文件为准

use super::{overwrite, UpsertOutcome, UpsertStrategy};
use crate::datahub::dataset_spec::CleanRow;
use crate::datahub::error::DataHubResult;
use crate::domain::vendor::Vendor;
use crate::repository::vendor_repo::VendorRepository;
use rusqlite::Connection;

pub struct VendorUpsert<'c> {
    repo: VendorRepository<'c>,
}

impl<'c> VendorUpsert<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            repo: VendorRepository::new(conn),
        }
    }
}

/// 可选字段稀疏覆写
fn apply_fields(vendor: &mut Vendor, row: &CleanRow) {
    overwrite(&mut vendor.vendor_type, row.text("vendor_type"));
    overwrite(&mut vendor.tags, row.text("tags"));
    overwrite(&mut vendor.primary_contact_name, row.text("primary_contact_name"));
    overwrite(&mut vendor.primary_contact_email, row.text("primary_contact_email"));
    overwrite(&mut vendor.website, row.text("website"));
    overwrite(&mut vendor.notes, row.text("notes"));
}

impl UpsertStrategy for VendorUpsert<'_> {
    type Record = Vendor;

    fn find_existing(&self, row: &CleanRow) -> DataHubResult<Option<Vendor>> {
        match row.text("name") {
            Some(name) => Ok(self.repo.find_by_name(&name)?),
            None => Ok(None),
        }
    }

    fn apply(&self, existing: Option<Vendor>, row: &CleanRow) -> DataHubResult<UpsertOutcome> {
        let Some(name) = row.text("name") else {
            return Ok(UpsertOutcome::Skipped);
        };

        match existing {
            Some(mut vendor) => {
                vendor.name = name;
                apply_fields(&mut vendor, row);
                self.repo.update(&vendor)?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let mut vendor = Vendor::new(name);
                apply_fields(&mut vendor, row);
                self.repo.insert(&mut vendor)?;
                Ok(UpsertOutcome::Created)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{conn, row, s};
    use super::super::run_upsert;
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_second_import_updates_only_present_fields() {
        let conn = conn();
        let strategy = VendorUpsert::new(&conn);
        let none = HashSet::new();

        let first = vec![row(&[
            ("name", s("Bloomberg")),
            ("website", s("https://bloomberg.com")),
            ("notes", s("terminal vendor")),
        ])];
        let report = run_upsert(&strategy, &first, &none).unwrap();
        assert_eq!(report.summary.created, 1);

        let mut second_row = row(&[("name", s("BLOOMBERG")), ("vendor_type", s("Market data"))]);
        second_row.insert("notes", Some(s("   ")));
        let report = run_upsert(&strategy, &[second_row], &none).unwrap();
        assert_eq!(report.summary.updated, 1);

        let vendor = VendorRepository::new(&conn)
            .find_by_name("bloomberg")
            .unwrap()
            .unwrap();
        assert_eq!(vendor.name, "BLOOMBERG");
        assert_eq!(vendor.vendor_type.as_deref(), Some("Market data"));
        assert_eq!(vendor.website.as_deref(), Some("https://bloomberg.com"));
        assert_eq!(vendor.notes.as_deref(), Some("terminal vendor"));
        assert_eq!(VendorRepository::new(&conn).count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_names_in_one_batch() {
        let conn = conn();
        let rows = vec![row(&[("name", s("Acme"))]), row(&[("name", s("acme"))])];
        let report = run_upsert(&VendorUpsert::new(&conn), &rows, &HashSet::new()).unwrap();
        assert_eq!(report.summary.created, 1);
        assert_eq!(report.summary.updated, 1);
    }

    #[test]
    fn test_missing_name_skipped() {
        let conn = conn();
        let rows = vec![row(&[("website", s("x"))])];
        let report = run_upsert(&VendorUpsert::new(&conn), &rows, &HashSet::new()).unwrap();
        assert_eq!(report.skipped_rows, vec![1]);
    }
}
