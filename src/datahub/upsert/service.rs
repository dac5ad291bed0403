// ==========================================
// 服务目录合并策略
// ==========================================
// 自然键: (供应商, name 大小写不敏感)
// 依赖: 供应商必须已存在，否则整批中断

use super::{overwrite, require_vendor, UpsertOutcome, UpsertStrategy};
use crate::datahub::dataset_spec::CleanRow;
use crate::datahub::error::DataHubResult;
use crate::domain::vendor::Service;
use crate::repository::service_repo::ServiceRepository;
use rusqlite::Connection;

pub struct ServiceUpsert<'c> {
    conn: &'c Connection,
    repo: ServiceRepository<'c>,
}

impl<'c> ServiceUpsert<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            repo: ServiceRepository::new(conn),
        }
    }
}

fn apply_fields(service: &mut Service, row: &CleanRow) {
    overwrite(&mut service.category, row.text("category"));
    overwrite(&mut service.service_code, row.text("service_code"));
    overwrite(&mut service.default_currency, row.text("default_currency"));
    overwrite(
        &mut service.default_billing_frequency,
        row.text("default_billing_frequency"),
    );
    overwrite(&mut service.owner_display, row.text("owner_display"));
    overwrite(&mut service.list_price, row.decimal("list_price"));
    overwrite(&mut service.allocation_split, row.text("allocation_split"));
}

impl UpsertStrategy for ServiceUpsert<'_> {
    type Record = Service;

    fn find_existing(&self, row: &CleanRow) -> DataHubResult<Option<Service>> {
        let (Some(vendor_name), Some(name)) = (row.text("vendor_name"), row.text("name")) else {
            return Ok(None);
        };
        let vendor = require_vendor(self.conn, "service", &vendor_name, &name)?;
        Ok(self.repo.find_by_vendor_and_name(vendor.id, &name)?)
    }

    fn apply(&self, existing: Option<Service>, row: &CleanRow) -> DataHubResult<UpsertOutcome> {
        let (Some(vendor_name), Some(name)) = (row.text("vendor_name"), row.text("name")) else {
            return Ok(UpsertOutcome::Skipped);
        };

        match existing {
            Some(mut service) => {
                service.name = name;
                apply_fields(&mut service, row);
                self.repo.update(&service)?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let vendor = require_vendor(self.conn, "service", &vendor_name, &name)?;
                let mut service = Service::new(vendor.id, name);
                apply_fields(&mut service, row);
                self.repo.insert(&mut service)?;
                Ok(UpsertOutcome::Created)
            }
        }
    }
}
