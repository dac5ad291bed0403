// ==========================================
// 成本中心合并策略
// ==========================================
// 自然键: code（精确匹配）

use super::{overwrite, UpsertOutcome, UpsertStrategy};
use crate::datahub::dataset_spec::CleanRow;
use crate::datahub::error::DataHubResult;
use crate::domain::cost_center::CostCenter;
use crate::repository::cost_center_repo::CostCenterRepository;
use rusqlite::Connection;

pub struct CostCenterUpsert<'c> {
    repo: CostCenterRepository<'c>,
}

impl<'c> CostCenterUpsert<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            repo: CostCenterRepository::new(conn),
        }
    }
}

fn apply_fields(cost_center: &mut CostCenter, row: &CleanRow) {
    overwrite(&mut cost_center.business_unit, row.text("business_unit"));
    overwrite(&mut cost_center.region, row.text("region"));
    overwrite(&mut cost_center.default_approver, row.text("default_approver"));
}

impl UpsertStrategy for CostCenterUpsert<'_> {
    type Record = CostCenter;

    fn find_existing(&self, row: &CleanRow) -> DataHubResult<Option<CostCenter>> {
        match row.text("code") {
            Some(code) => Ok(self.repo.find_by_code(&code)?),
            None => Ok(None),
        }
    }

    fn apply(&self, existing: Option<CostCenter>, row: &CleanRow) -> DataHubResult<UpsertOutcome> {
        let (Some(code), Some(name)) = (row.text("code"), row.text("name")) else {
            return Ok(UpsertOutcome::Skipped);
        };

        match existing {
            Some(mut cost_center) => {
                cost_center.name = name;
                apply_fields(&mut cost_center, row);
                self.repo.update(&cost_center)?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let mut cost_center = CostCenter::new(code, name);
                apply_fields(&mut cost_center, row);
                self.repo.insert(&mut cost_center)?;
                Ok(UpsertOutcome::Created)
            }
        }
    }
}
