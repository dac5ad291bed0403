// ==========================================
// 合同合并策略
// ==========================================
// 自然键: (owner, 供应商, contract_name[, contract_id])，名称与编号大小写不敏感
// 规则（违反即整批中断）:
// - notice_period_days 必须在允许集合内
// - notice_date 需要 end_date（本行或已有记录）
// - notice_date 不得晚于 end_date
// ==========================================

use super::{overwrite, require_vendor, UpsertContext, UpsertOutcome, UpsertStrategy};
use crate::datahub::dataset_spec::CleanRow;
use crate::datahub::error::{DataHubError, DataHubResult};
use crate::domain::contract::Contract;
use crate::repository::contract_repo::ContractRepository;
use rusqlite::Connection;

pub struct ContractUpsert<'c> {
    conn: &'c Connection,
    repo: ContractRepository<'c>,
    ctx: UpsertContext<'c>,
}

impl<'c> ContractUpsert<'c> {
    pub fn new(conn: &'c Connection, ctx: UpsertContext<'c>) -> Self {
        Self {
            conn,
            repo: ContractRepository::new(conn),
            ctx,
        }
    }

    fn check_notice_period(&self, contract_name: &str, row: &CleanRow) -> DataHubResult<()> {
        let Some(days) = row.int("notice_period_days") else {
            return Ok(());
        };
        if self.ctx.config.allowed_notice_periods.contains(&days) {
            return Ok(());
        }
        Err(DataHubError::InvalidNoticePeriod {
            value: days.to_string(),
            contract_name: contract_name.to_string(),
            allowed: self.ctx.config.allowed_notice_periods_display(),
        })
    }
}

/// 通知日期一致性（本行值优先，缺失时取已有记录）
fn check_notice_dates(
    contract_name: &str,
    existing: Option<&Contract>,
    row: &CleanRow,
) -> DataHubResult<()> {
    let end_date = row.date("end_date").or(existing.and_then(|c| c.end_date));
    let notice_date = row
        .date("notice_date")
        .or(existing.and_then(|c| c.notice_date));

    match (notice_date, end_date) {
        (Some(_), None) => Err(DataHubError::NoticeDateWithoutEndDate(
            contract_name.to_string(),
        )),
        (Some(notice_date), Some(end_date)) if notice_date > end_date => {
            Err(DataHubError::NoticeDateAfterEndDate {
                contract_name: contract_name.to_string(),
                notice_date,
                end_date,
            })
        }
        _ => Ok(()),
    }
}

fn apply_fields(contract: &mut Contract, row: &CleanRow) {
    overwrite(&mut contract.contract_id, row.text("contract_id"));
    overwrite(&mut contract.contract_type, row.text("contract_type"));
    overwrite(&mut contract.entity, row.text("entity"));
    overwrite(&mut contract.annual_value, row.decimal("annual_value"));
    overwrite(&mut contract.currency, row.text("currency"));
    overwrite(&mut contract.start_date, row.date("start_date"));
    overwrite(&mut contract.end_date, row.date("end_date"));
    overwrite(&mut contract.renewal_date, row.date("renewal_date"));
    overwrite(&mut contract.notice_period_days, row.int("notice_period_days"));
    overwrite(&mut contract.notice_date, row.date("notice_date"));
    overwrite(&mut contract.status, row.text("status"));
}

impl UpsertStrategy for ContractUpsert<'_> {
    type Record = Contract;

    fn find_existing(&self, row: &CleanRow) -> DataHubResult<Option<Contract>> {
        let (Some(vendor_name), Some(contract_name)) =
            (row.text("vendor_name"), row.text("contract_name"))
        else {
            return Ok(None);
        };
        let vendor = require_vendor(self.conn, "contract", &vendor_name, &contract_name)?;
        let contract_id = row.text("contract_id");
        Ok(self.repo.find_by_natural_key(
            self.ctx.owner,
            vendor.id,
            &contract_name,
            contract_id.as_deref(),
        )?)
    }

    fn apply(&self, existing: Option<Contract>, row: &CleanRow) -> DataHubResult<UpsertOutcome> {
        let (Some(vendor_name), Some(contract_name)) =
            (row.text("vendor_name"), row.text("contract_name"))
        else {
            return Ok(UpsertOutcome::Skipped);
        };

        self.check_notice_period(&contract_name, row)?;
        check_notice_dates(&contract_name, existing.as_ref(), row)?;

        match existing {
            Some(mut contract) => {
                contract.contract_name = contract_name;
                contract.uploaded_by = Some(self.ctx.owner.to_string());
                apply_fields(&mut contract, row);
                self.repo.update(&contract)?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let vendor = require_vendor(self.conn, "contract", &vendor_name, &contract_name)?;
                let mut contract = Contract::new(self.ctx.owner, vendor.id, contract_name);
                contract.uploaded_by = Some(self.ctx.owner.to_string());
                apply_fields(&mut contract, row);
                self.repo.insert(&mut contract)?;
                Ok(UpsertOutcome::Created)
            }
        }
    }
}
