// ==========================================
// 发票合并策略
// ==========================================
// 自然键: (owner, 供应商, invoice_number 大小写不敏感)
// 合同关联: 先按 (owner, 供应商, 合同名)，再按 (owner, 合同名)
// ==========================================

use super::{overwrite, require_vendor, UpsertContext, UpsertOutcome, UpsertStrategy};
use crate::datahub::dataset_spec::CleanRow;
use crate::datahub::error::DataHubResult;
use crate::domain::contract::Invoice;
use crate::repository::contract_repo::ContractRepository;
use crate::repository::invoice_repo::InvoiceRepository;
use rusqlite::Connection;
use tracing::debug;

pub struct InvoiceUpsert<'c> {
    conn: &'c Connection,
    repo: InvoiceRepository<'c>,
    contracts: ContractRepository<'c>,
    ctx: UpsertContext<'c>,
}

impl<'c> InvoiceUpsert<'c> {
    pub fn new(conn: &'c Connection, ctx: UpsertContext<'c>) -> Self {
        Self {
            conn,
            repo: InvoiceRepository::new(conn),
            contracts: ContractRepository::new(conn),
            ctx,
        }
    }

    /// 解析关联合同 id（未找到返回 None，不视为错误）
    fn resolve_contract(&self, vendor_id: i64, row: &CleanRow) -> DataHubResult<Option<i64>> {
        let Some(contract_name) = row.text("contract_name") else {
            return Ok(None);
        };
        let owner = self.ctx.owner;
        let contract = match self
            .contracts
            .find_by_name(owner, Some(vendor_id), &contract_name)?
        {
            Some(contract) => Some(contract),
            None => self.contracts.find_by_name(owner, None, &contract_name)?,
        };
        if contract.is_none() {
            debug!(contract_name = %contract_name, "invoice contract link not found");
        }
        Ok(contract.map(|c| c.id))
    }
}

fn apply_fields(invoice: &mut Invoice, row: &CleanRow) {
    if let Some(invoice_date) = row.date("invoice_date") {
        invoice.invoice_date = invoice_date;
    }
    if let Some(currency) = row.text("currency") {
        invoice.currency = currency;
    }
    if let Some(total_amount) = row.decimal("total_amount") {
        invoice.total_amount = total_amount;
    }
    overwrite(&mut invoice.tax_amount, row.decimal("tax_amount"));
    overwrite(&mut invoice.period_start, row.date("period_start"));
    overwrite(&mut invoice.period_end, row.date("period_end"));
    overwrite(&mut invoice.notes, row.text("notes"));
}

impl UpsertStrategy for InvoiceUpsert<'_> {
    type Record = Invoice;

    fn find_existing(&self, row: &CleanRow) -> DataHubResult<Option<Invoice>> {
        let (Some(vendor_name), Some(number)) =
            (row.text("vendor_name"), row.text("invoice_number"))
        else {
            return Ok(None);
        };
        let vendor = require_vendor(self.conn, "invoice", &vendor_name, &number)?;
        Ok(self
            .repo
            .find_by_natural_key(self.ctx.owner, vendor.id, &number)?)
    }

    fn apply(&self, existing: Option<Invoice>, row: &CleanRow) -> DataHubResult<UpsertOutcome> {
        let (Some(vendor_name), Some(number)) =
            (row.text("vendor_name"), row.text("invoice_number"))
        else {
            return Ok(UpsertOutcome::Skipped);
        };

        match existing {
            Some(mut invoice) => {
                invoice.invoice_number = number;
                overwrite(
                    &mut invoice.contract_id,
                    self.resolve_contract(invoice.vendor_id, row)?,
                );
                apply_fields(&mut invoice, row);
                self.repo.update(&invoice)?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let vendor = require_vendor(self.conn, "invoice", &vendor_name, &number)?;
                let (Some(invoice_date), Some(currency), Some(total_amount)) = (
                    row.date("invoice_date"),
                    row.text("currency"),
                    row.decimal("total_amount"),
                ) else {
                    return Ok(UpsertOutcome::Skipped);
                };
                let mut invoice = Invoice::new(
                    self.ctx.owner,
                    vendor.id,
                    number,
                    invoice_date,
                    currency,
                    total_amount,
                );
                invoice.contract_id = self.resolve_contract(vendor.id, row)?;
                apply_fields(&mut invoice, row);
                self.repo.insert(&mut invoice)?;
                Ok(UpsertOutcome::Created)
            }
        }
    }
}
