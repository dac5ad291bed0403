// ==========================================
// DataNaut 数据中心 - 合同与发票领域模型
// ==========================================
// 归属: 合同与发票按 owner（导入用户）隔离
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Contract - 供应商合同
// ==========================================
// 自然键: (owner, vendor_id, contract_name 大小写不敏感[, contract_id 大小写不敏感])
// 规则: notice_date 需要 end_date，且不得晚于 end_date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub owner: String,
    pub vendor_id: i64,
    pub contract_name: String,
    pub contract_id: Option<String>,
    pub contract_type: Option<String>,
    pub entity: Option<String>,
    pub annual_value: Option<Decimal>,
    pub currency: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub renewal_date: Option<NaiveDate>,
    pub notice_period_days: Option<i64>,
    pub notice_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub uploaded_by: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn new(owner: impl Into<String>, vendor_id: i64, contract_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            owner: owner.into(),
            vendor_id,
            contract_name: contract_name.into(),
            contract_id: None,
            contract_type: None,
            entity: None,
            annual_value: None,
            currency: None,
            start_date: None,
            end_date: None,
            renewal_date: None,
            notice_period_days: None,
            notice_date: None,
            status: None,
            uploaded_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// Invoice - 发票
// ==========================================
// 自然键: (owner, vendor_id, invoice_number 大小写不敏感)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub owner: String,
    pub vendor_id: i64,
    pub contract_id: Option<i64>, // 关联合同（可选）
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub currency: String,
    pub total_amount: Decimal,
    pub tax_amount: Option<Decimal>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        owner: impl Into<String>,
        vendor_id: i64,
        invoice_number: impl Into<String>,
        invoice_date: NaiveDate,
        currency: impl Into<String>,
        total_amount: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            owner: owner.into(),
            vendor_id,
            contract_id: None,
            invoice_number: invoice_number.into(),
            invoice_date,
            currency: currency.into(),
            total_amount,
            tax_amount: None,
            period_start: None,
            period_end: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}
