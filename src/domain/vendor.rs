// ==========================================
// DataNaut 数据中心 - 供应商与服务领域模型
// ==========================================
// 用途: 数据中心导入写入，导出只读
// 约定: 可选字段一律 Option<T>，空串不入库
// ==========================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Vendor - 供应商
// ==========================================
// 自然键: name（大小写不敏感）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub vendor_type: Option<String>,
    pub tags: Option<String>,
    pub primary_contact_name: Option<String>,
    pub primary_contact_email: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    /// 新建记录（id 由仓储层插入后回填）
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.into(),
            vendor_type: None,
            tags: None,
            primary_contact_name: None,
            primary_contact_email: None,
            website: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// Service - 供应商服务目录
// ==========================================
// 自然键: (vendor_id, name 大小写不敏感)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub vendor_id: i64,
    pub name: String,
    pub category: Option<String>,
    pub service_code: Option<String>,
    pub default_currency: Option<String>,
    pub default_billing_frequency: Option<String>,
    pub owner_display: Option<String>,
    pub list_price: Option<Decimal>,
    pub allocation_split: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn new(vendor_id: i64, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            vendor_id,
            name: name.into(),
            category: None,
            service_code: None,
            default_currency: None,
            default_billing_frequency: None,
            owner_display: None,
            list_price: None,
            allocation_split: None,
            created_at: now,
            updated_at: now,
        }
    }
}
