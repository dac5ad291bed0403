// ==========================================
// DataNaut 数据中心 - 数据集声明
// ==========================================
// 职责: 每个可导入实体一份静态声明
//       表头别名 → 标准字段 / 字段转换器 / 必填字段
// 约束: 进程内不可变，header_map 的键均为已标准化键
// ==========================================

use crate::datahub::error::FieldResult;
use crate::datahub::value_parser::{parse_date, parse_decimal, parse_int, parse_str, CellValue};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

// ==========================================
// FieldKind - 字段转换器
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Decimal,
    Date,
    Int,
}

impl FieldKind {
    /// 运行转换器；Ok(None) 表示单元格为空
    pub fn convert(self, raw: &CellValue) -> FieldResult<Option<FieldValue>> {
        Ok(match self {
            FieldKind::Str => Some(FieldValue::Str(parse_str(raw))),
            FieldKind::Decimal => parse_decimal(raw)?.map(FieldValue::Decimal),
            FieldKind::Date => parse_date(raw)?.map(FieldValue::Date),
            FieldKind::Int => parse_int(raw)?.map(FieldValue::Int),
        })
    }
}

// ==========================================
// FieldValue - 转换后的字段值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    Decimal(Decimal),
    Date(NaiveDate),
    Int(i64),
}

impl FieldValue {
    /// 空串/纯空白视为缺失
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Str(s) if s.trim().is_empty())
    }
}

// ==========================================
// CleanRow - 标准字段 → 类型化值
// ==========================================
// 转换失败的字段不出现；转换结果为空的字段以 None 出现
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CleanRow {
    fields: BTreeMap<&'static str, Option<FieldValue>>,
}

impl CleanRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, value: Option<FieldValue>) {
        self.fields.insert(field, value);
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 字段缺失、为 None 或空白字符串
    pub fn is_missing(&self, field: &str) -> bool {
        self.get(field).map_or(true, FieldValue::is_blank)
    }

    /// 非空字符串值（稀疏覆盖用）
    pub fn text(&self, field: &str) -> Option<String> {
        match self.get(field) {
            Some(FieldValue::Str(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    pub fn decimal(&self, field: &str) -> Option<Decimal> {
        match self.get(field) {
            Some(FieldValue::Decimal(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.get(field) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        match self.get(field) {
            Some(FieldValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&FieldValue>)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, v.as_ref()))
    }
}

// ==========================================
// DatasetSpec - 数据集声明
// ==========================================
#[derive(Debug)]
pub struct DatasetSpec {
    pub key: &'static str,
    pub label: &'static str,
    /// 标准化表头 → 标准字段（多对一）
    pub header_map: &'static [(&'static str, &'static str)],
    /// 标准字段 → 转换器
    pub converters: &'static [(&'static str, FieldKind)],
    /// 必填字段（有序）
    pub required: &'static [&'static str],
    /// false 时未映射列产生一条合并警告（仍不拒绝文件）
    pub allow_unknown_columns: bool,
}

impl DatasetSpec {
    /// 按标准化键查找标准字段；空键永不命中
    pub fn field_for(&self, normalized_key: &str) -> Option<&'static str> {
        if normalized_key.is_empty() {
            return None;
        }
        self.header_map
            .iter()
            .find(|(alias, _)| *alias == normalized_key)
            .map(|(_, field)| *field)
    }

    /// 字段转换器，未声明的字段按字符串处理
    pub fn converter(&self, field: &str) -> FieldKind {
        self.converters
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, kind)| *kind)
            .unwrap_or(FieldKind::Str)
    }
}

// ==========================================
// 静态声明表
// ==========================================

pub static VENDORS_SPEC: DatasetSpec = DatasetSpec {
    key: "vendors",
    label: "Vendors",
    header_map: &[
        ("name", "name"),
        ("vendor", "name"),
        ("vendor_name", "name"),
        ("supplier", "name"),
        ("supplier_name", "name"),
        ("vendor_type", "vendor_type"),
        ("type", "vendor_type"),
        ("category", "vendor_type"),
        ("tags", "tags"),
        ("tag", "tags"),
        ("labels", "tags"),
        ("primary_contact_name", "primary_contact_name"),
        ("contact_name", "primary_contact_name"),
        ("contact", "primary_contact_name"),
        ("primary_contact_email", "primary_contact_email"),
        ("contact_email", "primary_contact_email"),
        ("email", "primary_contact_email"),
        ("website", "website"),
        ("url", "website"),
        ("web", "website"),
        ("notes", "notes"),
        ("note", "notes"),
        ("comments", "notes"),
    ],
    converters: &[
        ("name", FieldKind::Str),
        ("vendor_type", FieldKind::Str),
        ("tags", FieldKind::Str),
        ("primary_contact_name", FieldKind::Str),
        ("primary_contact_email", FieldKind::Str),
        ("website", FieldKind::Str),
        ("notes", FieldKind::Str),
    ],
    required: &["name"],
    allow_unknown_columns: true,
};

pub static COST_CENTERS_SPEC: DatasetSpec = DatasetSpec {
    key: "cost-centers",
    label: "Cost centers",
    header_map: &[
        ("code", "code"),
        ("cost_center_code", "code"),
        ("costcentre_code", "code"),
        ("cost_centre_code", "code"),
        ("cost_center", "code"),
        ("cc", "code"),
        ("name", "name"),
        ("cost_center_name", "name"),
        ("cost_centre_name", "name"),
        ("description", "name"),
        ("business_unit", "business_unit"),
        ("bu", "business_unit"),
        ("division", "business_unit"),
        ("region", "region"),
        ("location", "region"),
        ("default_approver", "default_approver"),
        ("default_approver_username", "default_approver"),
        ("approver", "default_approver"),
    ],
    converters: &[
        ("code", FieldKind::Str),
        ("name", FieldKind::Str),
        ("business_unit", FieldKind::Str),
        ("region", FieldKind::Str),
        ("default_approver", FieldKind::Str),
    ],
    required: &["code", "name"],
    allow_unknown_columns: true,
};

pub static SERVICES_SPEC: DatasetSpec = DatasetSpec {
    key: "services",
    label: "Services",
    header_map: &[
        ("vendor_name", "vendor_name"),
        ("vendor", "vendor_name"),
        ("supplier", "vendor_name"),
        ("name", "name"),
        ("service_name", "name"),
        ("service", "name"),
        ("product", "name"),
        ("category", "category"),
        ("service_category", "category"),
        ("service_code", "service_code"),
        ("code", "service_code"),
        ("sku", "service_code"),
        ("default_currency", "default_currency"),
        ("currency", "default_currency"),
        ("default_billing_frequency", "default_billing_frequency"),
        ("billing_frequency", "default_billing_frequency"),
        ("frequency", "default_billing_frequency"),
        ("owner_display", "owner_display"),
        ("owner", "owner_display"),
        ("list_price", "list_price"),
        ("price", "list_price"),
        ("unit_price", "list_price"),
        ("allocation_split", "allocation_split"),
        ("allocation", "allocation_split"),
    ],
    converters: &[
        ("vendor_name", FieldKind::Str),
        ("name", FieldKind::Str),
        ("category", FieldKind::Str),
        ("service_code", FieldKind::Str),
        ("default_currency", FieldKind::Str),
        ("default_billing_frequency", FieldKind::Str),
        ("owner_display", FieldKind::Str),
        ("list_price", FieldKind::Decimal),
        ("allocation_split", FieldKind::Str),
    ],
    required: &["vendor_name", "name"],
    allow_unknown_columns: true,
};

pub static CONTRACTS_SPEC: DatasetSpec = DatasetSpec {
    key: "contracts",
    label: "Contracts",
    header_map: &[
        ("vendor_name", "vendor_name"),
        ("vendor", "vendor_name"),
        ("supplier", "vendor_name"),
        ("contract_name", "contract_name"),
        ("contract", "contract_name"),
        ("name", "contract_name"),
        ("contract_id", "contract_id"),
        ("contract_number", "contract_id"),
        ("contract_no", "contract_id"),
        ("reference", "contract_id"),
        ("contract_type", "contract_type"),
        ("type", "contract_type"),
        ("entity", "entity"),
        ("legal_entity", "entity"),
        ("annual_value", "annual_value"),
        ("annual_cost", "annual_value"),
        ("value", "annual_value"),
        ("currency", "currency"),
        ("start_date", "start_date"),
        ("start", "start_date"),
        ("effective_date", "start_date"),
        ("end_date", "end_date"),
        ("end", "end_date"),
        ("expiry_date", "end_date"),
        ("renewal_date", "renewal_date"),
        ("renewal", "renewal_date"),
        ("notice_period_days", "notice_period_days"),
        ("notice_period", "notice_period_days"),
        ("notice_days", "notice_period_days"),
        ("notice_date", "notice_date"),
        ("notice_deadline", "notice_date"),
        ("status", "status"),
        ("contract_status", "status"),
    ],
    converters: &[
        ("vendor_name", FieldKind::Str),
        ("contract_name", FieldKind::Str),
        ("contract_id", FieldKind::Str),
        ("contract_type", FieldKind::Str),
        ("entity", FieldKind::Str),
        ("annual_value", FieldKind::Decimal),
        ("currency", FieldKind::Str),
        ("start_date", FieldKind::Date),
        ("end_date", FieldKind::Date),
        ("renewal_date", FieldKind::Date),
        ("notice_period_days", FieldKind::Int),
        ("notice_date", FieldKind::Date),
        ("status", FieldKind::Str),
    ],
    required: &["vendor_name", "contract_name"],
    allow_unknown_columns: false,
};

pub static INVOICES_SPEC: DatasetSpec = DatasetSpec {
    key: "invoices",
    label: "Invoices",
    header_map: &[
        ("vendor_name", "vendor_name"),
        ("vendor", "vendor_name"),
        ("supplier", "vendor_name"),
        ("contract_name", "contract_name"),
        ("contract", "contract_name"),
        ("invoice_number", "invoice_number"),
        ("invoice_no", "invoice_number"),
        ("invoice_num", "invoice_number"),
        ("invoice", "invoice_number"),
        ("number", "invoice_number"),
        ("invoice_date", "invoice_date"),
        ("date", "invoice_date"),
        ("issue_date", "invoice_date"),
        ("currency", "currency"),
        ("total_amount", "total_amount"),
        ("total", "total_amount"),
        ("amount", "total_amount"),
        ("gross_amount", "total_amount"),
        ("tax_amount", "tax_amount"),
        ("tax", "tax_amount"),
        ("vat", "tax_amount"),
        ("vat_amount", "tax_amount"),
        ("period_start", "period_start"),
        ("service_period_start", "period_start"),
        ("period_from", "period_start"),
        ("period_end", "period_end"),
        ("service_period_end", "period_end"),
        ("period_to", "period_end"),
        ("notes", "notes"),
        ("note", "notes"),
        ("comments", "notes"),
    ],
    converters: &[
        ("vendor_name", FieldKind::Str),
        ("contract_name", FieldKind::Str),
        ("invoice_number", FieldKind::Str),
        ("invoice_date", FieldKind::Date),
        ("currency", FieldKind::Str),
        ("total_amount", FieldKind::Decimal),
        ("tax_amount", FieldKind::Decimal),
        ("period_start", FieldKind::Date),
        ("period_end", FieldKind::Date),
        ("notes", FieldKind::Str),
    ],
    required: &[
        "vendor_name",
        "invoice_number",
        "invoice_date",
        "currency",
        "total_amount",
    ],
    allow_unknown_columns: false,
};

/// 全部数据集声明
pub static ALL_SPECS: [&DatasetSpec; 5] = [
    &VENDORS_SPEC,
    &COST_CENTERS_SPEC,
    &SERVICES_SPEC,
    &CONTRACTS_SPEC,
    &INVOICES_SPEC,
];
