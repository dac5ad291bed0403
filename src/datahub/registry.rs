// ==========================================
// DataNaut 数据中心 - 实体注册表
// ==========================================
// 职责: 实体键 → 标签 / 数据集声明 / 模板表头
// 约定: 新增可导入实体只需新增一个枚举值与一份 DatasetSpec
// ==========================================

use crate::datahub::dataset_spec::{
    DatasetSpec, CONTRACTS_SPEC, COST_CENTERS_SPEC, INVOICES_SPEC, SERVICES_SPEC, VENDORS_SPEC,
};
use crate::datahub::error::{DataHubError, DataHubResult};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Vendors,
    CostCenters,
    Services,
    Contracts,
    Invoices,
}

impl EntityKind {
    /// 概览页顺序
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Vendors,
        EntityKind::CostCenters,
        EntityKind::Services,
        EntityKind::Contracts,
        EntityKind::Invoices,
    ];

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn spec(self) -> &'static DatasetSpec {
        match self {
            EntityKind::Vendors => &VENDORS_SPEC,
            EntityKind::CostCenters => &COST_CENTERS_SPEC,
            EntityKind::Services => &SERVICES_SPEC,
            EntityKind::Contracts => &CONTRACTS_SPEC,
            EntityKind::Invoices => &INVOICES_SPEC,
        }
    }

    /// 模板表头（导出列顺序）
    pub fn template_headers(self) -> &'static [&'static str] {
        match self {
            EntityKind::Vendors => &[
                "name",
                "vendor_type",
                "tags",
                "primary_contact_name",
                "primary_contact_email",
                "website",
                "notes",
            ],
            EntityKind::CostCenters => &["code", "name", "business_unit", "region"],
            EntityKind::Services => &[
                "vendor_name",
                "name",
                "category",
                "service_code",
                "default_currency",
                "default_billing_frequency",
                "owner_display",
                "list_price",
                "allocation_split",
            ],
            EntityKind::Contracts => &[
                "vendor_name",
                "contract_name",
                "contract_id",
                "contract_type",
                "entity",
                "annual_value",
                "currency",
                "start_date",
                "end_date",
                "renewal_date",
                "notice_period_days",
                "notice_date",
                "status",
            ],
            EntityKind::Invoices => &[
                "vendor_name",
                "contract_name",
                "invoice_number",
                "invoice_date",
                "currency",
                "total_amount",
                "tax_amount",
                "period_start",
                "period_end",
                "notes",
            ],
        }
    }

    /// 合同与发票按用户隔离
    pub fn is_owner_scoped(self) -> bool {
        matches!(self, EntityKind::Contracts | EntityKind::Invoices)
    }

    /// 按实体键查找
    pub fn from_key(key: &str) -> DataHubResult<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| DataHubError::UnknownEntity(key.to_string()))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key() {
        assert_eq!(EntityKind::from_key("cost-centers").unwrap(), EntityKind::CostCenters);
        assert_eq!(EntityKind::from_key(" invoices ").unwrap(), EntityKind::Invoices);
        let err = EntityKind::from_key("cost_centers").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_template_headers_are_mapped_fields() {
        for kind in EntityKind::ALL {
            let spec = kind.spec();
            for header in kind.template_headers() {
                assert_eq!(
                    spec.field_for(header),
                    Some(*header),
                    "{}: template header {} is not a canonical field",
                    kind,
                    header
                );
            }
            for required in spec.required {
                assert!(kind.template_headers().contains(required));
            }
        }
    }

    #[test]
    fn test_serialized_key_matches() {
        for kind in EntityKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.key()));
        }
    }
}
