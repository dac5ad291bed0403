// ==========================================
// DataNaut 数据中心 - 成本中心领域模型
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 成本中心（自然键: code，精确匹配）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostCenter {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub business_unit: Option<String>,
    pub region: Option<String>,
    pub default_approver: Option<String>, // 审批人用户名

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CostCenter {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            code: code.into(),
            name: name.into(),
            business_unit: None,
            region: None,
            default_approver: None,
            created_at: now,
            updated_at: now,
        }
    }
}
