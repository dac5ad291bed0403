// ==========================================
// DataNaut 数据中心 - 领域模型层
// ==========================================
// 职责: 定义持久化实体
// 红线: 不含数据访问逻辑，不含导入规则
// ==========================================

pub mod contract;
pub mod cost_center;
pub mod vendor;

// 重导出核心类型
pub use contract::{Contract, Invoice};
pub use cost_center::CostCenter;
pub use vendor::{Service, Vendor};
