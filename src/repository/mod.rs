// ==========================================
// DataNaut 数据中心 - 数据仓储层
// ==========================================
// 职责: rusqlite 数据访问，每个实体一个仓储
// 红线: 不含业务规则；连接/事务由调用方持有
// ==========================================

pub mod codec;
pub mod contract_repo;
pub mod cost_center_repo;
pub mod error;
pub mod invoice_repo;
pub mod service_repo;
pub mod vendor_repo;

// 重导出
pub use contract_repo::{ContractExportRow, ContractRepository};
pub use cost_center_repo::CostCenterRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use invoice_repo::{InvoiceExportRow, InvoiceRepository};
pub use service_repo::{ServiceExportRow, ServiceRepository};
pub use vendor_repo::VendorRepository;
