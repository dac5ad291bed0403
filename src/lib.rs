// ==========================================
// DataNaut 数据中心 - 核心库
// ==========================================
// 范围: 供应商 / 成本中心 / 服务 / 合同 / 发票 的表格导入导出
// 技术栈: Rust + SQLite（rusqlite）+ csv / calamine / rust_xlsxwriter
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 持久化记录
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 数据中心 - 导入导出核心
pub mod datahub;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

pub use api::{ApiError, ApiResult, DataHubApi, EntitySummary, ImportApiResponse};
pub use datahub::{
    DataHubError, DataHubImporter, EntityKind, ExportFile, ImportReport, TableFormat,
    UploadedFile, ValidationErrorItem, ValidationResult,
};
pub use domain::{Contract, CostCenter, Invoice, Service, Vendor};

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
