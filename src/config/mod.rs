// ==========================================
// DataNaut 数据中心 - 配置层
// ==========================================
// 职责: 数据中心配置管理，支持 global 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, load_datahub_config, ConfigManager, DataHubConfig};
