// ==========================================
// DataNaut 数据中心 - API 层
// ==========================================
// 职责: 供请求处理器与 CLI 调用的业务接口
// ==========================================

pub mod datahub_api;
pub mod error;

pub use datahub_api::{DataHubApi, EntitySummary, ImportApiResponse};
pub use error::{ApiError, ApiResult};
