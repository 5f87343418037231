// ==========================================
// 兼容性矩阵导入系统 - API 层
// ==========================================
// 职责: 提供导入 API 接口,供命令行或上层服务调用
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use import_api::{ImportApi, ImportApiResponse};
