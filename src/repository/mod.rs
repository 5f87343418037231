// ==========================================
// 兼容性矩阵导入系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 值一律参数化；表名来自配置，拼接前经白名单校验
// ==========================================

pub mod compatibility_repo;
pub mod compatibility_repo_impl;
pub mod error;

// 重导出核心仓储
pub use compatibility_repo::CompatibilityRepository;
pub use compatibility_repo_impl::CompatibilityRepositoryImpl;
pub use error::{RepositoryError, RepositoryResult};
