// ==========================================
// 兼容性矩阵导入系统 - 应用层
// ==========================================
// 职责: 组装应用状态（数据库路径 + API 实例）
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
