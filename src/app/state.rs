// ==========================================
// 兼容性矩阵导入系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ImportApi;
use crate::db::open_sqlite_connection;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "COMPAT_MATRIX_DB_PATH";

const DB_FILE_NAME: &str = "compat_matrix.db";

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 导入API
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 返回
    /// - Err(String): 数据库无法打开
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 启动时探测一次，尽早暴露路径/权限问题
        open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;

        Ok(Self {
            import_api: Arc::new(ImportApi::new(db_path.clone())),
            db_path,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 COMPAT_MATRIX_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("compat-matrix");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_new() {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);
        assert_eq!(state.import_api.db_path(), db_path);
    }
}
