// ==========================================
// 兼容性矩阵导入系统 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表读取管道配置覆写（scope_id='global'）
// 规则: config_kv 表不存在 / 键缺失 / 值非法 → 使用内置默认值
// ==========================================

use crate::config::pipeline_config::{PipelineConfig, TableSet};
use crate::config::pipeline_config_trait::PipelineConfigReader;
use crate::db::{open_sqlite_connection, table_exists};
use crate::domain::types::PipelineVariant;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::compatibility_repo_impl::{validate_table_name, MAX_BATCH_SIZE};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::warn;

pub const CONFIG_TABLE: &str = "config_kv";

pub mod config_keys {
    // 批量写入
    pub const BATCH_SIZE: &str = "compat.batch_size";

    // 通用管道
    pub const COMPAT_TABLE: &str = "compat.table";
    pub const COMPAT_METADATA_TABLE: &str = "compat.metadata_table";

    // 降噪管道
    pub const DENOISING_TABLE: &str = "denoising.table";
    pub const DENOISING_METADATA_TABLE: &str = "denoising.metadata_table";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
    defaults: PipelineConfig,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| ImportError::Config {
            key: CONFIG_TABLE.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            defaults: PipelineConfig::default(),
        }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 表或键不存在
    pub fn get_global_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let config_error = |message: String| ImportError::Config {
            key: key.to_string(),
            message,
        };

        let conn = self
            .conn
            .lock()
            .map_err(|e| config_error(format!("lock poisoned: {}", e)))?;

        if !table_exists(&conn, CONFIG_TABLE).map_err(|e| config_error(e.to_string()))? {
            return Ok(None);
        }

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| config_error(e.to_string()))
    }

    /// 表名配置: 值需通过表名白名单
    fn get_table_name(&self, key: &str, default: &str) -> ImportResult<String> {
        let value = match self.get_global_config_value(key)? {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => return Ok(default.to_string()),
        };

        validate_table_name(&value).map_err(|e| ImportError::Config {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(value)
    }
}

#[async_trait]
impl PipelineConfigReader for ConfigManager {
    async fn get_batch_size(&self) -> ImportResult<usize> {
        let raw = self.get_global_config_value(config_keys::BATCH_SIZE)?;
        let parsed = raw.as_deref().map(|v| v.trim().parse::<usize>());

        match parsed {
            Some(Ok(size)) if (1..=MAX_BATCH_SIZE).contains(&size) => Ok(size),
            Some(_) => {
                warn!(
                    key = config_keys::BATCH_SIZE,
                    value = ?raw,
                    "批量大小配置非法，使用默认值"
                );
                Ok(self.defaults.batch_size)
            }
            None => Ok(self.defaults.batch_size),
        }
    }

    async fn get_table_set(&self, variant: PipelineVariant) -> ImportResult<TableSet> {
        let defaults = self.defaults.table_set(variant);
        let (table_key, metadata_key) = match variant {
            PipelineVariant::Compatibility => {
                (config_keys::COMPAT_TABLE, config_keys::COMPAT_METADATA_TABLE)
            }
            PipelineVariant::Denoising => {
                (config_keys::DENOISING_TABLE, config_keys::DENOISING_METADATA_TABLE)
            }
        };

        Ok(TableSet::new(
            self.get_table_name(table_key, &defaults.data_table)?,
            self.get_table_name(metadata_key, &defaults.metadata_table)?,
        ))
    }
}
