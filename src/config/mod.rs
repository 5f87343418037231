// ==========================================
// 兼容性矩阵导入系统 - 配置层
// ==========================================
// 职责: 管道配置（批量大小 / 目标表名），支持 config_kv 覆写
// 存储: config_kv 表（可选；缺失时使用内置默认值）
// ==========================================

pub mod config_manager;
pub mod pipeline_config;
pub mod pipeline_config_trait;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use pipeline_config::{PipelineConfig, TableSet, DEFAULT_BATCH_SIZE};
pub use pipeline_config_trait::PipelineConfigReader;
