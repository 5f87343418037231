// ==========================================
// 兼容性矩阵导入系统 - 管道配置读取 Trait
// ==========================================
// 职责: 定义编排器所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::pipeline_config::TableSet;
use crate::domain::types::PipelineVariant;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// PipelineConfigReader Trait
// ==========================================
// 用途: 编排器读取批量大小与目标表名
// 实现者: PipelineConfig（内置默认值）/ ConfigManager（config_kv 覆写）
#[async_trait]
pub trait PipelineConfigReader: Send + Sync {
    /// 单条 INSERT 语句的行数
    ///
    /// # 默认值
    /// - 100
    async fn get_batch_size(&self) -> ImportResult<usize>;

    /// 指定管道变体的目标表 + 审计表
    ///
    /// # 默认值
    /// - compatibility: compatibility_matrix / compatibility_ingestions
    /// - denoising: denoising_compatibility / denoising_ingestions
    async fn get_table_set(&self, variant: PipelineVariant) -> ImportResult<TableSet>;
}
