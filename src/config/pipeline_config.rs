// ==========================================
// 兼容性矩阵导入系统 - 管道默认配置
// ==========================================

use crate::config::pipeline_config_trait::PipelineConfigReader;
use crate::domain::types::PipelineVariant;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_COMPAT_TABLE: &str = "compatibility_matrix";
pub const DEFAULT_COMPAT_METADATA_TABLE: &str = "compatibility_ingestions";
pub const DEFAULT_DENOISING_TABLE: &str = "denoising_compatibility";
pub const DEFAULT_DENOISING_METADATA_TABLE: &str = "denoising_ingestions";

// ==========================================
// TableSet - 目标表 + 审计表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSet {
    pub data_table: String,
    pub metadata_table: String,
}

impl TableSet {
    pub fn new(data_table: impl Into<String>, metadata_table: impl Into<String>) -> Self {
        Self {
            data_table: data_table.into(),
            metadata_table: metadata_table.into(),
        }
    }

    pub fn default_for(variant: PipelineVariant) -> Self {
        match variant {
            PipelineVariant::Compatibility => {
                Self::new(DEFAULT_COMPAT_TABLE, DEFAULT_COMPAT_METADATA_TABLE)
            }
            PipelineVariant::Denoising => {
                Self::new(DEFAULT_DENOISING_TABLE, DEFAULT_DENOISING_METADATA_TABLE)
            }
        }
    }
}

// ==========================================
// PipelineConfig - 内存配置（默认值 / 测试注入）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub compatibility: TableSet,
    pub denoising: TableSet,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            compatibility: TableSet::default_for(PipelineVariant::Compatibility),
            denoising: TableSet::default_for(PipelineVariant::Denoising),
        }
    }
}

impl PipelineConfig {
    pub fn table_set(&self, variant: PipelineVariant) -> &TableSet {
        match variant {
            PipelineVariant::Compatibility => &self.compatibility,
            PipelineVariant::Denoising => &self.denoising,
        }
    }
}

#[async_trait]
impl PipelineConfigReader for PipelineConfig {
    async fn get_batch_size(&self) -> ImportResult<usize> {
        Ok(self.batch_size)
    }

    async fn get_table_set(&self, variant: PipelineVariant) -> ImportResult<TableSet> {
        Ok(self.table_set(variant).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.get_batch_size().await.unwrap(), 100);
        assert_eq!(
            config.get_table_set(PipelineVariant::Denoising).await.unwrap(),
            TableSet::new("denoising_compatibility", "denoising_ingestions")
        );
    }
}
