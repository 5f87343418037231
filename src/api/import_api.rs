// ==========================================
// 兼容性矩阵导入API
// ==========================================
// 职责: 封装两条导入管道与导入历史查询
// 约束: 每次调用打开一个连接，仓储与配置共享该连接（单次运行作用域）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, PipelineConfigReader};
use crate::db::open_sqlite_connection;
use crate::domain::compatibility::IngestionMetadata;
use crate::domain::types::PipelineVariant;
use crate::domain::workbook::UploadedFile;
use crate::importer::{CompatibilityPipeline, ImportResult, IngestionOutcome};
use crate::repository::{CompatibilityRepository, CompatibilityRepositoryImpl};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

type SqlitePipeline = CompatibilityPipeline<CompatibilityRepositoryImpl, ConfigManager>;

/// 导入API响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportApiResponse {
    pub success: bool,
    /// 去重前记录数
    pub records: usize,
    /// 去重+校验后记录数
    #[serde(alias = "recordsCurated")]
    pub records_curated: usize,
    pub updated_at: DateTime<Utc>,
    pub ingestion_id: String,
}

impl From<IngestionOutcome> for ImportApiResponse {
    fn from(outcome: IngestionOutcome) -> Self {
        Self {
            success: true,
            records: outcome.total_records,
            records_curated: outcome.valid_records,
            updated_at: outcome.updated_at,
            ingestion_id: outcome.ingestion_id,
        }
    }
}

/// 导入API
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 导入通用兼容性矩阵
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 目标表已替换
    /// - Err(ApiError::InvalidInput): 文件问题，未触库
    /// - Err(ApiError::DatabaseError): 事务已回滚
    pub async fn import_compatibility(
        &self,
        files: &[UploadedFile],
        uploaded_by: Option<&str>,
    ) -> ApiResult<ImportApiResponse> {
        let variant = PipelineVariant::Compatibility;
        let pipeline = self.create_pipeline()?;
        let result = pipeline.run_compatibility(files, uploaded_by).await;
        Self::into_response(variant, result)
    }

    /// 导入降噪能力矩阵
    pub async fn import_denoising(
        &self,
        files: &[UploadedFile],
        uploaded_by: Option<&str>,
    ) -> ApiResult<ImportApiResponse> {
        let variant = PipelineVariant::Denoising;
        let pipeline = self.create_pipeline()?;
        let result = pipeline.run_denoising(files, uploaded_by).await;
        Self::into_response(variant, result)
    }

    /// 最近导入记录
    ///
    /// # 参数
    /// - limit: 条数（限制在 1-100 之间）
    pub async fn list_recent_ingestions(
        &self,
        variant: PipelineVariant,
        limit: i32,
    ) -> ApiResult<Vec<IngestionMetadata>> {
        let limit = limit.clamp(1, 100) as usize;
        let pipeline = self.create_pipeline()?;

        let tables = pipeline
            .config()
            .get_table_set(variant)
            .await
            .map_err(|e| ApiError::from_import(variant, e))?;

        let ingestions = pipeline
            .repository()
            .list_recent_ingestions(&tables.metadata_table, limit)
            .await?;
        Ok(ingestions)
    }

    fn create_pipeline(&self) -> ApiResult<SqlitePipeline> {
        let conn = open_sqlite_connection(&self.db_path).map_err(|e| {
            error!(db_path = %self.db_path, error = %e, "数据库连接失败");
            ApiError::DatabaseError {
                message: crate::i18n::t("api.internal_error"),
                details: e.to_string(),
            }
        })?;
        let conn = Arc::new(Mutex::new(conn));

        Ok(CompatibilityPipeline::new(
            CompatibilityRepositoryImpl::from_connection(conn.clone()),
            ConfigManager::from_connection(conn),
        ))
    }

    fn into_response(
        variant: PipelineVariant,
        result: ImportResult<IngestionOutcome>,
    ) -> ApiResult<ImportApiResponse> {
        match result {
            Ok(outcome) => {
                info!(
                    pipeline = variant.code(),
                    records = outcome.total_records,
                    records_curated = outcome.valid_records,
                    "导入成功"
                );
                Ok(outcome.into())
            }
            Err(e) => {
                let api_error = ApiError::from_import(variant, e);
                if api_error.is_client_error() {
                    warn!(pipeline = variant.code(), error = %api_error, "导入被拒绝");
                } else {
                    error!(pipeline = variant.code(), error = %api_error, "导入失败");
                }
                Err(api_error)
            }
        }
    }
}
