// ==========================================
// 兼容性矩阵导入系统 - 兼容性数据 Repository Trait
// ==========================================
// 职责: 定义目标表整体替换 / 导入元数据追加 / 只读查询接口
// 红线: Repository 不含业务规则（去重、校验在导入层完成）
// ==========================================

use crate::domain::compatibility::{CapabilityRecord, CompatibilityRecord, IngestionMetadata};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CompatibilityRepository Trait
// ==========================================
// 用途: 兼容性目标表与审计表的数据访问
// 实现者: CompatibilityRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait CompatibilityRepository: Send + Sync {
    // ===== 整体替换（单事务）=====

    /// 整体替换通用形态目标表
    ///
    /// # 步骤
    /// DROP → CREATE → 默认读权限 → 分批 INSERT → CREATE INDEX → COMMIT
    ///
    /// # 返回
    /// - Ok(usize): 写入记录数
    /// - Err: 任一步失败，整个事务回滚，原表保持不变
    async fn replace_compatibility_records(
        &self,
        table: &str,
        records: &[CompatibilityRecord],
        batch_size: usize,
    ) -> RepositoryResult<usize>;

    /// 整体替换能力形态目标表（语义同上）
    async fn replace_capability_records(
        &self,
        table: &str,
        records: &[CapabilityRecord],
        batch_size: usize,
    ) -> RepositoryResult<usize>;

    // ===== 审计（只追加）=====

    /// 追加一条导入元数据（不在替换事务内）
    async fn append_ingestion_metadata(
        &self,
        table: &str,
        metadata: &IngestionMetadata,
    ) -> RepositoryResult<()>;

    /// 最近导入记录（按时间倒序）
    async fn list_recent_ingestions(
        &self,
        table: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<IngestionMetadata>>;

    // ===== 只读查询 =====

    async fn list_compatibility_records(
        &self,
        table: &str,
    ) -> RepositoryResult<Vec<CompatibilityRecord>>;

    async fn list_capability_records(&self, table: &str)
        -> RepositoryResult<Vec<CapabilityRecord>>;

    /// 目标表行数（表不存在返回 0）
    async fn count_records(&self, table: &str) -> RepositoryResult<usize>;
}
