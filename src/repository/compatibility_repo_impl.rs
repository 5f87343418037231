// ==========================================
// 兼容性矩阵导入系统 - 兼容性数据 Repository 实现
// ==========================================
// 职责: 实现目标表整体替换与审计追加（使用 rusqlite）
// 事务: DROP + CREATE + INSERT + INDEX 同一事务；任一步失败回滚，旧表原样恢复
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

mod schema;

pub use schema::{validate_table_name, RecordTable, MAX_BATCH_SIZE};

use crate::db::{open_sqlite_connection, table_exists};
use crate::domain::compatibility::{CapabilityRecord, CompatibilityRecord, IngestionMetadata};
use crate::repository::compatibility_repo::CompatibilityRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::SecondsFormat;
use rusqlite::{params, params_from_iter, Connection, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

// ==========================================
// CompatibilityRepositoryImpl
// ==========================================
pub struct CompatibilityRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CompatibilityRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 使用共享连接创建（一次管道运行共用一个连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 单事务整体替换目标表
    fn replace_records<T: RecordTable>(
        &self,
        table: &str,
        records: &[T],
        batch_size: usize,
    ) -> RepositoryResult<usize> {
        validate_table_name(table)?;
        let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);

        let conn = self.lock()?;
        // 1. 开启事务（Transaction drop 时未提交则自动回滚）
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 2. 删表重建 + 默认读权限
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({defs});",
            table = table,
            defs = T::COLUMN_DEFS
        ))?;
        grant_default_read_access(&tx, table);

        // 3. 分批插入
        let mut inserted = 0;
        for (batch_no, chunk) in records.chunks(batch_size).enumerate() {
            inserted += Self::insert_batch_tx(&tx, table, chunk)?;
            debug!(table, batch_no, rows = chunk.len(), "批次写入完成");
        }

        // 4. 建索引（不使用 IF NOT EXISTS：索引名冲突视为失败）
        for (suffix, columns) in T::INDEXES {
            tx.execute(
                &format!(
                    "CREATE INDEX idx_{table}_{suffix} ON {table} ({columns})",
                    table = table,
                    suffix = suffix,
                    columns = columns
                ),
                [],
            )?;
        }

        // 5. 提交
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(table, inserted, batch_size, "目标表替换完成");
        Ok(inserted)
    }

    /// 在事务中写入一个批次（单条多行 VALUES 语句）
    fn insert_batch_tx<T: RecordTable>(
        tx: &Transaction,
        table: &str,
        chunk: &[T],
    ) -> RepositoryResult<usize> {
        let sql = schema::multi_row_insert_sql(table, T::COLUMNS, chunk.len());
        let values: Vec<_> = chunk.iter().flat_map(|record| record.sql_values()).collect();
        let count = tx.execute(&sql, params_from_iter(values.iter()))?;
        Ok(count)
    }

    fn list_records<T: RecordTable>(&self, table: &str) -> RepositoryResult<Vec<T>> {
        validate_table_name(table)?;
        let conn = self.lock()?;
        if !table_exists(&conn, table)? {
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id",
            T::COLUMNS.join(", "),
            table
        ))?;
        let rows = stmt.query_map([], |row| T::from_row(row))?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

/// 新表默认读权限
///
/// SQLite 无 GRANT 机制，可读性由文件权限决定；保留该步骤以维持装载顺序。
fn grant_default_read_access(_tx: &Transaction, table: &str) {
    debug!(table, "SQLite 无授权机制，默认读权限步骤跳过");
}

#[async_trait]
impl CompatibilityRepository for CompatibilityRepositoryImpl {
    async fn replace_compatibility_records(
        &self,
        table: &str,
        records: &[CompatibilityRecord],
        batch_size: usize,
    ) -> RepositoryResult<usize> {
        self.replace_records(table, records, batch_size)
    }

    async fn replace_capability_records(
        &self,
        table: &str,
        records: &[CapabilityRecord],
        batch_size: usize,
    ) -> RepositoryResult<usize> {
        self.replace_records(table, records, batch_size)
    }

    async fn append_ingestion_metadata(
        &self,
        table: &str,
        metadata: &IngestionMetadata,
    ) -> RepositoryResult<()> {
        validate_table_name(table)?;
        let conn = self.lock()?;

        conn.execute_batch(&schema::metadata_table_ddl(table))?;
        conn.execute(
            &format!(
                r#"
                INSERT INTO {} (
                    ingestion_id, pipeline, ingested_at, total_records,
                    valid_records, uploaded_by, source_filenames
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                table
            ),
            params![
                metadata.ingestion_id,
                metadata.pipeline.code(),
                metadata.ingested_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                metadata.total_records as i64,
                metadata.valid_records as i64,
                metadata.uploaded_by,
                metadata.source_filenames,
            ],
        )?;

        Ok(())
    }

    async fn list_recent_ingestions(
        &self,
        table: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<IngestionMetadata>> {
        validate_table_name(table)?;
        let conn = self.lock()?;
        if !table_exists(&conn, table)? {
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT ingestion_id, pipeline, ingested_at, total_records,
                   valid_records, uploaded_by, source_filenames
            FROM {}
            ORDER BY ingested_at DESC, rowid DESC
            LIMIT ?1
            "#,
            table
        ))?;
        let rows = stmt.query_map(params![limit as i64], schema::metadata_from_row)?;
        let metadata = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(metadata)
    }

    async fn list_compatibility_records(
        &self,
        table: &str,
    ) -> RepositoryResult<Vec<CompatibilityRecord>> {
        self.list_records(table)
    }

    async fn list_capability_records(
        &self,
        table: &str,
    ) -> RepositoryResult<Vec<CapabilityRecord>> {
        self.list_records(table)
    }

    async fn count_records(&self, table: &str) -> RepositoryResult<usize> {
        validate_table_name(table)?;
        let conn = self.lock()?;
        if !table_exists(&conn, table)? {
            return Ok(0);
        }

        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }
}
