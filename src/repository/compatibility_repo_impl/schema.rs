// ==========================================
// 兼容性矩阵导入系统 - 目标表结构定义
// ==========================================
// 职责: 两种记录形态的固定列结构 / 索引 / 行映射；表名校验
// 约束: 表名来自配置且无法参数化，拼接前必须通过白名单正则
// ==========================================

use crate::domain::compatibility::{CapabilityRecord, CompatibilityRecord, IngestionMetadata};
use crate::domain::types::{PipelineVariant, RecordType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::{Type, Value};
use rusqlite::Row;

static TABLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// 单条 INSERT 语句行数上限（SQLite 变量数限制）
pub const MAX_BATCH_SIZE: usize = 1_000;

/// 表名白名单校验
pub fn validate_table_name(table: &str) -> RepositoryResult<()> {
    if TABLE_NAME_RE.is_match(table) {
        Ok(())
    } else {
        Err(RepositoryError::InvalidTableName(table.to_string()))
    }
}

// ==========================================
// Trait: RecordTable - 记录形态 ↔ 表结构
// ==========================================
pub trait RecordTable: Sized {
    /// 数据列（不含自增 id），顺序即 INSERT 列序
    const COLUMNS: &'static [&'static str];

    /// CREATE TABLE 列定义
    const COLUMN_DEFS: &'static str;

    /// (索引后缀, 索引列)，索引名为 idx_<table>_<后缀>
    const INDEXES: &'static [(&'static str, &'static str)];

    fn sql_values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl RecordTable for CompatibilityRecord {
    const COLUMNS: &'static [&'static str] =
        &["software", "software_version", "feature", "compat_target", "status"];

    const COLUMN_DEFS: &'static str = r#"
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        software TEXT NOT NULL,
        software_version TEXT NOT NULL DEFAULT '',
        feature TEXT NOT NULL,
        compat_target TEXT NOT NULL,
        status TEXT NOT NULL
    "#;

    const INDEXES: &'static [(&'static str, &'static str)] = &[
        ("subject", "software, software_version"),
        ("feature", "feature"),
        ("target", "compat_target"),
    ];

    fn sql_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.software.clone()),
            Value::Text(self.software_version.clone()),
            Value::Text(self.feature.clone()),
            Value::Text(self.compat_target.clone()),
            Value::Text(self.status.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CompatibilityRecord {
            software: row.get("software")?,
            software_version: row.get("software_version")?,
            feature: row.get("feature")?,
            compat_target: row.get("compat_target")?,
            status: row.get("status")?,
        })
    }
}

impl RecordTable for CapabilityRecord {
    const COLUMNS: &'static [&'static str] =
        &["name", "version", "denoising_tech", "status", "record_type"];

    const COLUMN_DEFS: &'static str = r#"
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        version TEXT NOT NULL DEFAULT '',
        denoising_tech TEXT NOT NULL,
        status TEXT NOT NULL,
        record_type TEXT NOT NULL CHECK (record_type IN ('software', 'capability'))
    "#;

    const INDEXES: &'static [(&'static str, &'static str)] = &[
        ("subject", "name, version"),
        ("feature", "denoising_tech"),
        ("target", "record_type"),
    ];

    fn sql_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.version.clone()),
            Value::Text(self.denoising_tech.clone()),
            Value::Text(self.status.clone()),
            Value::Text(self.record_type.code().to_string()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let raw_type: String = row.get("record_type")?;
        let record_type = RecordType::from_code(&raw_type).ok_or_else(|| {
            conversion_error(row, "record_type", format!("unknown record_type: {}", raw_type))
        })?;

        Ok(CapabilityRecord {
            name: row.get("name")?,
            version: row.get("version")?,
            denoising_tech: row.get("denoising_tech")?,
            status: row.get("status")?,
            record_type,
        })
    }
}

/// 多行 VALUES 插入语句: INSERT INTO t (c1..cn) VALUES (?,..),(?,..)
pub fn multi_row_insert_sql(table: &str, columns: &[&str], rows: usize) -> String {
    let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        table,
        columns.join(", "),
        vec![placeholders; rows].join(", ")
    )
}

// ==========================================
// 导入元数据表
// ==========================================

pub fn metadata_table_ddl(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            ingestion_id TEXT PRIMARY KEY,
            pipeline TEXT NOT NULL,
            ingested_at TEXT NOT NULL,
            total_records INTEGER NOT NULL,
            valid_records INTEGER NOT NULL,
            uploaded_by TEXT,
            source_filenames TEXT NOT NULL
        )
        "#,
        table = table
    )
}

pub fn metadata_from_row(row: &Row<'_>) -> rusqlite::Result<IngestionMetadata> {
    let raw_pipeline: String = row.get("pipeline")?;
    let pipeline = PipelineVariant::from_code(&raw_pipeline).ok_or_else(|| {
        conversion_error(row, "pipeline", format!("unknown pipeline: {}", raw_pipeline))
    })?;

    let raw_ingested_at: String = row.get("ingested_at")?;
    let ingested_at = DateTime::parse_from_rfc3339(&raw_ingested_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(row, "ingested_at", e.to_string()))?;

    let total_records: i64 = row.get("total_records")?;
    let valid_records: i64 = row.get("valid_records")?;

    Ok(IngestionMetadata {
        ingestion_id: row.get("ingestion_id")?,
        pipeline,
        ingested_at,
        total_records: total_records.max(0) as usize,
        valid_records: valid_records.max(0) as usize,
        uploaded_by: row.get("uploaded_by")?,
        source_filenames: row.get("source_filenames")?,
    })
}

fn conversion_error(row: &Row<'_>, column: &str, message: String) -> rusqlite::Error {
    let index = row.as_ref().column_index(column).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, message.into())
}
