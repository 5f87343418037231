// ==========================================
// 兼容性矩阵导入系统 - 兼容性记录领域模型
// ==========================================
// 职责: 扫描器输出单元 / 列头 / 导入元数据
// 生命周期: 扫描器产出 → 去重器消费 → 提交后成为目标表行
// ==========================================

use crate::domain::types::{PipelineVariant, RecordType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::Hash;

// ==========================================
// ColumnHeader - 列头
// ==========================================
// display_name 保留内部换行（下游可能渲染多行目标标签）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnHeader {
    pub column_index: usize,
    pub display_name: String,
}

impl ColumnHeader {
    pub fn new(column_index: usize, display_name: impl Into<String>) -> Self {
        Self {
            column_index,
            display_name: display_name.into(),
        }
    }
}

// ==========================================
// Trait: MatrixRecord
// ==========================================
// 用途: 两种记录形态共用的去重/校验接口
// 约束: identity_key 覆盖除 status 外全部字段
pub trait MatrixRecord: Clone + Send + Sync {
    type Key: Eq + Hash;

    /// 复合身份键（不含 status）
    fn identity_key(&self) -> Self::Key;

    /// 必填字段是否齐全（version 允许为空）
    fn is_complete(&self) -> bool;
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

// ==========================================
// CompatibilityRecord - 通用形态
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompatibilityRecord {
    pub software: String,         // 主体软件名
    pub software_version: String, // 版本（可为空）
    pub feature: String,          // 兼容维度（如 Windows / Host Application）
    pub compat_target: String,    // 兼容目标（列头或桥接应用）
    pub status: String,           // 规范化状态
}

impl CompatibilityRecord {
    pub fn new(
        software: impl Into<String>,
        software_version: impl Into<String>,
        feature: impl Into<String>,
        compat_target: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            software: software.into(),
            software_version: software_version.into(),
            feature: feature.into(),
            compat_target: compat_target.into(),
            status: status.into(),
        }
    }
}

impl MatrixRecord for CompatibilityRecord {
    type Key = (String, String, String, String);

    fn identity_key(&self) -> Self::Key {
        (
            self.software.clone(),
            self.software_version.clone(),
            self.feature.clone(),
            self.compat_target.clone(),
        )
    }

    fn is_complete(&self) -> bool {
        filled(&self.software) && filled(&self.compat_target) && filled(&self.status)
    }
}

// ==========================================
// CapabilityRecord - 能力形态（降噪管道）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityRecord {
    pub name: String,           // 软件名或能力名（CPU/GPU/Bayer...）
    pub version: String,        // 版本（能力行为空）
    pub denoising_tech: String, // 降噪技术（列头）
    pub status: String,         // 规范化状态（传感器感知）
    pub record_type: RecordType,
}

impl MatrixRecord for CapabilityRecord {
    type Key = (String, String, String, RecordType);

    fn identity_key(&self) -> Self::Key {
        (
            self.name.clone(),
            self.version.clone(),
            self.denoising_tech.clone(),
            self.record_type,
        )
    }

    fn is_complete(&self) -> bool {
        filled(&self.name) && filled(&self.denoising_tech) && filled(&self.status)
    }
}

// ==========================================
// IngestionMetadata - 导入元数据（审计，只追加）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionMetadata {
    pub ingestion_id: String,         // UUID v4
    pub pipeline: PipelineVariant,    // 管道变体
    pub ingested_at: DateTime<Utc>,   // 提交时间
    pub total_records: usize,         // 去重前记录数
    pub valid_records: usize,         // 去重+校验后记录数
    pub uploaded_by: Option<String>,  // 上传者（鉴权层透传）
    pub source_filenames: String,     // 上传文件名，", " 连接
}

// ==========================================
// SheetScanReport - 单表扫描统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetScanReport {
    pub workbook: String,
    pub sheet: String,
    pub kind: String,
    pub records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_ignores_status() {
        let a = CompatibilityRecord::new("DxO PhotoLab", "9", "Windows", "Windows 11", "compatible");
        let b = CompatibilityRecord::new("DxO PhotoLab", "9", "Windows", "Windows 11", "not compatible");
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_compatibility_record_completeness() {
        let ok = CompatibilityRecord::new("DxO PhotoLab", "", "Windows", "Windows 11", "compatible");
        assert!(ok.is_complete());

        let no_target = CompatibilityRecord::new("DxO PhotoLab", "9", "Windows", "  ", "compatible");
        assert!(!no_target.is_complete());

        let no_status = CompatibilityRecord::new("DxO PhotoLab", "9", "Windows", "Windows 11", "");
        assert!(!no_status.is_complete());
    }

    #[test]
    fn test_capability_key_distinguishes_record_type() {
        let software = CapabilityRecord {
            name: "GPU".to_string(),
            version: String::new(),
            denoising_tech: "DeepPRIME".to_string(),
            status: "compatible".to_string(),
            record_type: RecordType::Software,
        };
        let capability = CapabilityRecord {
            record_type: RecordType::Capability,
            ..software.clone()
        };
        assert_ne!(software.identity_key(), capability.identity_key());
        assert!(capability.is_complete());
    }
}
