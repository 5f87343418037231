// ==========================================
// 兼容性矩阵导入系统 - 降噪管道行扫描器
// ==========================================
// 职责: "Denoising Technologies" / "Denoising Requirements" 表 → CapabilityRecord
// 规则: 标签精确命中能力名集合 → capability 记录（无版本）；否则按软件行解析
// ==========================================

use super::{fold_sheet, DataRow, ScanLayout, ScanState};
use crate::domain::compatibility::CapabilityRecord;
use crate::domain::types::{DenoisingSheetKind, RecordType};
use crate::domain::workbook::Sheet;
use crate::importer::software_parser::parse_software;
use crate::importer::status_normalizer::{normalize_sensor_status, SensorContext};

/// 已知能力名（精确匹配，区分大小写）
pub const CAPABILITY_NAMES: &[&str] = &[
    "CPU", "GPU", "NPU", "Bayer", "XTrans", "X-Trans", "Jpeg", "JPEG", "Raw", "RAW", "DNG",
];

const DENOISING_LAYOUT: ScanLayout = ScanLayout {
    header_row: 0,
    label_col: 0,
    first_target_col: 1,
    section_keywords: &["software", "capabilities"],
};

pub fn is_capability_name(label: &str) -> bool {
    CAPABILITY_NAMES.contains(&label)
}

/// 扫描降噪表（两类表版式相同，kind 仅用于日志与统计）
pub fn scan_denoising_sheet(kind: DenoisingSheetKind, sheet: &Sheet) -> Vec<CapabilityRecord> {
    let records = fold_sheet(sheet, &DENOISING_LAYOUT, capability_records);
    tracing::debug!(
        kind = kind.code(),
        sheet = %sheet.name,
        records = records.len(),
        "降噪表扫描完成"
    );
    records
}

fn capability_records(state: &ScanState, row: &DataRow<'_>) -> Vec<CapabilityRecord> {
    let (name, version, record_type, context) = if is_capability_name(&row.label) {
        (
            row.label.clone(),
            String::new(),
            RecordType::Capability,
            SensorContext::Single,
        )
    } else {
        let parsed = parse_software(&row.label);
        if parsed.name.is_empty() {
            return Vec::new();
        }
        (
            parsed.name,
            state.version_or_carried(parsed.version),
            RecordType::Software,
            SensorContext::Dual,
        )
    };

    state
        .active_headers
        .iter()
        .map(|header| CapabilityRecord {
            name: name.clone(),
            version: version.clone(),
            denoising_tech: header.display_name.clone(),
            status: normalize_sensor_status(row.cell(header.column_index), context),
            record_type,
        })
        .collect()
}
