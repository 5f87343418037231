// ==========================================
// 兼容性矩阵导入系统 - 通用管道行扫描器
// ==========================================
// 职责: 每个 SheetKind 一个处理函数，产出 CompatibilityRecord
// 约束: 宿主应用桥接表按行判定主体方向（品牌标记），不可统一处理
// ==========================================

use super::{fold_sheet, DataRow, ScanLayout, ScanState};
use crate::domain::compatibility::CompatibilityRecord;
use crate::domain::types::SheetKind;
use crate::domain::workbook::Sheet;
use crate::importer::software_parser::parse_software;
use crate::importer::status_normalizer::normalize_status;

/// 主品牌标记（宿主桥接表方向判定）
pub const PRIMARY_BRAND_MARKER: &str = "dxo";

const OS_LAYOUT: ScanLayout = ScanLayout {
    header_row: 0,
    label_col: 0,
    first_target_col: 1,
    section_keywords: &["plugins"],
};

const LIGHTROOM_LAYOUT: ScanLayout = ScanLayout {
    header_row: 0,
    label_col: 0,
    first_target_col: 1,
    section_keywords: &["export to"],
};

const HOST_APP_LAYOUT: ScanLayout = ScanLayout {
    header_row: 0,
    label_col: 0,
    first_target_col: 1,
    section_keywords: &["plugin instance", "plugins"],
};

const DEVICE_LAYOUT: ScanLayout = ScanLayout {
    header_row: 0,
    label_col: 0,
    first_target_col: 1,
    section_keywords: &["dng/jpeg"],
};

const PLUGIN_COLLECTION_LAYOUT: ScanLayout = ScanLayout {
    header_row: 0,
    label_col: 0,
    first_target_col: 1,
    section_keywords: &["plugins", "plugin instance"],
};

/// 各类别写入 feature 列的维度名
pub fn feature_for(kind: SheetKind) -> &'static str {
    match kind {
        SheetKind::OsWindows | SheetKind::PluginOsWin => "Windows",
        SheetKind::OsMacos | SheetKind::PluginOsMac => "macOS",
        SheetKind::LightroomBridge => "Lightroom Classic",
        SheetKind::HostAppBridge => "Host Application",
        SheetKind::DeviceRawConverter => "RAW Conversion",
        SheetKind::PluginCollection => "Nik Collection",
    }
}

/// 按类别分派扫描
pub fn scan_sheet(kind: SheetKind, sheet: &Sheet) -> Vec<CompatibilityRecord> {
    match kind {
        SheetKind::OsWindows | SheetKind::OsMacos => scan_os_sheet(kind, sheet),
        SheetKind::LightroomBridge => scan_lightroom_bridge(sheet),
        SheetKind::HostAppBridge => scan_host_app_bridge(sheet),
        SheetKind::DeviceRawConverter => scan_device_converter(sheet),
        SheetKind::PluginCollection => scan_plugin_collection(sheet),
        SheetKind::PluginOsMac | SheetKind::PluginOsWin => scan_plugin_os(kind, sheet),
    }
}

// ==========================================
// 各类别处理函数
// ==========================================

fn scan_os_sheet(kind: SheetKind, sheet: &Sheet) -> Vec<CompatibilityRecord> {
    let feature = feature_for(kind);
    fold_sheet(sheet, &OS_LAYOUT, |state, row| row_subject_records(state, row, feature))
}

fn scan_lightroom_bridge(sheet: &Sheet) -> Vec<CompatibilityRecord> {
    let feature = feature_for(SheetKind::LightroomBridge);
    fold_sheet(sheet, &LIGHTROOM_LAYOUT, |state, row| {
        row_subject_records(state, row, feature)
    })
}

fn scan_host_app_bridge(sheet: &Sheet) -> Vec<CompatibilityRecord> {
    let feature = feature_for(SheetKind::HostAppBridge);
    fold_sheet(sheet, &HOST_APP_LAYOUT, |state, row| {
        if is_primary_brand_row(&row.label) {
            row_subject_records(state, row, feature)
        } else {
            column_subject_records(state, row, feature)
        }
    })
}

fn scan_device_converter(sheet: &Sheet) -> Vec<CompatibilityRecord> {
    let feature = feature_for(SheetKind::DeviceRawConverter);
    fold_sheet(sheet, &DEVICE_LAYOUT, |state, row| row_subject_records(state, row, feature))
}

fn scan_plugin_collection(sheet: &Sheet) -> Vec<CompatibilityRecord> {
    let feature = feature_for(SheetKind::PluginCollection);
    fold_sheet(sheet, &PLUGIN_COLLECTION_LAYOUT, |state, row| {
        row_subject_records(state, row, feature)
    })
}

fn scan_plugin_os(kind: SheetKind, sheet: &Sheet) -> Vec<CompatibilityRecord> {
    let feature = feature_for(kind);
    fold_sheet(sheet, &OS_LAYOUT, |state, row| row_subject_records(state, row, feature))
}

// ==========================================
// 记录构造
// ==========================================

/// 行标签含主品牌标记 → 该行为主产品（按行取主体）
pub fn is_primary_brand_row(label: &str) -> bool {
    label.to_lowercase().contains(PRIMARY_BRAND_MARKER)
}

/// 行为主体: software = 行标签，compat_target = 列头
fn row_subject_records(
    state: &ScanState,
    row: &DataRow<'_>,
    feature: &str,
) -> Vec<CompatibilityRecord> {
    let parsed = parse_software(&row.label);
    if parsed.name.is_empty() {
        return Vec::new();
    }
    let version = state.version_or_carried(parsed.version);

    state
        .active_headers
        .iter()
        .map(|header| {
            CompatibilityRecord::new(
                parsed.name.clone(),
                version.clone(),
                feature,
                header.display_name.clone(),
                normalize_status(row.cell(header.column_index)),
            )
        })
        .collect()
}

/// 列为主体: software = 列头（插件），compat_target = 行标签（外部应用）
fn column_subject_records(
    state: &ScanState,
    row: &DataRow<'_>,
    feature: &str,
) -> Vec<CompatibilityRecord> {
    state
        .active_headers
        .iter()
        .filter_map(|header| {
            let parsed = parse_software(&header.display_name);
            if parsed.name.is_empty() {
                return None;
            }
            Some(CompatibilityRecord::new(
                parsed.name,
                state.version_or_carried(parsed.version),
                feature,
                row.label.clone(),
                normalize_status(row.cell(header.column_index)),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workbook::Cell;
    use proptest::prelude::*;

    fn sheet(name: &str, rows: &[Vec<&str>]) -> Sheet {
        Sheet::from_text_rows(name, rows)
    }

    #[test]
    fn test_os_sheet_basic() {
        let sheet = sheet(
            "Windows",
            &[
                vec!["Software", "Windows 10", "Windows 11"],
                vec!["DxO PhotoLab 9", "✓", "✗"],
                vec!["DxO FilmPack 5.5.26 and up", "64-bit only", ""],
            ],
        );
        let records = scan_sheet(SheetKind::OsWindows, &sheet);
        assert_eq!(
            records,
            vec![
                CompatibilityRecord::new("DxO PhotoLab", "9", "Windows", "Windows 10", "compatible"),
                CompatibilityRecord::new("DxO PhotoLab", "9", "Windows", "Windows 11", "not compatible"),
                CompatibilityRecord::new("DxO FilmPack", "5.5.26 and up", "Windows", "Windows 10", "64-bit only"),
                CompatibilityRecord::new("DxO FilmPack", "5.5.26 and up", "Windows", "Windows 11", "not compatible"),
            ]
        );
    }

    #[test]
    fn test_section_header_switches_columns_and_version() {
        let sheet = sheet(
            "macOS",
            &[
                vec!["Software", "Sonoma", "Sequoia"],
                vec!["DxO PhotoLab 8", "✓", "✓"],
                vec!["Plugins 4", "Ventura"],
                vec!["DxO ViewPoint", "✓"],
            ],
        );
        let records = scan_sheet(SheetKind::OsMacos, &sheet);
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[2],
            CompatibilityRecord::new("DxO ViewPoint", "4", "macOS", "Ventura", "compatible")
        );
    }

    #[test]
    fn test_multiline_header_preserved_in_target() {
        let sheet = Sheet::new(
            "Windows",
            vec![
                vec![Cell::text("Software"), Cell::text("Windows 10\n(64-bit)")],
                vec![Cell::text("DxO PureRAW 4"), Cell::text("✔")],
            ],
        );
        let records = scan_sheet(SheetKind::OsWindows, &sheet);
        assert_eq!(records[0].compat_target, "Windows 10\n(64-bit)");
    }

    // 方向启发式边界: 单一品牌关键字判定，属于已知启发式而非保证正确的分类
    #[test]
    fn test_host_app_orientation_heuristic() {
        let sheet = sheet(
            "PL & Host apps",
            &[
                vec!["Application", "DxO FilmPack 7", "DxO ViewPoint 4"],
                vec!["DxO PhotoLab 8", "✓", "✓"],
                vec!["Adobe Photoshop 2024", "✓", "✗"],
            ],
        );
        let records = scan_sheet(SheetKind::HostAppBridge, &sheet);
        assert_eq!(records.len(), 4);

        // 品牌行: 行为主体
        assert_eq!(
            records[0],
            CompatibilityRecord::new("DxO PhotoLab", "8", "Host Application", "DxO FilmPack 7", "compatible")
        );
        // 外部应用行: 列为主体，行标签为目标
        assert_eq!(
            records[2],
            CompatibilityRecord::new("DxO FilmPack", "7", "Host Application", "Adobe Photoshop 2024", "compatible")
        );
        assert_eq!(
            records[3],
            CompatibilityRecord::new("DxO ViewPoint", "4", "Host Application", "Adobe Photoshop 2024", "not compatible")
        );
    }

    #[test]
    fn test_host_app_carried_version_for_column_subject() {
        let sheet = sheet(
            "Host apps",
            &[
                vec!["Application", "x"],
                vec!["Plugin instance - DxO FilmPack 7", "DxO FilmPack"],
                vec!["Capture One 23", "✓"],
            ],
        );
        let records = scan_sheet(SheetKind::HostAppBridge, &sheet);
        assert_eq!(
            records,
            vec![CompatibilityRecord::new("DxO FilmPack", "7", "Host Application", "Capture One 23", "compatible")]
        );
    }

    #[test]
    fn test_lightroom_export_section_carries_version() {
        let sheet = sheet(
            "Lightroom",
            &[
                vec!["Product", "LrC 12", "LrC 13"],
                vec!["Export to PhotoLab 7", "LrC 12", "LrC 13"],
                vec!["DxO PhotoLab", "✓", "—"],
            ],
        );
        let records = scan_sheet(SheetKind::LightroomBridge, &sheet);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.software_version == "7"));
        assert_eq!(records[1].status, "not compatible");
    }

    #[test]
    fn test_nik_plugin_sheets_use_os_feature() {
        let sheet = sheet(
            "Nik macOS",
            &[vec!["Plugin", "Sonoma"], vec!["Nik Color Efex 7", "yes"]],
        );
        let records = scan_sheet(SheetKind::PluginOsMac, &sheet);
        assert_eq!(
            records,
            vec![CompatibilityRecord::new("Nik Color Efex", "7", "macOS", "Sonoma", "compatible")]
        );
    }

    #[test]
    fn test_device_converter_dng_section() {
        let sheet = sheet(
            "DxO PureRAW",
            &[
                vec!["Version", "Lightroom Classic"],
                vec!["DxO PureRAW 3", "✓"],
                vec!["DNG/JPEG output", "DNG", "JPEG"],
                vec!["DxO PureRAW 4", "✓", "✓"],
            ],
        );
        let records = scan_sheet(SheetKind::DeviceRawConverter, &sheet);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].compat_target, "DNG");
    }

    fn grid(
        before: &[String],
        version: &str,
        section_targets: usize,
        after: &[String],
        targets: usize,
    ) -> Sheet {
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut header = vec!["Software".to_string()];
        header.extend((0..targets).map(|i| format!("Target {}", i)));
        rows.push(header);
        for label in before {
            let mut row = vec![label.clone()];
            row.extend((0..targets).map(|_| "✓".to_string()));
            rows.push(row);
        }
        let mut section = vec![format!("Plugins {}", version)];
        section.extend((0..section_targets).map(|i| format!("Section {}", i)));
        rows.push(section);
        for label in after {
            let mut row = vec![label.clone()];
            row.extend((0..section_targets).map(|_| "✗".to_string()));
            rows.push(row);
        }
        Sheet::from_text_rows("Windows", &rows)
    }

    proptest! {
        #[test]
        fn prop_record_count_and_carried_version(
            before in prop::collection::vec("Tool[a-z]{1,6}", 0..5),
            after in prop::collection::vec("Tool[a-z]{1,6}", 0..5),
            version in "[1-9][0-9]?(\\.[0-9])?",
            targets in 1usize..4,
            section_targets in 1usize..4,
        ) {
            let sheet = grid(&before, &version, section_targets, &after, targets);
            let records = scan_sheet(SheetKind::OsWindows, &sheet);

            prop_assert_eq!(records.len(), before.len() * targets + after.len() * section_targets);

            let (head, tail) = records.split_at(before.len() * targets);
            prop_assert!(head.iter().all(|r| r.software_version.is_empty()));
            prop_assert!(tail.iter().all(|r| r.software_version == version));
            prop_assert!(tail.iter().all(|r| r.compat_target.starts_with("Section")));
        }
    }
}
