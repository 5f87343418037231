// ==========================================
// 兼容性矩阵导入系统 - 行扫描引擎
// ==========================================
// 职责: 按行折叠工作表网格，维护扫描状态（活动列头 + 携带版本）
// 状态机: AWAITING_HEADER → SCANNING ↔ SECTION_HEADER（瞬态，处理后回到 SCANNING）
// 约束: 状态按步不可变传递，便于逐行测试；畸形行/单元格只跳过不报错
// ==========================================

pub mod compatibility;
pub mod denoising;

use crate::domain::compatibility::ColumnHeader;
use crate::domain::workbook::{row_cell, Cell, Sheet};
use once_cell::sync::Lazy;
use regex::Regex;

pub use compatibility::scan_sheet;
pub use denoising::scan_denoising_sheet;

// 节标题中的版本号片段（取最后一个）
static SECTION_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)*").expect("valid regex"));

// ==========================================
// ScanLayout - 扫描版式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLayout {
    pub header_row: usize,       // 指定表头行
    pub label_col: usize,        // 行标签列
    pub first_target_col: usize, // 目标列起始
    pub section_keywords: &'static [&'static str], // 节标题关键字（小写）
}

// ==========================================
// ScanPhase / ScanState - 扫描状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPhase {
    #[default]
    AwaitingHeader,
    Scanning,
}

/// 跨行状态，仅包含活动列头与携带版本
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanState {
    pub phase: ScanPhase,
    pub active_headers: Vec<ColumnHeader>,
    pub carried_version: String,
}

impl ScanState {
    /// 行自带版本为空时回退到携带版本
    pub fn version_or_carried(&self, version: String) -> String {
        if version.is_empty() {
            self.carried_version.clone()
        } else {
            version
        }
    }
}

// ==========================================
// RowEvent / DataRow - 单行处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RowEvent<'a> {
    Skipped,
    Header,
    SectionHeader,
    Data(DataRow<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataRow<'a> {
    pub row_index: usize,
    pub label: String,
    pub cells: &'a [Cell],
}

impl DataRow<'_> {
    pub fn cell(&self, column: usize) -> &Cell {
        row_cell(self.cells, column)
    }
}

/// 从表头行提取列头（起始列之后的非空文本/数值单元格）
///
/// 仅去首尾空白，内部换行保留。
pub fn extract_headers(row: &[Cell], first_col: usize) -> Vec<ColumnHeader> {
    row.iter()
        .enumerate()
        .skip(first_col)
        .filter_map(|(idx, cell)| {
            let name = match cell {
                Cell::Text(s) => s.trim().to_string(),
                Cell::Number(n) if n.is_finite() => n.to_string(),
                _ => return None,
            };
            if name.is_empty() {
                None
            } else {
                Some(ColumnHeader::new(idx, name))
            }
        })
        .collect()
}

/// 节标题识别（标签小写后包含任一关键字）
pub fn is_section_header(label: &str, keywords: &[&str]) -> bool {
    let lowered = label.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k))
}

/// 节标题中的版本号（最后一个数字片段）
pub fn section_version(label: &str) -> Option<String> {
    SECTION_VERSION_RE
        .find_iter(label)
        .last()
        .map(|m| m.as_str().to_string())
}

/// 单步推进: (旧状态, 行) → (新状态, 行事件)
pub fn advance<'a>(
    layout: &ScanLayout,
    state: ScanState,
    row_index: usize,
    row: &'a [Cell],
) -> (ScanState, RowEvent<'a>) {
    if state.phase == ScanPhase::AwaitingHeader {
        if row_index < layout.header_row {
            return (state, RowEvent::Skipped);
        }
        let next = ScanState {
            phase: ScanPhase::Scanning,
            active_headers: extract_headers(row, layout.first_target_col),
            carried_version: state.carried_version,
        };
        return (next, RowEvent::Header);
    }

    let label = match row_cell(row, layout.label_col).label_text() {
        Some(label) => label,
        None => return (state, RowEvent::Skipped),
    };

    if is_section_header(&label, layout.section_keywords) {
        let headers = extract_headers(row, layout.first_target_col);
        let next = ScanState {
            phase: ScanPhase::Scanning,
            // 空节标题行（仅分隔用途）沿用原列头
            active_headers: if headers.is_empty() {
                state.active_headers
            } else {
                headers
            },
            carried_version: section_version(&label).unwrap_or(state.carried_version),
        };
        return (next, RowEvent::SectionHeader);
    }

    (
        state,
        RowEvent::Data(DataRow {
            row_index,
            label,
            cells: row,
        }),
    )
}

/// 折叠整张表: 每个数据行交给 emit，收集产出记录
pub fn fold_sheet<R, F>(sheet: &Sheet, layout: &ScanLayout, mut emit: F) -> Vec<R>
where
    F: FnMut(&ScanState, &DataRow<'_>) -> Vec<R>,
{
    let (_, records) = sheet.rows.iter().enumerate().fold(
        (ScanState::default(), Vec::new()),
        |(state, mut records), (row_index, row)| {
            let (next, event) = advance(layout, state, row_index, row);
            if let RowEvent::Data(data_row) = &event {
                records.extend(emit(&next, data_row));
            }
            (next, records)
        },
    );
    records
}
