// ==========================================
// 兼容性矩阵导入系统 - 导入层
// ==========================================
// 职责: 上传工作簿 → 规范化兼容性记录 → 目标表
// 支持: Excel 系列, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod pipeline;
pub mod record_deduplicator;
pub mod row_scanner;
pub mod sheet_classifier;
pub mod software_parser;
pub mod status_normalizer;
pub mod workbook_reader;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use pipeline::{
    extract_compatibility_records, extract_denoising_records, CompatibilityPipeline,
    IngestionOutcome,
};
pub use record_deduplicator::{dedupe_and_validate, dedupe_with_stats, DedupOutcome};
pub use row_scanner::{scan_denoising_sheet, scan_sheet};
pub use sheet_classifier::classify_sheet;
pub use software_parser::{parse_software, ParsedSoftware};
pub use status_normalizer::{normalize_sensor_status, normalize_status, SensorContext};
pub use workbook_reader::{
    CsvWorkbookReader, ExcelWorkbookReader, UniversalWorkbookReader, WorkbookReader,
};
