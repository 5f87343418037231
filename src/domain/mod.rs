// ==========================================
// 兼容性矩阵导入系统 - 领域模型层
// ==========================================
// 职责: 定义工作簿输入模型、记录形态、分类枚举
// 红线: 不含数据访问逻辑,不含扫描逻辑
// ==========================================

pub mod compatibility;
pub mod types;
pub mod workbook;

// 重导出核心类型
pub use compatibility::{
    CapabilityRecord, ColumnHeader, CompatibilityRecord, IngestionMetadata, MatrixRecord,
    SheetScanReport,
};
pub use types::{DenoisingSheetKind, PipelineVariant, RecordType, SheetKind};
pub use workbook::{Cell, Sheet, UploadedFile, Workbook};
