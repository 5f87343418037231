// ==========================================
// 兼容性矩阵导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 输入错误（4xx，无落库）/ 存储错误（5xx，整体回滚）
// ==========================================

use crate::domain::types::PipelineVariant;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 输入错误 =====
    #[error("no file(s) provided")]
    NoFilesProvided,

    #[error("unsupported file format: {0} (expected .xlsx/.xlsm/.xlsb/.xls/.ods/.csv)")]
    UnsupportedFormat(String),

    #[error("failed to parse workbook {file}: {message}")]
    WorkbookParseError { file: String, message: String },

    #[error("no valid {variant} records found")]
    NoValidRecords { variant: PipelineVariant },

    // ===== 存储错误 =====
    #[error("store failure: {0}")]
    Store(#[from] RepositoryError),

    // ===== 配置错误 =====
    #[error("configuration error (key: {key}): {message}")]
    Config { key: String, message: String },
}

impl ImportError {
    /// 是否为输入类错误（调用方应修正文件，而非重试）
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ImportError::NoFilesProvided
                | ImportError::UnsupportedFormat(_)
                | ImportError::WorkbookParseError { .. }
                | ImportError::NoValidRecords { .. }
        )
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_classification() {
        assert!(ImportError::NoFilesProvided.is_input_error());
        assert!(ImportError::NoValidRecords {
            variant: PipelineVariant::Denoising
        }
        .is_input_error());
        assert!(!ImportError::Store(RepositoryError::LockError("poisoned".into())).is_input_error());
    }

    #[test]
    fn test_no_valid_records_message_names_variant() {
        let err = ImportError::NoValidRecords {
            variant: PipelineVariant::Compatibility,
        };
        assert_eq!(err.to_string(), "no valid compatibility records found");
    }
}
