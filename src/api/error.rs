// ==========================================
// 兼容性矩阵导入系统 - API层错误类型
// ==========================================
// 职责: 将导入/仓储错误转换为调用方可区分的错误响应
// 分类: InvalidInput（4xx，修正文件）/ DatabaseError、InternalError（5xx，稍后重试）
// ==========================================

use crate::domain::types::PipelineVariant;
use crate::i18n::{t, t_with_args};
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 输入错误 =====
    #[error("{message}")]
    InvalidInput {
        message: String,
        details: Option<String>,
    },

    // ===== 存储错误 =====
    #[error("{message}")]
    DatabaseError { message: String, details: String },

    // ===== 通用错误 =====
    #[error("{0}")]
    InternalError(String),
}

impl ApiError {
    /// 导入错误 → API 错误（消息按管道变体本地化）
    pub fn from_import(variant: PipelineVariant, err: ImportError) -> Self {
        let variant_name = variant.code();
        match err {
            ImportError::NoFilesProvided => ApiError::InvalidInput {
                message: t("api.no_files"),
                details: None,
            },
            ImportError::UnsupportedFormat(format) => ApiError::InvalidInput {
                message: t_with_args("api.unsupported_format", &[("format", &format)]),
                details: None,
            },
            ImportError::WorkbookParseError { file, message } => ApiError::InvalidInput {
                message: t_with_args("api.workbook_unreadable", &[("file", &file)]),
                details: Some(message),
            },
            ImportError::NoValidRecords { .. } => ApiError::InvalidInput {
                message: t_with_args("api.no_valid_records", &[("variant", variant_name)]),
                details: None,
            },
            ImportError::Store(e) => ApiError::DatabaseError {
                message: t_with_args("api.update_failed", &[("variant", variant_name)]),
                details: e.to_string(),
            },
            ImportError::Config { key, message } => ApiError::DatabaseError {
                message: t("api.config_failed"),
                details: format!("{}: {}", key, message),
            },
        }
    }

    /// HTTP 等价状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput { .. } => 400,
            ApiError::DatabaseError { .. } | ApiError::InternalError(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// 错误响应体
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            ApiError::InvalidInput { message, details } => ErrorResponse {
                error: message.clone(),
                details: details.clone(),
            },
            ApiError::DatabaseError { message, details } => ErrorResponse {
                error: message.clone(),
                details: Some(details.clone()),
            },
            ApiError::InternalError(details) => ErrorResponse {
                error: t("api.internal_error"),
                details: Some(details.clone()),
            },
        }
    }
}

// ==========================================
// 从 RepositoryError 转换（只读查询路径）
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InvalidTableName(name) => ApiError::InvalidInput {
                message: t("api.config_failed"),
                details: Some(name),
            },
            other => ApiError::DatabaseError {
                message: t("api.history_failed"),
                details: other.to_string(),
            },
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// ErrorResponse - 错误响应体
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
