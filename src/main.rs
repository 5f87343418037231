// ==========================================
// 兼容性矩阵导入系统 - 命令行入口
// ==========================================
// 用法: compat-matrix [--denoising] [--db PATH] [--uploaded-by EMAIL] FILE...
// 输出: stdout 为 JSON（成功响应 / ErrorResponse），日志写 stderr
// ==========================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use compat_matrix::api::{ApiError, ErrorResponse};
use compat_matrix::app::{get_default_db_path, AppState};
use compat_matrix::domain::UploadedFile;
use compat_matrix::logging::LogFormat;
use compat_matrix::{i18n, logging, PipelineVariant};
use serde::Serialize;

/// 兼容性矩阵导入工具
#[derive(Parser, Debug)]
#[command(name = "compat-matrix")]
#[command(about = "Import compatibility matrix workbooks into SQLite")]
#[command(version)]
struct Args {
    /// 上传的工作簿（xlsx/xlsm/xlsb/xls/ods/csv）
    files: Vec<PathBuf>,

    /// 使用降噪能力管道（默认通用兼容性管道）
    #[arg(long)]
    denoising: bool,

    /// 数据库路径
    #[arg(long, env = "COMPAT_MATRIX_DB_PATH")]
    db: Option<String>,

    /// 上传者（写入导入元数据）
    #[arg(long)]
    uploaded_by: Option<String>,

    /// 查看最近 N 次导入记录（不执行导入）
    #[arg(long, value_name = "N")]
    history: Option<i32>,

    /// 消息语言（en / zh-CN）
    #[arg(long, default_value = "en")]
    locale: String,

    /// JSON 格式日志
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    });
    i18n::set_locale(&args.locale);

    tracing::info!("{} v{}", compat_matrix::APP_NAME, compat_matrix::VERSION);

    let db_path = args.db.clone().unwrap_or_else(get_default_db_path);
    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            return emit_error(&ApiError::InternalError(e));
        }
    };

    let variant = if args.denoising {
        PipelineVariant::Denoising
    } else {
        PipelineVariant::Compatibility
    };

    if let Some(limit) = args.history {
        return match state.import_api.list_recent_ingestions(variant, limit).await {
            Ok(history) => emit(&history),
            Err(e) => emit_error(&e),
        };
    }

    let files = match read_files(&args.files) {
        Ok(files) => files,
        Err(e) => return emit_error(&e),
    };

    let uploaded_by = args.uploaded_by.as_deref();
    let result = match variant {
        PipelineVariant::Compatibility => {
            state.import_api.import_compatibility(&files, uploaded_by).await
        }
        PipelineVariant::Denoising => state.import_api.import_denoising(&files, uploaded_by).await,
    };

    match result {
        Ok(response) => emit(&response),
        Err(e) => emit_error(&e),
    }
}

/// 读取全部文件；任一失败即视为输入错误
fn read_files(paths: &[PathBuf]) -> Result<Vec<UploadedFile>, ApiError> {
    paths
        .iter()
        .map(|path| {
            UploadedFile::from_path(path).map_err(|e| ApiError::InvalidInput {
                message: i18n::t_with_args(
                    "api.workbook_unreadable",
                    &[("file", &path.display().to_string())],
                ),
                details: Some(e.to_string()),
            })
        })
        .collect()
}

fn emit<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "结果序列化失败");
            ExitCode::FAILURE
        }
    }
}

fn emit_error(err: &ApiError) -> ExitCode {
    let response: ErrorResponse = err.to_response();
    if let Ok(json) = serde_json::to_string_pretty(&response) {
        println!("{}", json);
    }
    // 2 = 输入问题（修正文件），1 = 服务端问题（稍后重试）
    if err.is_client_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}
