// ==========================================
// 兼容性矩阵导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + calamine
// 系统定位: 将人工维护的兼容性工作簿规范化后整表替换入库
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 工作簿模型与记录形态
pub mod domain;

// 数据仓储层 - 事务化装载
pub mod repository;

// 导入层 - 分类/解析/扫描/去重/编排
pub mod importer;

// 配置层 - 批量大小与目标表名
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DenoisingSheetKind, PipelineVariant, RecordType, SheetKind};

// 领域实体
pub use domain::{
    CapabilityRecord, CompatibilityRecord, IngestionMetadata, Sheet, UploadedFile, Workbook,
};

// 编排器
pub use importer::{CompatibilityPipeline, ImportError, IngestionOutcome};

// API
pub use api::{ApiError, ImportApi, ImportApiResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "compat-matrix";
