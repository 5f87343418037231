// ==========================================
// 兼容性矩阵导入系统 - 管道编排器
// ==========================================
// 职责: 整合导入流程，从上传文件到目标表
// 流程: 读取 → 分类 → 扫描 → 去重校验 → 整表替换 → 追加元数据
// 约束: 单次运行串行执行，无内部并行；遍历顺序 = 上传顺序 → 工作表声明顺序
// ==========================================

use crate::config::{PipelineConfigReader, TableSet};
use crate::domain::compatibility::{
    CapabilityRecord, CompatibilityRecord, IngestionMetadata, MatrixRecord, SheetScanReport,
};
use crate::domain::types::{DenoisingSheetKind, PipelineVariant};
use crate::domain::workbook::{UploadedFile, Workbook};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::record_deduplicator::dedupe_with_stats;
use crate::importer::row_scanner::{scan_denoising_sheet, scan_sheet};
use crate::importer::sheet_classifier::classify_sheet;
use crate::importer::workbook_reader::{UniversalWorkbookReader, WorkbookReader};
use crate::repository::CompatibilityRepository;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// IngestionOutcome - 单次运行结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionOutcome {
    pub ingestion_id: String,
    pub pipeline: PipelineVariant,
    pub total_records: usize, // 去重前
    pub valid_records: usize, // 去重+校验后
    pub updated_at: DateTime<Utc>,
    pub sheets: Vec<SheetScanReport>,
    pub metadata_recorded: bool, // 审计追加是否成功（失败不影响结果）
}

// ==========================================
// 抽取（纯函数，不触库）
// ==========================================

/// 通用管道: 分类每张表并扫描
pub fn extract_compatibility_records(
    workbooks: &[Workbook],
) -> (Vec<CompatibilityRecord>, Vec<SheetScanReport>) {
    let mut records = Vec::new();
    let mut reports = Vec::new();

    for workbook in workbooks {
        for sheet in &workbook.sheets {
            let kind = match classify_sheet(&sheet.name) {
                Some(kind) => kind,
                None => {
                    debug!(workbook = %workbook.source_name, sheet = %sheet.name, "未识别工作表，跳过");
                    continue;
                }
            };

            let scanned = scan_sheet(kind, sheet);
            debug!(
                workbook = %workbook.source_name,
                sheet = %sheet.name,
                kind = kind.code(),
                records = scanned.len(),
                "工作表扫描完成"
            );
            reports.push(SheetScanReport {
                workbook: workbook.source_name.clone(),
                sheet: sheet.name.clone(),
                kind: kind.code().to_string(),
                records: scanned.len(),
            });
            records.extend(scanned);
        }
    }

    (records, reports)
}

/// 降噪管道: 仅按精确表名取两类表
pub fn extract_denoising_records(
    workbooks: &[Workbook],
) -> (Vec<CapabilityRecord>, Vec<SheetScanReport>) {
    let mut records = Vec::new();
    let mut reports = Vec::new();

    for workbook in workbooks {
        for kind in DenoisingSheetKind::ALL {
            if workbook.sheet_by_name(kind.sheet_name()).is_none() {
                debug!(workbook = %workbook.source_name, expected = kind.sheet_name(), "缺少降噪表，记 0 条");
            }
        }

        for sheet in &workbook.sheets {
            let Some(kind) = DenoisingSheetKind::from_sheet_name(&sheet.name) else {
                debug!(workbook = %workbook.source_name, sheet = %sheet.name, "非降噪表，跳过");
                continue;
            };

            let scanned = scan_denoising_sheet(kind, sheet);
            reports.push(SheetScanReport {
                workbook: workbook.source_name.clone(),
                sheet: sheet.name.clone(),
                kind: kind.code().to_string(),
                records: scanned.len(),
            });
            records.extend(scanned);
        }
    }

    (records, reports)
}

// ==========================================
// CompatibilityPipeline - 编排器
// ==========================================
pub struct CompatibilityPipeline<R, C>
where
    R: CompatibilityRepository,
    C: PipelineConfigReader,
{
    // 数据访问层
    repo: R,

    // 配置读取器
    config: C,

    // 工作簿读取器
    workbook_reader: Box<dyn WorkbookReader + Send + Sync>,
}

impl<R, C> CompatibilityPipeline<R, C>
where
    R: CompatibilityRepository,
    C: PipelineConfigReader,
{
    /// 创建新的编排器（按扩展名自动选择读取器）
    pub fn new(repo: R, config: C) -> Self {
        Self::with_reader(repo, config, Box::new(UniversalWorkbookReader))
    }

    pub fn with_reader(
        repo: R,
        config: C,
        workbook_reader: Box<dyn WorkbookReader + Send + Sync>,
    ) -> Self {
        Self {
            repo,
            config,
            workbook_reader,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 运行通用管道
    ///
    /// # 返回
    /// - Ok(IngestionOutcome): 目标表已整体替换
    /// - Err(输入错误): 未触库
    /// - Err(Store): 事务已回滚，目标表保持原样
    #[instrument(skip(self, files), fields(files = files.len(), ingestion_id))]
    pub async fn run_compatibility(
        &self,
        files: &[UploadedFile],
        uploaded_by: Option<&str>,
    ) -> ImportResult<IngestionOutcome> {
        let variant = PipelineVariant::Compatibility;

        // === 步骤 1: 读取工作簿 ===
        let workbooks = self.read_workbooks(files)?;

        // === 步骤 2: 分类 + 扫描 ===
        let (raw_records, sheets) = extract_compatibility_records(&workbooks);
        info!(
            sheets = sheets.len(),
            raw_records = raw_records.len(),
            "扫描完成"
        );

        // === 步骤 3: 去重 + 校验 ===
        let (total_records, records) = Self::dedupe_step(variant, raw_records)?;

        // === 步骤 4: 整表替换 ===
        let tables = self.config.get_table_set(variant).await?;
        let batch_size = self.config.get_batch_size().await?;
        self.repo
            .replace_compatibility_records(&tables.data_table, &records, batch_size)
            .await
            .map_err(|e| {
                error!(table = %tables.data_table, error = %e, "目标表替换失败，事务已回滚");
                ImportError::Store(e)
            })?;

        // === 步骤 5: 追加元数据 ===
        Ok(self
            .finish(variant, &tables, files, uploaded_by, total_records, records.len(), sheets)
            .await)
    }

    /// 运行降噪管道（流程同通用管道，记录为能力形态）
    #[instrument(skip(self, files), fields(files = files.len(), ingestion_id))]
    pub async fn run_denoising(
        &self,
        files: &[UploadedFile],
        uploaded_by: Option<&str>,
    ) -> ImportResult<IngestionOutcome> {
        let variant = PipelineVariant::Denoising;

        let workbooks = self.read_workbooks(files)?;

        let (raw_records, sheets) = extract_denoising_records(&workbooks);
        info!(
            sheets = sheets.len(),
            raw_records = raw_records.len(),
            "扫描完成"
        );

        let (total_records, records) = Self::dedupe_step(variant, raw_records)?;

        let tables = self.config.get_table_set(variant).await?;
        let batch_size = self.config.get_batch_size().await?;
        self.repo
            .replace_capability_records(&tables.data_table, &records, batch_size)
            .await
            .map_err(|e| {
                error!(table = %tables.data_table, error = %e, "目标表替换失败，事务已回滚");
                ImportError::Store(e)
            })?;

        Ok(self
            .finish(variant, &tables, files, uploaded_by, total_records, records.len(), sheets)
            .await)
    }

    /// 读取全部上传文件（任一失败即整体失败，未触库）
    fn read_workbooks(&self, files: &[UploadedFile]) -> ImportResult<Vec<Workbook>> {
        if files.is_empty() {
            warn!("未提供上传文件");
            return Err(ImportError::NoFilesProvided);
        }

        files
            .iter()
            .map(|file| {
                let workbook = self.workbook_reader.read(file).map_err(|e| {
                    warn!(file = %file.filename, error = %e, "工作簿解析失败");
                    e
                })?;
                debug!(file = %file.filename, sheets = workbook.sheets.len(), "工作簿读取完成");
                Ok(workbook)
            })
            .collect()
    }

    fn dedupe_step<Rec: MatrixRecord>(
        variant: PipelineVariant,
        raw_records: Vec<Rec>,
    ) -> ImportResult<(usize, Vec<Rec>)> {
        let total_records = raw_records.len();
        let outcome = dedupe_with_stats(raw_records);
        info!(
            total_records,
            valid_records = outcome.records.len(),
            duplicates_dropped = outcome.duplicates_dropped,
            incomplete_dropped = outcome.incomplete_dropped,
            "去重校验完成"
        );

        if outcome.records.is_empty() {
            warn!(pipeline = variant.code(), "无有效记录，拒绝装载");
            return Err(ImportError::NoValidRecords { variant });
        }
        Ok((total_records, outcome.records))
    }

    /// 提交后追加审计元数据（失败只告警，不影响成功结果）
    #[allow(clippy::too_many_arguments)]
    async fn finish(
        &self,
        variant: PipelineVariant,
        tables: &TableSet,
        files: &[UploadedFile],
        uploaded_by: Option<&str>,
        total_records: usize,
        valid_records: usize,
        sheets: Vec<SheetScanReport>,
    ) -> IngestionOutcome {
        let metadata = IngestionMetadata {
            ingestion_id: Uuid::new_v4().to_string(),
            pipeline: variant,
            ingested_at: Utc::now(),
            total_records,
            valid_records,
            uploaded_by: uploaded_by.map(str::to_string),
            source_filenames: files
                .iter()
                .map(|f| f.filename.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        };
        tracing::Span::current().record("ingestion_id", metadata.ingestion_id.as_str());

        let metadata_recorded = match self
            .repo
            .append_ingestion_metadata(&tables.metadata_table, &metadata)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(table = %tables.metadata_table, error = %e, "导入元数据写入失败（目标表已替换）");
                false
            }
        };

        info!(
            pipeline = variant.code(),
            table = %tables.data_table,
            total_records,
            valid_records,
            "导入完成"
        );

        IngestionOutcome {
            ingestion_id: metadata.ingestion_id,
            pipeline: variant,
            total_records,
            valid_records,
            updated_at: metadata.ingested_at,
            sheets,
            metadata_recorded,
        }
    }
}
