// ==========================================
// 兼容性矩阵导入系统 - 记录去重与校验
// ==========================================
// 职责: 按身份键去重（首次出现保留），随后剔除必填字段缺失的记录
// 约束: 顺序敏感（上传顺序 → 工作表声明顺序），输出保持生产顺序
// ==========================================

use crate::domain::compatibility::MatrixRecord;
use std::collections::HashSet;

/// 去重结果（含统计，供日志使用）
#[derive(Debug, Clone, PartialEq)]
pub struct DedupOutcome<R> {
    pub records: Vec<R>,
    pub duplicates_dropped: usize,
    pub incomplete_dropped: usize,
}

/// 去重 + 校验
pub fn dedupe_and_validate<R: MatrixRecord>(records: Vec<R>) -> Vec<R> {
    dedupe_with_stats(records).records
}

/// 去重 + 校验（附统计）
pub fn dedupe_with_stats<R: MatrixRecord>(records: Vec<R>) -> DedupOutcome<R> {
    let total = records.len();
    let mut seen: HashSet<R::Key> = HashSet::with_capacity(total);

    // 1. 首次出现保留
    let unique: Vec<R> = records
        .into_iter()
        .filter(|record| seen.insert(record.identity_key()))
        .collect();
    let duplicates_dropped = total - unique.len();

    // 2. 必填字段校验
    let unique_count = unique.len();
    let valid: Vec<R> = unique.into_iter().filter(R::is_complete).collect();

    DedupOutcome {
        incomplete_dropped: unique_count - valid.len(),
        duplicates_dropped,
        records: valid,
    }
}
