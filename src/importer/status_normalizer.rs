// ==========================================
// 兼容性矩阵导入系统 - 状态规范化器
// ==========================================
// 职责: 原始单元格 → 规范状态字符串
// 约束: 永不失败；意外类型降级为 "not compatible"
// 约束: 未命中任何规则的自由文本原样保留（如 "64-bit only"）
// ==========================================

use crate::domain::workbook::Cell;
use once_cell::sync::Lazy;
use regex::Regex;

pub const STATUS_COMPATIBLE: &str = "compatible";
pub const STATUS_NOT_COMPATIBLE: &str = "not compatible";
pub const STATUS_BAYER_AND_XTRANS: &str = "compatible: Bayer + X-Trans";
pub const STATUS_XTRANS_ONLY: &str = "compatible: X-Trans only";
pub const STATUS_BAYER_ONLY: &str = "compatible: Bayer only";

/// 勾选符号（精确匹配）
const CHECK_MARKS: &[&str] = &["✓", "✔", "✔️", "☑", "☑️", "✅", "√", "🗸"];

/// 叉号符号（精确匹配）
const CROSS_MARKS: &[&str] = &["✕", "✗", "✘", "×", "✖", "✖️", "❌", "☒", "⨯"];

/// 空值占位（横线/破折号）
const EMPTY_MARKS: &[&str] = &["", "-", "—", "–"];

/// Bayer 及两种常见拼写错误（剥离后比较）
const BAYER_TOKENS: &[&str] = &["bayer", "bayr", "beyer"];

/// X-Trans 模糊片段（剥离后比较）
const XTRANS_TOKENS: &[&str] = &["xtrans", "xtrns"];

// 严格 "X-Trans" 形态（未剥离文本）
static XTRANS_STRICT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^x[\s_-]*trans(?:\s+only)?$").expect("valid regex"));

// ==========================================
// SensorContext - 传感器上下文（降噪管道）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorContext {
    /// 勾选 → "compatible"
    #[default]
    Single,
    /// 勾选 → "compatible: Bayer + X-Trans"
    Dual,
}

enum Mode {
    Standard,
    SensorAware(SensorContext),
}

/// 规范化状态（通用管道）
pub fn normalize_status(cell: &Cell) -> String {
    normalize(cell, Mode::Standard)
}

/// 规范化状态（传感器感知，降噪管道）
pub fn normalize_sensor_status(cell: &Cell, context: SensorContext) -> String {
    normalize(cell, Mode::SensorAware(context))
}

fn normalize(cell: &Cell, mode: Mode) -> String {
    let raw = match cell {
        // 1. 空值
        Cell::Null => return STATUS_NOT_COMPATIBLE.to_string(),
        // 2. 数值原样字符串化
        Cell::Number(n) => return n.to_string(),
        // 意外类型降级
        Cell::Date(_) => return STATUS_NOT_COMPATIBLE.to_string(),
        Cell::Text(s) => s,
    };

    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();

    // 3. 勾选 / yes
    if CHECK_MARKS.contains(&trimmed) || lowered == "yes" {
        return match mode {
            Mode::SensorAware(SensorContext::Dual) => STATUS_BAYER_AND_XTRANS.to_string(),
            _ => STATUS_COMPATIBLE.to_string(),
        };
    }

    // 4. 叉号 / no / 空占位
    if CROSS_MARKS.contains(&trimmed) || lowered == "no" || EMPTY_MARKS.contains(&trimmed) {
        return STATUS_NOT_COMPATIBLE.to_string();
    }

    // 5. 传感器族模糊匹配
    if let Mode::SensorAware(_) = mode {
        if let Some(status) = match_sensor_family(trimmed) {
            return status.to_string();
        }
    }

    // 6. 自由文本原样保留
    trimmed.to_string()
}

/// 去空格/连字符/下划线并小写
fn strip_separators(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn match_sensor_family(text: &str) -> Option<&'static str> {
    let stripped = strip_separators(text);
    let xtrans = XTRANS_TOKENS.iter().any(|t| stripped.contains(t)) || XTRANS_STRICT_RE.is_match(text);
    let bayer = BAYER_TOKENS.iter().any(|t| stripped.contains(t));

    match (bayer, xtrans) {
        (true, true) => Some(STATUS_BAYER_AND_XTRANS),
        (false, true) => Some(STATUS_XTRANS_ONLY),
        (true, false) => Some(STATUS_BAYER_ONLY),
        (false, false) => None,
    }
}
