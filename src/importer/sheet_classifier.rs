// ==========================================
// 兼容性矩阵导入系统 - 工作表分类器
// ==========================================
// 职责: 工作表显示名 → SheetKind（纯函数，全域定义，不会失败）
// 规则: 有序匹配，首个命中即返回；Nik 优先于通用 OS/品牌判定
// ==========================================

use crate::domain::types::SheetKind;

/// 通用关键字组（按优先级排列）
const GENERIC_KEYWORD_GROUPS: &[(SheetKind, &[&str])] = &[
    (SheetKind::OsWindows, &["windows", "win", "win10", "win11"]),
    (SheetKind::OsMacos, &["macos", "mac", "osx"]),
    (SheetKind::LightroomBridge, &["lightroom", "lr", "lrc"]),
    (
        SheetKind::HostAppBridge,
        &["host", "vs", "dfp", "dvp", "filmpack", "viewpoint"],
    ),
    (SheetKind::DeviceRawConverter, &["dpr", "pureraw"]),
];

const NIK_MAC_KEYWORDS: &[&str] = &["mac", "macos", "osx"];
const NIK_WIN_KEYWORDS: &[&str] = &["win", "windows", "win10", "win11"];

/// 规范化表名: 小写、`&` → " and "、非字母数字连续段折叠为单个空格、去首尾空白
pub fn normalize_sheet_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace('&', " and ");
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

/// 关键字命中: 整词相等（"winter" 不算 win）；"os x" 视作 osx
fn has_keyword(normalized: &str, keyword: &str) -> bool {
    if keyword == "osx" && normalized.contains("os x") {
        return true;
    }
    normalized.split(' ').any(|token| token == keyword)
}

fn has_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| has_keyword(normalized, k))
}

/// 工作表分类
///
/// # 返回
/// - Some(SheetKind): 已识别
/// - None: 未识别（编排器静默跳过）
pub fn classify_sheet(sheet_name: &str) -> Option<SheetKind> {
    let normalized = normalize_sheet_name(sheet_name);
    if normalized.is_empty() {
        return None;
    }

    // 1. Nik 表先行判定，避免 "Nik Windows" 落入通用 Windows
    if normalized.contains("nik") {
        if has_any(&normalized, NIK_MAC_KEYWORDS) {
            return Some(SheetKind::PluginOsMac);
        }
        if has_any(&normalized, NIK_WIN_KEYWORDS) {
            return Some(SheetKind::PluginOsWin);
        }
        return Some(SheetKind::PluginCollection);
    }

    // 2. 通用关键字组，固定优先级
    GENERIC_KEYWORD_GROUPS
        .iter()
        .find(|(_, keywords)| has_any(&normalized, keywords))
        .map(|(kind, _)| *kind)
}
