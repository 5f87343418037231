// ==========================================
// 兼容性矩阵导入系统 - 名称/版本解析器
// ==========================================
// 职责: 自由文本标签 → { name, version }
// 规则: 固定顺序的模式级联，首个成功即返回；纯函数（去重键稳定性依赖于此）
// ==========================================

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 已知无版本号产品名（大小写不敏感，整串匹配）
const UNVERSIONED_PRODUCTS: &[&str] = &[
    "adobe lightroom classic",
    "lightroom classic",
    "adobe lightroom",
    "lightroom",
    "adobe photoshop",
    "photoshop",
    "adobe photoshop elements",
    "photoshop elements",
    "adobe bridge",
    "capture one",
    "affinity photo",
    "apple photos",
    "nik collection",
];

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

// <产品词> <点分版本号> [可选尾随限定语]
static STRUCTURED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[^\d\s][^\d]*?)\s+(?P<version>v?\d+(?:\.\d+)+)(?P<qualifier>\s+\S.*)?$")
        .expect("valid regex")
});

// 品牌前缀 + 1~2 个词 + 版本号
static BRANDED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>(?i:dxo|nik|adobe|apple|microsoft|affinity|capture)\s+\S+(?:\s+\S+)?)\s+(?P<version>\d+(?:\.\d+)*)$",
    )
    .expect("valid regex")
});

// 通用兜底: 末尾 "<词> <数字>"
static TRAILING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>.+?)\s+(?P<version>\d+(?:\.\d+)*)$").expect("valid regex")
});

// ==========================================
// ParsedSoftware - 解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedSoftware {
    pub name: String,
    pub version: String, // 可为空
}

impl ParsedSoftware {
    fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// 空白折叠 + 去首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// 解析软件名与版本
///
/// # 级联顺序
/// 1. 已知无版本产品名 → version = ""
/// 2. 结构化 `<产品> <点分版本> [限定语]` → 限定语原样并入 version
/// 3. 品牌前缀 + 1~2 词 + 版本号
/// 4. 通用末尾数字拆分
/// 5. 整串作为 name，version = ""
pub fn parse_software(text: &str) -> ParsedSoftware {
    let normalized = collapse_whitespace(text);
    if normalized.is_empty() {
        return ParsedSoftware::new("", "");
    }

    let lowered = normalized.to_lowercase();
    if UNVERSIONED_PRODUCTS.contains(&lowered.as_str()) {
        return ParsedSoftware::new(normalized, "");
    }

    if let Some(caps) = STRUCTURED_RE.captures(&normalized) {
        let name = caps["name"].trim();
        let mut version = caps["version"].to_string();
        if let Some(qualifier) = caps.name("qualifier") {
            version.push_str(qualifier.as_str());
        }
        return ParsedSoftware::new(name, version);
    }

    if let Some(caps) = BRANDED_RE.captures(&normalized) {
        return ParsedSoftware::new(caps["name"].trim(), &caps["version"]);
    }

    if let Some(caps) = TRAILING_NUMBER_RE.captures(&normalized) {
        return ParsedSoftware::new(caps["name"].trim(), &caps["version"]);
    }

    ParsedSoftware::new(normalized, "")
}
