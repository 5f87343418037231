// ==========================================
// 兼容性矩阵导入系统 - 工作簿领域模型
// ==========================================
// 职责: 上传工作簿的只读内存表示（按请求创建，运行结束即丢弃）
// 约束: 单元格按绝对 (row, column) 0-based 索引寻址
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 越界单元格统一视为空
static NULL_CELL: Cell = Cell::Null;

// ==========================================
// Cell - 单元格
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Null,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl Cell {
    /// 便捷构造文本单元格
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// 标签用文本: Text 去首尾空白，Number 字符串化，其余为 None
    ///
    /// 空白文本返回 None，调用方据此跳过行/列。
    pub fn label_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Cell::Number(n) if n.is_finite() => Some(n.to_string()),
            _ => None,
        }
    }
}

// ==========================================
// Sheet - 工作表
// ==========================================
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// 从文本网格构造（测试与 CSV 共用）；空字符串视为 Null
    pub fn from_text_rows<S: AsRef<str>>(name: impl Into<String>, rows: &[Vec<S>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|value| {
                        let value = value.as_ref();
                        if value.is_empty() {
                            Cell::Null
                        } else {
                            Cell::text(value)
                        }
                    })
                    .collect()
            })
            .collect();
        Self::new(name, rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 读取单元格，越界返回 Null
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL_CELL)
    }
}

/// 行内取单元格，越界返回 Null
pub fn row_cell(row: &[Cell], column: usize) -> &Cell {
    row.get(column).unwrap_or(&NULL_CELL)
}

// ==========================================
// Workbook - 工作簿
// ==========================================
// 说明: sheets 保持声明顺序（去重 first-seen-wins 依赖该顺序）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub source_name: String,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(source_name: impl Into<String>, sheets: Vec<Sheet>) -> Self {
        Self {
            source_name: source_name.into(),
            sheets,
        }
    }

    /// 按精确名称查找工作表（仅去首尾空白）
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name.trim() == name)
    }
}

// ==========================================
// UploadedFile - 上传文件
// ==========================================
// 传输层无关的上传单元（文件名 + 原始字节）
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// 从磁盘读取（CLI 使用）
    pub fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(Self { filename, bytes })
    }

    /// 小写扩展名（无扩展名返回空串）
    pub fn extension(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }

    /// 文件名主干（CSV 单表工作簿的表名）
    pub fn stem(&self) -> String {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_label_text() {
        assert_eq!(Cell::text("  Windows 11 \n").label_text(), Some("Windows 11".to_string()));
        assert_eq!(Cell::text("   ").label_text(), None);
        assert_eq!(Cell::Number(2024.0).label_text(), Some("2024".to_string()));
        assert_eq!(Cell::Null.label_text(), None);
    }

    #[test]
    fn test_sheet_cell_out_of_bounds() {
        let sheet = Sheet::from_text_rows("Windows", &[vec!["Software", "Windows 11"]]);
        assert_eq!(sheet.cell(0, 1), &Cell::text("Windows 11"));
        assert_eq!(sheet.cell(0, 9), &Cell::Null);
        assert_eq!(sheet.cell(5, 0), &Cell::Null);
    }

    #[test]
    fn test_uploaded_file_extension_and_stem() {
        let file = UploadedFile::new("Nik macOS.CSV", Vec::new());
        assert_eq!(file.extension(), "csv");
        assert_eq!(file.stem(), "Nik macOS");

        let file = UploadedFile::new("matrix", Vec::new());
        assert_eq!(file.extension(), "");
    }
}
