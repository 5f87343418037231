// ==========================================
// 兼容性矩阵导入系统 - 工作簿读取器
// ==========================================
// 职责: 上传字节 → Workbook（保留工作表声明顺序、绝对行列坐标）
// 支持: Excel 系列 (.xlsx/.xlsm/.xlsb/.xls/.ods) / CSV (.csv，单表)
// ==========================================

use crate::domain::workbook::{Cell, Sheet, UploadedFile, Workbook};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::io::Cursor;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 支持的 Excel 系列扩展名
pub const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

// ==========================================
// Trait: WorkbookReader
// ==========================================
pub trait WorkbookReader {
    /// 将上传文件解码为工作簿
    fn read(&self, file: &UploadedFile) -> ImportResult<Workbook>;
}

// ==========================================
// Excel Reader 实现
// ==========================================
pub struct ExcelWorkbookReader;

impl WorkbookReader for ExcelWorkbookReader {
    fn read(&self, file: &UploadedFile) -> ImportResult<Workbook> {
        let parse_error = |message: String| ImportError::WorkbookParseError {
            file: file.filename.clone(),
            message,
        };

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(file.bytes.clone()))
            .map_err(|e| parse_error(e.to_string()))?;

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| parse_error(format!("sheet '{}': {}", sheet_name, e)))?;
            sheets.push(Sheet::new(sheet_name, range_to_rows(&range)));
        }

        Ok(Workbook::new(file.filename.clone(), sheets))
    }
}

/// 区域 → 绝对坐标网格（区域不从 A1 开始时，前导行/列补 Null）
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let (start_row, start_col) = match range.start() {
        Some((row, col)) => (row as usize, col as usize),
        None => return Vec::new(),
    };

    let padding = std::iter::repeat(Cell::Null).take(start_col);
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    rows.extend(range.rows().map(|row| {
        padding
            .clone()
            .chain(row.iter().map(convert_cell))
            .collect::<Vec<Cell>>()
    }));
    rows
}

/// calamine 单元格 → Cell
fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Null),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Excel 日期序列号 → NaiveDateTime（1899-12-30 纪元）
///
/// 超出 chrono 可表示范围的序列号返回 None（单元格按空处理）
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    // f64 → i64 转换会饱和到 i64::MIN/MAX，越界值由 try_milliseconds / checked_add_signed 拒绝
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::try_milliseconds(millis)?)
}

// ==========================================
// CSV Reader 实现
// ==========================================
// CSV 视作单表工作簿，表名取文件名主干（Windows.csv → "Windows"）
pub struct CsvWorkbookReader;

impl WorkbookReader for CsvWorkbookReader {
    fn read(&self, file: &UploadedFile) -> ImportResult<Workbook> {
        let bytes = file.bytes.strip_prefix(UTF8_BOM).unwrap_or(&file.bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| ImportError::WorkbookParseError {
                file: file.filename.clone(),
                message: e.to_string(),
            })?;
            rows.push(
                record
                    .iter()
                    .map(|value| {
                        if value.trim().is_empty() {
                            Cell::Null
                        } else {
                            Cell::text(value)
                        }
                    })
                    .collect(),
            );
        }

        Ok(Workbook::new(
            file.filename.clone(),
            vec![Sheet::new(file.stem(), rows)],
        ))
    }
}

// ==========================================
// 通用读取器（根据扩展名自动选择）
// ==========================================
pub struct UniversalWorkbookReader;

impl WorkbookReader for UniversalWorkbookReader {
    fn read(&self, file: &UploadedFile) -> ImportResult<Workbook> {
        let ext = file.extension();
        match ext.as_str() {
            "csv" => CsvWorkbookReader.read(file),
            e if EXCEL_EXTENSIONS.contains(&e) => ExcelWorkbookReader.read(file),
            _ => Err(ImportError::UnsupportedFormat(if ext.is_empty() {
                file.filename.clone()
            } else {
                ext
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_upload(name: &str, content: &str) -> UploadedFile {
        UploadedFile::new(name, content.as_bytes().to_vec())
    }

    /// 两张表: Notes（仅 B3 有值）+ Nik Windows（数字/布尔/日期单元格）
    fn xlsx_upload(name: &str) -> UploadedFile {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook as XlsxWorkbook};

        let mut book = XlsxWorkbook::new();
        let notes = book.add_worksheet();
        notes.set_name("Notes").unwrap();
        notes.write_string(2, 1, "see matrix").unwrap();

        let nik = book.add_worksheet();
        nik.set_name("Nik Windows").unwrap();
        nik.write_string(0, 0, "Plugin").unwrap();
        nik.write_string(0, 1, "Windows 10\n64-bit").unwrap();
        nik.write_string(0, 2, "Windows 11").unwrap();
        nik.write_string(1, 0, "Nik Silver Efex 7").unwrap();
        nik.write_number(1, 1, 5.5).unwrap();
        nik.write_boolean(1, 2, true).unwrap();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        nik.write_datetime_with_format(
            2,
            1,
            &ExcelDateTime::from_ymd(2024, 1, 1).unwrap(),
            &date_format,
        )
        .unwrap();

        UploadedFile::new(name, book.save_to_buffer().unwrap())
    }

    #[test]
    fn test_csv_single_sheet_named_by_stem() {
        let file = csv_upload(
            "Windows.csv",
            "Software,Windows 10,Windows 11\nDxO PhotoLab 9,✓,\n",
        );

        let workbook = UniversalWorkbookReader.read(&file).unwrap();

        assert_eq!(workbook.source_name, "Windows.csv");
        assert_eq!(workbook.sheets.len(), 1);
        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.name, "Windows");
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.cell(1, 1), &Cell::text("✓"));
        assert_eq!(sheet.cell(1, 2), &Cell::Null);
    }

    #[test]
    fn test_csv_bom_stripped_and_multiline_kept() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("Software,\"Windows 10\n64-bit\"\nDxO PureRAW 4,yes\n".as_bytes());
        let file = UploadedFile::new("os.csv", bytes);

        let workbook = CsvWorkbookReader.read(&file).unwrap();
        let sheet = &workbook.sheets[0];

        assert_eq!(sheet.cell(0, 0), &Cell::text("Software"));
        assert_eq!(sheet.cell(0, 1), &Cell::text("Windows 10\n64-bit"));
    }

    #[test]
    fn test_csv_ragged_rows_allowed() {
        let file = csv_upload("Nik macOS.csv", "Plugin,Sonoma,Sequoia\nPlugins 7\nNik Silver Efex,✓\n");
        let workbook = CsvWorkbookReader.read(&file).unwrap();
        assert_eq!(workbook.sheets[0].row_count(), 3);
        assert_eq!(workbook.sheets[0].cell(1, 2), &Cell::Null);
    }

    #[test]
    fn test_csv_invalid_utf8_is_parse_error() {
        let file = UploadedFile::new("broken.csv", b"Software,\xFF\xFE\n".to_vec());
        let err = UniversalWorkbookReader.read(&file).unwrap_err();
        assert!(matches!(err, ImportError::WorkbookParseError { ref file, .. } if file == "broken.csv"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_xlsx_sheets_in_declaration_order() {
        let workbook = UniversalWorkbookReader.read(&xlsx_upload("matrix.xlsx")).unwrap();

        let names: Vec<_> = workbook.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Notes", "Nik Windows"]);
    }

    #[test]
    fn test_xlsx_offset_range_padded_with_null() {
        let workbook = ExcelWorkbookReader.read(&xlsx_upload("matrix.xlsx")).unwrap();
        let notes = &workbook.sheets[0];

        // 区域从 B3 开始，绝对坐标不变
        assert_eq!(notes.row_count(), 3);
        assert_eq!(notes.cell(0, 0), &Cell::Null);
        assert_eq!(notes.cell(2, 0), &Cell::Null);
        assert_eq!(notes.cell(2, 1), &Cell::text("see matrix"));
    }

    #[test]
    fn test_xlsx_cell_conversion() {
        let workbook = ExcelWorkbookReader.read(&xlsx_upload("matrix.xlsx")).unwrap();
        let nik = &workbook.sheets[1];

        assert_eq!(nik.cell(0, 1), &Cell::text("Windows 10\n64-bit"));
        assert_eq!(nik.cell(1, 1), &Cell::Number(5.5));
        assert_eq!(nik.cell(1, 2), &Cell::text("TRUE"));
        assert!(matches!(
            nik.cell(2, 1),
            Cell::Date(dt) if dt.to_string() == "2024-01-01 00:00:00"
        ));
        assert_eq!(nik.cell(2, 2), &Cell::Null);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = csv_upload("matrix.pdf", "whatever");
        let err = UniversalWorkbookReader.read(&file).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(ref e) if e == "pdf"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_corrupt_excel_is_input_error() {
        let file = UploadedFile::new("matrix.xlsx", b"not a zip archive".to_vec());
        let err = UniversalWorkbookReader.read(&file).unwrap_err();
        assert!(matches!(err, ImportError::WorkbookParseError { ref file, .. } if file == "matrix.xlsx"));
    }

    #[test]
    fn test_excel_serial_conversion() {
        let dt = excel_serial_to_datetime(45292.5).unwrap();
        assert_eq!(dt.to_string(), "2024-01-01 12:00:00");
        assert_eq!(excel_serial_to_datetime(f64::NAN), None);
    }

    #[test]
    fn test_excel_serial_out_of_range_is_none() {
        assert_eq!(excel_serial_to_datetime(-1.0e300), None);
        assert_eq!(excel_serial_to_datetime(1.0e300), None);
        assert_eq!(excel_serial_to_datetime(f64::NEG_INFINITY), None);
        // 纪元前的小负数仍可表示
        let dt = excel_serial_to_datetime(-1.0).unwrap();
        assert_eq!(dt.to_string(), "1899-12-29 00:00:00");
    }

    #[test]
    fn test_out_of_range_date_cell_becomes_null() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};
        let cell = Data::DateTime(ExcelDateTime::new(-1.0e300, ExcelDateTimeType::DateTime, false));
        assert_eq!(convert_cell(&cell), Cell::Null);
    }
}
