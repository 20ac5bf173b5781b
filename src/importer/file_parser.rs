// ==========================================
// 工程项目管理平台 - 表格读取器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: 工作簿 (.xlsx/.xlsm/.xlsb/.xls/.ods) / CSV (.csv)
// 约束: 只读第一个工作表；首行为表头；全空行剔除
// ==========================================

use crate::domain::import::{CellValue, ParsedSheet, RawRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use chrono::{NaiveDate, NaiveTime};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, instrument};

// ==========================================
// SpreadsheetFormat - 输入格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Workbook, // 由 calamine 自动识别具体工作簿格式
    Csv,
}

impl SpreadsheetFormat {
    /// 根据扩展名判断格式
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(SpreadsheetFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SpreadsheetFormat::Workbook),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    /// 有文件名时按扩展名判断，否则按文件头判断
    pub fn detect(file_name: Option<&str>, bytes: &[u8]) -> ImportResult<Self> {
        match file_name.map(Path::new) {
            Some(path) if path.extension().is_some() => Self::from_path(path),
            _ => Ok(Self::sniff(bytes)),
        }
    }

    /// 根据文件头魔数判断格式（ZIP 容器 / OLE 复合文档 → 工作簿，其余按 CSV）
    pub fn sniff(bytes: &[u8]) -> Self {
        const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
        const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            SpreadsheetFormat::Workbook
        } else {
            SpreadsheetFormat::Csv
        }
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::FileReadError("工作簿无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        let grid: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();

        assemble_sheet(sheet_name, grid)
    }
}

/// calamine 单元格 → CellValue
///
/// 日期单元格按 1900 日期系统序列号数值交给下游
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::DateTime(dt) => CellValue::Number(datetime_serial(dt)),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("{e:?}")),
    }
}

const MS_PER_DAY: f64 = 86_400_000.0;

/// 日期时间单元格 → 1900 日期系统序列号
///
/// 1904 日期系统的工作簿序列号整体少 1462 天，经 as_datetime 换算后统一
fn datetime_serial(dt: &ExcelDateTime) -> f64 {
    if !dt.is_datetime() {
        return dt.as_f64(); // 时长
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).map(|d| d.and_time(NaiveTime::MIN));
    match (dt.as_datetime(), epoch) {
        (Some(value), Some(epoch)) => (value - epoch).num_milliseconds() as f64 / MS_PER_DAY,
        _ => dt.as_f64(),
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let mut grid = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<CellValue> = record
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(value.to_string())
                    }
                })
                .collect();
            grid.push(row);
        }

        assemble_sheet("csv".to_string(), grid)
    }
}

/// 首行转表头，剔除全空数据行
///
/// 行数检查作用于解码后的原始行（表头 + 至少 1 行），在剔除空行之前
fn assemble_sheet(sheet_name: String, grid: Vec<Vec<CellValue>>) -> ImportResult<ParsedSheet> {
    if grid.len() < 2 {
        return Err(ImportError::FileReadError(
            "工作表没有数据行（至少需要表头 + 1 行数据）".to_string(),
        ));
    }

    let mut rows = grid.into_iter();
    let header_row = rows
        .next()
        .ok_or_else(|| ImportError::FileReadError("工作表为空".to_string()))?;

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| {
            cell.to_text()
                .trim_start_matches('\u{feff}')
                .trim()
                .to_string()
        })
        .collect();

    let total = rows.len();
    let data_rows: Vec<RawRow> = rows.map(RawRow::new).filter(|r| !r.is_blank()).collect();
    debug!(
        sheet = %sheet_name,
        dropped_blank_rows = total - data_rows.len(),
        "剔除全空行"
    );

    Ok(ParsedSheet {
        sheet_name,
        headers,
        rows: data_rows,
    })
}

// ==========================================
// SpreadsheetReader - 通用读取器（按格式自动选择）
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetReader;

impl SpreadsheetReader {
    pub fn new() -> Self {
        Self
    }

    /// 解析内存中的表格内容
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn read_bytes(
        &self,
        bytes: &[u8],
        format: SpreadsheetFormat,
    ) -> ImportResult<ParsedSheet> {
        let sheet = match format {
            SpreadsheetFormat::Workbook => ExcelParser.parse_bytes(bytes)?,
            SpreadsheetFormat::Csv => CsvParser.parse_bytes(bytes)?,
        };

        info!(
            sheet = %sheet.sheet_name,
            columns = sheet.headers.len(),
            rows = sheet.rows.len(),
            "表格解析完成"
        );
        Ok(sheet)
    }

    /// 从磁盘读取文件（唯一的异步边界）
    pub async fn read_path<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ParsedSheet> {
        let path = file_path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let format = SpreadsheetFormat::from_path(path)?;

        let bytes = tokio::fs::read(path).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "文件读取完成");

        self.read_bytes(&bytes, format)
    }
}
