// ==========================================
// 工程项目管理平台 - 值转换器
// ==========================================
// 阶段 2: 单元格 → 类型化字段值
// 类型: TEXT / NUMBER / DATE / ENUM
// 规则: 必填字段转换失败 → 校验错误
//       非必填字段转换失败 → 回退缺省值，不报错
// ==========================================

use crate::domain::import::{CellValue, FieldDefinition, ValidationErrorKind};
use crate::domain::types::{EnumSet, FieldCheck, ValueType};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::synonyms;
use chrono::{Days, NaiveDate};

/// 表格日期序列号纪元（序列号 1 = 1899-12-31，兼容 1900 闰年缺陷）
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

// ==========================================
// FieldValue - 转换后的字段值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Enum(&'static str),
    Absent, // 非必填字段无值（由记录构建器填缺省值）
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&'static str> {
        match self {
            FieldValue::Enum(code) => Some(code),
            _ => None,
        }
    }
}

pub type CoerceResult = Result<FieldValue, ValidationErrorKind>;

// ==========================================
// ValueCoercer
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCoercer;

impl ValueCoercer {
    pub fn new() -> Self {
        Self
    }

    /// 按字段定义转换单元格
    pub fn coerce(&self, def: &FieldDefinition, cell: &CellValue) -> CoerceResult {
        match def.value_type {
            ValueType::Text => self.coerce_text(cell, def.required),
            ValueType::Number => self.coerce_number(cell, def.required, def.check),
            ValueType::Date => self.coerce_date(cell, def.required),
            ValueType::Enum(set) => self.coerce_enum(cell, def.required, set),
        }
    }

    pub fn coerce_text(&self, cell: &CellValue, required: bool) -> CoerceResult {
        let text = DataCleaner.clean_text(&cell.to_text());
        if text.is_empty() && required {
            return Err(ValidationErrorKind::Required);
        }
        Ok(FieldValue::Text(text))
    }

    pub fn coerce_number(&self, cell: &CellValue, required: bool, check: FieldCheck) -> CoerceResult {
        if cell.is_empty() {
            return if required {
                Err(ValidationErrorKind::Required)
            } else {
                Ok(FieldValue::Number(0.0))
            };
        }

        let parsed = match cell {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) => None,
            CellValue::Text(s) => parse_number(s),
            CellValue::Empty => None,
        };

        if !required {
            return Ok(FieldValue::Number(parsed.unwrap_or(0.0)));
        }

        let value = parsed.ok_or(ValidationErrorKind::InvalidNumber)?;
        match check {
            FieldCheck::NonNegative if value < 0.0 => Err(ValidationErrorKind::MustBeNonNegative),
            FieldCheck::Positive if value <= 0.0 => Err(ValidationErrorKind::MustBePositive),
            _ => Ok(FieldValue::Number(value)),
        }
    }

    pub fn coerce_date(&self, cell: &CellValue, required: bool) -> CoerceResult {
        if cell.is_empty() {
            return if required {
                Err(ValidationErrorKind::Required)
            } else {
                Ok(FieldValue::Absent)
            };
        }

        let parsed = match cell {
            CellValue::Number(n) => serial_to_date(*n),
            CellValue::Text(s) => parse_date_text(s),
            CellValue::Empty => None,
        };

        match parsed {
            Some(date) => Ok(FieldValue::Date(date)),
            None if required => Err(ValidationErrorKind::InvalidDate),
            None => Ok(FieldValue::Absent),
        }
    }

    pub fn coerce_enum(&self, cell: &CellValue, required: bool, set: EnumSet) -> CoerceResult {
        let fallback = || match set.default_code() {
            Some(code) => FieldValue::Enum(code),
            None => FieldValue::Absent,
        };

        if cell.is_empty() {
            return if required {
                Err(ValidationErrorKind::Required)
            } else {
                Ok(fallback())
            };
        }

        match synonyms::lookup(set, &cell.to_text()) {
            Some(code) => Ok(FieldValue::Enum(code)),
            None if required => Err(ValidationErrorKind::InvalidEnum),
            None => Ok(fallback()),
        }
    }
}

/// 文本数值解析: 仅保留数字 / '.' / '-' 后按浮点解析
///
/// "1,200,000 đ" → 1200000；"abc" → None
pub fn parse_number(raw: &str) -> Option<f64> {
    let filtered: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    filtered.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// 日期序列号 → 日期（小数部分为时间，舍去）
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

/// 文本日期解析，优先级: DD/MM/YYYY | DD-MM-YYYY → YYYY-MM-DD | YYYY/MM/DD
///
/// 带时间部分（"2024-03-15T08:00:00" / "15/03/2024 08:00"）时只取日期部分
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let date_part = raw
        .trim()
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()?;

    let parts: Vec<&str> = date_part.split(|c: char| c == '/' || c == '-').collect();
    let all_digits = |p: &&str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    if parts.len() != 3 || !parts.iter().all(all_digits) {
        return None;
    }

    let (day, month, year) = if parts[0].len() <= 2 && parts[2].len() == 4 {
        (parts[0], parts[1], parts[2])
    } else if parts[0].len() == 4 && parts[1].len() <= 2 && parts[2].len() <= 2 {
        (parts[2], parts[1], parts[0])
    } else {
        return None;
    };

    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}
