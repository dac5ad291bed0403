// ==========================================
// DataNaut 数据中心 - 单元格值解析
// ==========================================
// 职责: 原始单元格（CSV 字符串 / Excel 原生类型）→ 领域类型
// 约定: 每个解析函数同时接受字符串与已类型化输入
//       空值（"" / "-" / "—"）→ None
// ==========================================

use crate::datahub::error::{FieldError, FieldResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 日期字面格式（按顺序尝试，先匹配者生效）
///
/// 注意: DD/MM/YYYY 排在 MM/DD/YYYY 之前，01/02/2025 解析为 2 月 1 日。
pub const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", // 2025-12-20
    "%d.%m.%Y", // 20.12.2025
    "%d/%m/%Y", // 20/12/2025
    "%m/%d/%Y", // 12/20/2025
    "%d-%m-%Y", // 20-12-2025
    "%m-%d-%Y", // 12-20-2025
];

// ISO 日期时间兜底格式
const ISO_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// ==========================================
// CellValue - 原始单元格值
// ==========================================
// CSV 路径只产生 String/Empty；Excel 路径保留原生数字与日期
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// 是否为空白单元格（空值或纯空白字符串）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::String(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Date(d) => write!(f, "{}", d),
            CellValue::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

/// 占位空值："" / "-" / "—"
fn is_placeholder(s: &str) -> bool {
    matches!(s, "" | "-" | "—")
}

/// 解析精确小数
///
/// # 规则
/// - 数字原生值经字符串形式转换（避免二进制浮点误差）
/// - 同时出现 ',' 与 '.' → ',' 视为千分位并删除
/// - 仅出现 ',' → 视为小数点
/// - 内部空白（含不换行空格）一律去除："1 234,56" → 1234.56
pub fn parse_decimal(value: &CellValue) -> FieldResult<Option<Decimal>> {
    match value {
        CellValue::Empty => Ok(None),
        CellValue::Int(i) => Ok(Some(Decimal::from(*i))),
        CellValue::Float(f) => decimal_from_literal(&f.to_string())
            .map(Some)
            .ok_or_else(|| invalid_decimal(value)),
        CellValue::String(raw) => {
            let trimmed = raw.trim();
            if is_placeholder(trimmed) {
                return Ok(None);
            }

            let mut cleaned: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
            if cleaned.contains(',') && cleaned.contains('.') {
                cleaned = cleaned.replace(',', "");
            } else {
                cleaned = cleaned.replace(',', ".");
            }

            decimal_from_literal(&cleaned)
                .map(Some)
                .ok_or_else(|| invalid_decimal(value))
        }
        CellValue::Bool(_) | CellValue::Date(_) | CellValue::DateTime(_) => {
            Err(invalid_decimal(value))
        }
    }
}

fn decimal_from_literal(literal: &str) -> Option<Decimal> {
    Decimal::from_str(literal)
        .or_else(|_| Decimal::from_scientific(literal))
        .ok()
}

fn invalid_decimal(value: &CellValue) -> FieldError {
    FieldError::new(format!("Invalid decimal: '{}'", value))
}

/// 解析日期
///
/// # 规则
/// - 原生日期直接返回；原生日期时间截取日期部分
/// - 字符串按 DATE_FORMATS 顺序尝试，最后兜底 ISO-8601 日期时间
pub fn parse_date(value: &CellValue) -> FieldResult<Option<NaiveDate>> {
    match value {
        CellValue::Empty => Ok(None),
        CellValue::Date(d) => Ok(Some(*d)),
        CellValue::DateTime(dt) => Ok(Some(dt.date())),
        CellValue::String(raw) => {
            let s = raw.trim();
            if is_placeholder(s) {
                return Ok(None);
            }

            DATE_FORMATS
                .iter()
                .filter(|fmt| has_four_digit_year(s, fmt))
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .or_else(|| parse_iso_datetime_date(s))
                .map(Some)
                .ok_or_else(|| FieldError::new(format!("Invalid date: '{}'", s)))
        }
        CellValue::Int(_) | CellValue::Float(_) | CellValue::Bool(_) => {
            Err(FieldError::new(format!("Invalid date: '{}'", value)))
        }
    }
}

/// 年份段必须是 4 位数字（chrono 的 %Y 也接受 1~3 位）
///
/// 格式的分隔符取自第 3 个字符；%Y 开头的格式年份在首段，其余在末段。
fn has_four_digit_year(s: &str, fmt: &str) -> bool {
    let Some(sep) = fmt.chars().nth(2) else {
        return false;
    };
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3 {
        return false;
    }
    let year = if fmt.starts_with("%Y") { parts[0] } else { parts[2] };
    is_four_digits(year)
}

fn is_four_digits(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_iso_datetime_date(s: &str) -> Option<NaiveDate> {
    // ISO 形式均以 YYYY- 开头，紧凑形式为 8 位数字
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }
    if !(s.get(..4).is_some_and(is_four_digits) && s.as_bytes().get(4) == Some(&b'-')) {
        return None;
    }
    ISO_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z")
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// 解析字符串（None → 空串，其余 TRIM）
pub fn parse_str(value: &CellValue) -> String {
    value.to_string().trim().to_string()
}

/// 解析整数
///
/// # 规则
/// - 布尔值 → None（不把 TRUE 当作 1）
/// - 字符串经小数解析后截断，兼容 Excel 导出的 "90.0"
pub fn parse_int(value: &CellValue) -> FieldResult<Option<i64>> {
    match value {
        CellValue::Empty | CellValue::Bool(_) => Ok(None),
        CellValue::Int(i) => Ok(Some(*i)),
        CellValue::Float(_) | CellValue::String(_) => {
            let s = value.to_string().trim().replace(',', ".");
            if s.is_empty() {
                return Ok(None);
            }
            let invalid = || FieldError::new(format!("Invalid integer value: {}", s));
            let decimal = decimal_from_literal(&s).ok_or_else(invalid)?;
            i64::try_from(decimal.trunc()).map(Some).map_err(|_| invalid())
        }
        CellValue::Date(_) | CellValue::DateTime(_) => Err(FieldError::new(format!(
            "Invalid integer value: {}",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::from(v)
    }

    fn dec(v: &str) -> Decimal {
        Decimal::from_str(v).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_decimal_separators() {
        assert_eq!(parse_decimal(&s("1,234.56")).unwrap(), Some(dec("1234.56")));
        assert_eq!(parse_decimal(&s("1 234,56")).unwrap(), Some(dec("1234.56")));
        assert_eq!(parse_decimal(&s("12,5")).unwrap(), Some(dec("12.5")));
        assert_eq!(parse_decimal(&s(" 42 ")).unwrap(), Some(dec("42")));
        assert_eq!(parse_decimal(&s("1\u{a0}000.50")).unwrap(), Some(dec("1000.50")));
    }

    #[test]
    fn test_parse_decimal_empty_placeholders() {
        assert_eq!(parse_decimal(&s("")).unwrap(), None);
        assert_eq!(parse_decimal(&s("-")).unwrap(), None);
        assert_eq!(parse_decimal(&s("—")).unwrap(), None);
        assert_eq!(parse_decimal(&CellValue::Empty).unwrap(), None);
    }

    #[test]
    fn test_parse_decimal_native_numbers() {
        assert_eq!(parse_decimal(&CellValue::Int(90)).unwrap(), Some(dec("90")));
        assert_eq!(parse_decimal(&CellValue::Float(0.1)).unwrap(), Some(dec("0.1")));
        assert_eq!(
            parse_decimal(&CellValue::Float(1234.56)).unwrap(),
            Some(dec("1234.56"))
        );
    }

    #[test]
    fn test_parse_decimal_invalid() {
        let err = parse_decimal(&s("abc")).unwrap_err();
        assert_eq!(err.message, "Invalid decimal: 'abc'");
        assert!(parse_decimal(&s("1,234,567")).is_err());
        assert!(parse_decimal(&CellValue::Bool(true)).is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date(&s("20.12.2025")).unwrap(), Some(ymd(2025, 12, 20)));
        assert_eq!(parse_date(&s("2025-12-20")).unwrap(), Some(ymd(2025, 12, 20)));
        assert_eq!(parse_date(&s("20/12/2025")).unwrap(), Some(ymd(2025, 12, 20)));
        assert_eq!(parse_date(&s("12/20/2025")).unwrap(), Some(ymd(2025, 12, 20)));
        assert_eq!(parse_date(&s("20-12-2025")).unwrap(), Some(ymd(2025, 12, 20)));
        assert_eq!(parse_date(&s("12-20-2025")).unwrap(), Some(ymd(2025, 12, 20)));
    }

    #[test]
    fn test_parse_date_day_first_wins_when_ambiguous() {
        assert_eq!(parse_date(&s("01/02/2025")).unwrap(), Some(ymd(2025, 2, 1)));
    }

    #[test]
    fn test_parse_date_iso_fallback_and_native() {
        assert_eq!(
            parse_date(&s("2025-12-19 00:00:00")).unwrap(),
            Some(ymd(2025, 12, 19))
        );
        assert_eq!(
            parse_date(&s("2025-12-19T08:30:00+02:00")).unwrap(),
            Some(ymd(2025, 12, 19))
        );
        let dt = ymd(2025, 3, 4).and_hms_opt(13, 0, 0).unwrap();
        assert_eq!(parse_date(&CellValue::DateTime(dt)).unwrap(), Some(ymd(2025, 3, 4)));
        assert_eq!(
            parse_date(&CellValue::Date(ymd(2025, 3, 4))).unwrap(),
            Some(ymd(2025, 3, 4))
        );
    }

    #[test]
    fn test_parse_date_empty_and_invalid() {
        assert_eq!(parse_date(&s("")).unwrap(), None);
        assert_eq!(parse_date(&s("-")).unwrap(), None);
        assert_eq!(parse_date(&s("—")).unwrap(), None);
        let err = parse_date(&s("31/31/2025")).unwrap_err();
        assert_eq!(err.message, "Invalid date: '31/31/2025'");
        assert!(parse_date(&CellValue::Int(45000)).is_err());
    }

    #[test]
    fn test_parse_date_rejects_short_years() {
        for raw in ["20.12.25", "01/02/25", "20-12-25", "12/20/025", "25-12-20", "251220"] {
            let err = parse_date(&s(raw)).unwrap_err();
            assert_eq!(err.message, format!("Invalid date: '{}'", raw));
        }
        assert!(parse_date(&s("20-12-25 10:00")).is_err());
        assert_eq!(parse_date(&s("20.12.2025")).unwrap(), Some(ymd(2025, 12, 20)));
        assert_eq!(parse_date(&s("12-20-2025")).unwrap(), Some(ymd(2025, 12, 20)));
        assert_eq!(parse_date(&s("20251220")).unwrap(), Some(ymd(2025, 12, 20)));
    }

    #[test]
    fn test_parse_str() {
        assert_eq!(parse_str(&CellValue::Empty), "");
        assert_eq!(parse_str(&s("  Acme  ")), "Acme");
        assert_eq!(parse_str(&CellValue::Int(7)), "7");
        assert_eq!(parse_str(&CellValue::Float(12345.0)), "12345");
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(&s("90.0")).unwrap(), Some(90));
        assert_eq!(parse_int(&s("90")).unwrap(), Some(90));
        assert_eq!(parse_int(&CellValue::Int(60)).unwrap(), Some(60));
        assert_eq!(parse_int(&CellValue::Float(120.0)).unwrap(), Some(120));
        assert_eq!(parse_int(&CellValue::Bool(true)).unwrap(), None);
        assert_eq!(parse_int(&s("")).unwrap(), None);
        assert_eq!(parse_int(&s("   ")).unwrap(), None);
        let err = parse_int(&s("ninety")).unwrap_err();
        assert_eq!(err.message, "Invalid integer value: ninety");
    }
}
