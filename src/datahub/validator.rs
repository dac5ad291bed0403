// ==========================================
// DataNaut 数据中心 - 校验引擎
// ==========================================
// 职责: RawRow + DatasetSpec → ValidationResult
// 约定: 全部行都会被尝试，行级错误不中断批次
//       clean_rows 与输入行一一对应（同长度、同顺序）
// ==========================================

use crate::datahub::dataset_spec::{CleanRow, DatasetSpec};
use crate::datahub::file_parser::RawRow;
use crate::datahub::header::normalize_header;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

pub const REQUIRED_VALUE_MISSING: &str = "Required value is missing.";

/// 行级校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrorItem {
    /// 1-based，不含表头
    pub row: usize,
    /// 标准字段名
    pub column: String,
    pub message: String,
}

impl ValidationErrorItem {
    pub fn new(row: usize, column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
            message: message.into(),
        }
    }
}

/// 校验结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    pub clean_rows: Vec<CleanRow>,
    pub errors: Vec<ValidationErrorItem>,
    pub warnings: Vec<String>,
    pub headers_in_file: Vec<String>,
}

impl ValidationResult {
    /// 含错误的行号集合
    pub fn rows_with_errors(&self) -> HashSet<usize> {
        self.errors.iter().map(|e| e.row).collect()
    }
}

/// 按数据集声明校验并转换原始行
///
/// # 参数
/// - raw_rows: 读取器输出的原始行
/// - headers_in_file: 文件原始表头（诊断用，同时决定批次级警告）
/// - spec: 目标数据集声明
///
/// # 返回
/// ValidationResult（clean_rows.len() == raw_rows.len()）
pub fn validate_rows(
    raw_rows: &[RawRow],
    headers_in_file: &[String],
    spec: &DatasetSpec,
) -> ValidationResult {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    // 文件表头 → 已映射字段 / 未知列
    let mut mapped_fields: HashSet<&'static str> = HashSet::new();
    let mut unknown_columns: BTreeSet<String> = BTreeSet::new();
    for header in headers_in_file {
        let key = normalize_header(header);
        match spec.field_for(&key) {
            Some(field) => {
                mapped_fields.insert(field);
            }
            None if !key.is_empty() => {
                unknown_columns.insert(key);
            }
            None => {}
        }
    }

    for required in spec.required {
        if !mapped_fields.contains(required) {
            warnings.push(format!(
                "Missing required column (or alias) in file: {}",
                required
            ));
        }
    }

    if !unknown_columns.is_empty() && !spec.allow_unknown_columns {
        let listed: Vec<&str> = unknown_columns.iter().map(String::as_str).collect();
        warnings.push(format!(
            "Unknown columns will be ignored: {}",
            listed.join(", ")
        ));
    }

    let mut clean_rows = Vec::with_capacity(raw_rows.len());
    for (idx, raw) in raw_rows.iter().enumerate() {
        let row_number = idx + 1;
        let mut clean = CleanRow::new();

        for (raw_key, raw_value) in raw.iter() {
            let Some(field) = spec.field_for(&normalize_header(raw_key)) else {
                continue;
            };

            match spec.converter(field).convert(raw_value) {
                Ok(value) => clean.insert(field, value),
                Err(e) => errors.push(ValidationErrorItem::new(row_number, field, e.message)),
            }
        }

        for required in spec.required {
            if clean.is_missing(required) {
                errors.push(ValidationErrorItem::new(
                    row_number,
                    *required,
                    REQUIRED_VALUE_MISSING,
                ));
            }
        }

        clean_rows.push(clean);
    }

    ValidationResult {
        clean_rows,
        errors,
        warnings,
        headers_in_file: headers_in_file.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datahub::dataset_spec::{
        FieldValue, CONTRACTS_SPEC, COST_CENTERS_SPEC, INVOICES_SPEC,
    };
    use crate::datahub::value_parser::CellValue;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|h| h.to_string()).collect()
    }

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_cost_centers_missing_code_row() {
        let hdrs = headers(&["code", "name", "business_unit"]);
        let rows = vec![
            row(&[("code", "CC1"), ("name", "Ops"), ("business_unit", "IT")]),
            row(&[("code", ""), ("name", "Finance"), ("business_unit", "")]),
            row(&[("code", "CC3"), ("name", "Sales"), ("business_unit", "")]),
        ];

        let result = validate_rows(&rows, &hdrs, &COST_CENTERS_SPEC);

        assert_eq!(result.clean_rows.len(), 3);
        assert_eq!(
            result.errors,
            vec![ValidationErrorItem::new(2, "code", REQUIRED_VALUE_MISSING)]
        );
        assert!(result.warnings.is_empty());
        assert_eq!(result.headers_in_file, hdrs);
    }

    #[test]
    fn test_aliases_and_header_variants() {
        let hdrs = headers(&["Cost-Center Code", " COST CENTER NAME ", "BU"]);
        let rows = vec![row(&[
            ("Cost-Center Code", " CC9 "),
            (" COST CENTER NAME ", "Treasury"),
            ("BU", "Finance"),
        ])];

        let result = validate_rows(&rows, &hdrs, &COST_CENTERS_SPEC);

        assert!(result.errors.is_empty());
        let clean = &result.clean_rows[0];
        assert_eq!(clean.text("code"), Some("CC9".to_string()));
        assert_eq!(clean.text("name"), Some("Treasury".to_string()));
        assert_eq!(clean.text("business_unit"), Some("Finance".to_string()));
    }

    #[test]
    fn test_blank_required_value_single_error() {
        let hdrs = headers(&["code", "name"]);
        let rows = vec![row(&[("code", "CC1"), ("name", "   ")])];

        let result = validate_rows(&rows, &hdrs, &COST_CENTERS_SPEC);

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 1);
        assert_eq!(result.errors[0].column, "name");
        assert_eq!(result.clean_rows[0].get("name"), Some(&FieldValue::Str(String::new())));
    }

    #[test]
    fn test_conversion_error_leaves_field_absent_and_continues() {
        let hdrs = headers(&["vendor_name", "contract_name", "annual_value", "end_date"]);
        let rows = vec![
            row(&[
                ("vendor_name", "Acme"),
                ("contract_name", "Feed"),
                ("annual_value", "lots"),
                ("end_date", "31/31/2025"),
            ]),
            row(&[
                ("vendor_name", "Acme"),
                ("contract_name", "Terminal"),
                ("annual_value", "1 234,50"),
                ("end_date", "31.12.2025"),
            ]),
        ];

        let result = validate_rows(&rows, &hdrs, &CONTRACTS_SPEC);

        assert_eq!(result.clean_rows.len(), 2);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(|e| e.row == 1));
        assert_eq!(result.errors[0].message, "Invalid decimal: 'lots'");
        assert!(!result.clean_rows[0].contains("annual_value"));
        assert!(!result.clean_rows[0].contains("end_date"));
        assert_eq!(
            result.clean_rows[1].decimal("annual_value"),
            Some(Decimal::from_str("1234.50").unwrap())
        );
    }

    #[test]
    fn test_failed_required_conversion_reports_both() {
        let hdrs = headers(&[
            "vendor_name",
            "invoice_number",
            "invoice_date",
            "currency",
            "total_amount",
        ]);
        let rows = vec![row(&[
            ("vendor_name", "Acme"),
            ("invoice_number", "INV-1"),
            ("invoice_date", "2025-01-15"),
            ("currency", "EUR"),
            ("total_amount", "abc"),
        ])];

        let result = validate_rows(&rows, &hdrs, &INVOICES_SPEC);

        let columns: Vec<&str> = result.errors.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(columns, vec!["total_amount", "total_amount"]);
        assert_eq!(result.errors[1].message, REQUIRED_VALUE_MISSING);
    }

    #[test]
    fn test_warnings_missing_required_then_unknown() {
        let hdrs = headers(&["contract", "Zeta Col", "alpha", "", "alpha"]);
        let rows = vec![row(&[("contract", "Feed"), ("Zeta Col", "x"), ("alpha", "y")])];

        let result = validate_rows(&rows, &hdrs, &CONTRACTS_SPEC);

        assert_eq!(
            result.warnings,
            vec![
                "Missing required column (or alias) in file: vendor_name".to_string(),
                "Unknown columns will be ignored: alpha, zeta_col".to_string(),
            ]
        );
        // 行级: vendor_name 缺失
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].column, "vendor_name");
    }

    #[test]
    fn test_unknown_columns_silent_when_allowed() {
        let hdrs = headers(&["code", "name", "extra"]);
        let rows = vec![row(&[("code", "A"), ("name", "B"), ("extra", "C")])];

        let result = validate_rows(&rows, &hdrs, &COST_CENTERS_SPEC);

        assert!(result.warnings.is_empty());
        assert_eq!(result.clean_rows[0].len(), 2);
    }

    #[test]
    fn test_native_cells_and_empty_input() {
        let hdrs = headers(&["vendor_name", "contract_name", "notice_period_days"]);
        let mut raw = RawRow::new();
        raw.push("vendor_name", CellValue::from("Acme"));
        raw.push("contract_name", CellValue::from("Feed"));
        raw.push("notice_period_days", CellValue::Float(90.0));

        let result = validate_rows(&[raw], &hdrs, &CONTRACTS_SPEC);
        assert_eq!(result.clean_rows[0].int("notice_period_days"), Some(90));

        let empty = validate_rows(&[], &hdrs, &CONTRACTS_SPEC);
        assert!(empty.clean_rows.is_empty());
        assert!(empty.errors.is_empty());
    }

    #[test]
    fn test_row_count_always_preserved() {
        let hdrs = headers(&["code", "name"]);
        let rows: Vec<RawRow> = (0..25)
            .map(|i| {
                let code = if i % 3 == 0 { String::new() } else { format!("C{}", i) };
                let name = if i % 4 == 0 { "  ".to_string() } else { format!("N{}", i) };
                [("code", code), ("name", name)].into_iter().collect()
            })
            .collect();

        let result = validate_rows(&rows, &hdrs, &COST_CENTERS_SPEC);
        assert_eq!(result.clean_rows.len(), rows.len());
        assert!(result.rows_with_errors().contains(&1));
    }
}
