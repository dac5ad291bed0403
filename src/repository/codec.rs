// ==========================================
// DataNaut 数据中心 - 列值编解码
// ==========================================
// 金额: 精确小数以 TEXT 存储（不经 REAL）
// 自然键: 小写副本列 *_key，实现 Unicode 大小写不敏感匹配
// ==========================================

use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;
use std::str::FromStr;

/// 自然键列值
pub fn natural_key(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn decimal_to_sql(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

/// 读取可空小数列
pub fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        Decimal::from_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// 读取非空小数列
pub fn required_decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    decimal_column(row, idx)?.ok_or(rusqlite::Error::InvalidColumnType(
        idx,
        "decimal".to_string(),
        Type::Null,
    ))
}
