// ==========================================
// DataNaut 数据中心 - 表头标准化
// ==========================================
// 职责: 原始列名 → 稳定查找键（NormalizedKey）
// 规则: TRIM → 小写 → 去 BOM → 空白/连字符串合并为 '_'
//       → 去除非单词字符 → 去首尾 '_'
// ==========================================

const BOM: char = '\u{feff}';

/// 标准化列名
///
/// 空串保留为"未映射列"，不会命中任何数据集映射。
///
/// # 示例
/// ```
/// use datanaut_datahub::datahub::header::normalize_header;
/// assert_eq!(normalize_header("  Cost Center-Code "), "cost_center_code");
/// assert_eq!(normalize_header("\u{feff}Name"), "name");
/// ```
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    let mut collapsed = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for c in lowered.chars().filter(|c| *c != BOM) {
        if c.is_whitespace() || c == '-' {
            if !in_separator {
                collapsed.push('_');
                in_separator = true;
            }
            continue;
        }
        in_separator = false;
        if c.is_alphanumeric() || c == '_' {
            collapsed.push(c);
        }
    }

    collapsed.trim_matches('_').to_string()
}
