// ==========================================
// DataNaut 数据中心 - 表格导入导出核心
// ==========================================
// 导入: 读取 → 表头归一化 → 值转换/校验 → 增量合并
// 导出: 仓储查询 → 字符串化 → CSV/Excel 写出
// ==========================================

pub mod dataset_spec;
pub mod error;
pub mod exporter;
pub mod file_parser;
pub mod header;
pub mod importer;
pub mod registry;
pub mod table_writer;
pub mod upsert;
pub mod validator;
pub mod value_parser;

pub use dataset_spec::{CleanRow, DatasetSpec, FieldKind, FieldValue};
pub use error::{DataHubError, DataHubResult, FieldError};
pub use file_parser::{read_tabular_file, RawRow, ReadOptions, TableData, TableFormat, UploadedFile};
pub use header::normalize_header;
pub use importer::{DataHubImporter, ImportReport};
pub use registry::EntityKind;
pub use table_writer::ExportFile;
pub use upsert::{ImportSummary, UpsertOutcome, UpsertStrategy};
pub use validator::{validate_rows, ValidationErrorItem, ValidationResult};
pub use value_parser::CellValue;
