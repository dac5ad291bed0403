// ==========================================
// 导出 → 回导 一致性测试
// ==========================================
// 测试目标: 导出文件回导后全部命中更新，且再次导出内容不变
// ==========================================


use datanaut_datahub::config::DataHubConfig;
use datanaut_datahub::datahub::exporter::{export, export_rows};
use datanaut_datahub::datahub::file_parser::{read_tabular_file, ReadOptions, UploadedFile};
use datanaut_datahub::datahub::validator::validate_rows;
use datanaut_datahub::datahub::{DataHubImporter, EntityKind, TableFormat};
use rusqlite::Connection;
use test_helpers::{create_test_db, csv_upload, open};

const FIXTURES: [(EntityKind, &str); 5] = [
    (
        EntityKind::Vendors,
        "name,vendor_type,tags,primary_contact_name,primary_contact_email,website,notes\n\
         Acme,Market Data,\"equities, fx\",Jane Roe,jane@acme.test,https://acme.test,\"Line one, with comma\"\n\
         Zenith,Research,,,,,\n",
    ),
    (
        EntityKind::CostCenters,
        "code,name,business_unit,region\nCC-100,Trading,Markets,EMEA\nCC-200,Research,,APAC\n",
    ),
    (
        EntityKind::Services,
        "vendor_name,name,category,list_price,default_currency\n\
         Acme,Terminal,Desktop,\"24,500.25\",USD\n\
         Zenith,Notes,Research,0.10,EUR\n",
    ),
    (
        EntityKind::Contracts,
        "vendor_name,contract_name,contract_id,annual_value,currency,start_date,end_date,notice_period_days,notice_date,status\n\
         Acme,Enterprise,AC-1,120000.00,USD,01/01/2024,31/12/2025,90,2025-10-02,Active\n\
         Zenith,Research Pack,,,EUR,,,,,\n",
    ),
    (
        EntityKind::Invoices,
        "vendor_name,contract_name,invoice_number,invoice_date,currency,total_amount,tax_amount,period_start,period_end\n\
         Acme,Enterprise,INV-001,2024-02-01,USD,10000.00,1900.00,2024-01-01,2024-01-31\n\
         Zenith,,Z-77,2024-03-15,EUR,99.5,,,\n",
    ),
];

fn seed_all(conn: &mut Connection) {
    for (kind, body) in FIXTURES {
        let upload = csv_upload(&format!("{}.csv", kind.key()), body);
        let report = DataHubImporter::import(conn, kind, &upload, "alice", None).unwrap();
        assert!(report.errors.is_empty(), "{}: {:?}", kind, report.errors);
        assert_eq!(report.summary.created, 2, "{}", kind);
    }
}

fn assert_round_trip(format: TableFormat) {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut conn = open(&db_path);
    seed_all(&mut conn);
    let config = DataHubConfig::default();

    for kind in EntityKind::ALL {
        let before = export_rows(&conn, kind, "alice").unwrap();
        let file = export(&conn, kind, "alice", format, &config).unwrap();
        assert_eq!(file.content_type, format.content_type());

        // 导出文件可无错误校验
        let upload = UploadedFile::new(file.filename.clone(), file.bytes.clone());
        let table = read_tabular_file(&upload, None, &ReadOptions::default()).unwrap();
        let validation = validate_rows(&table.rows, &table.headers, kind.spec());
        assert!(validation.errors.is_empty(), "{}: {:?}", kind, validation.errors);
        assert!(validation.warnings.is_empty(), "{}: {:?}", kind, validation.warnings);

        let report = DataHubImporter::import(&mut conn, kind, &upload, "alice", None).unwrap();
        assert_eq!(report.summary.created, 0, "{}", kind);
        assert_eq!(report.summary.updated, before.len(), "{}", kind);

        let after = export_rows(&conn, kind, "alice").unwrap();
        assert_eq!(before, after, "{}", kind);
    }
}

#[test]
fn test_csv_round_trip_all_entities() {
    assert_round_trip(TableFormat::Csv);
}

#[cfg(feature = "xlsx")]
#[test]
fn test_xlsx_round_trip_all_entities() {
    assert_round_trip(TableFormat::Xlsx);
}

#[test]
fn test_exported_values_are_canonical() {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut conn = open(&db_path);
    seed_all(&mut conn);

    let contracts = export_rows(&conn, EntityKind::Contracts, "alice").unwrap();
    // 最新创建的在前
    assert_eq!(contracts[0][1], "Research Pack");
    let enterprise = &contracts[1];
    assert_eq!(enterprise[5], "120000.00");
    assert_eq!(enterprise[7], "2024-01-01");
    assert_eq!(enterprise[8], "2025-12-31");
    assert_eq!(enterprise[10], "90");

    let invoices = export_rows(&conn, EntityKind::Invoices, "alice").unwrap();
    assert_eq!(invoices[0][2], "Z-77");
    assert_eq!(invoices[1][1], "Enterprise");

    // 其他用户看不到
    assert!(export_rows(&conn, EntityKind::Invoices, "bob").unwrap().is_empty());
}
