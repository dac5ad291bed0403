// ==========================================
// 数据中心导入端到端测试
// ==========================================
// 测试目标: 文件 → 校验 → 合并 → 落库，含回滚语义
// ==========================================


use datanaut_datahub::config::config_keys;
use datanaut_datahub::datahub::file_parser::UploadedFile;
use datanaut_datahub::datahub::importer::NO_DATA_ROWS_WARNING;
use datanaut_datahub::datahub::{DataHubError, DataHubImporter, EntityKind, ImportSummary};
use datanaut_datahub::logging;
use datanaut_datahub::repository::{
    ContractRepository, CostCenterRepository, InvoiceRepository, VendorRepository,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use test_helpers::{count_rows, create_test_db, csv_upload, insert_test_config, open, seed_contract, seed_vendor};

#[test]
fn test_cost_centers_csv_from_disk() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Cost Centers.CSV");
    std::fs::write(&path, "code,name,business_unit\nCC1,Ops,IT\n,Finance,\nCC3,Sales,\n").unwrap();

    let upload = UploadedFile::from_path(&path).unwrap();
    let mut conn = open(&db_path);
    let report =
        DataHubImporter::import(&mut conn, EntityKind::CostCenters, &upload, "alice", None).unwrap();

    assert_eq!(report.summary, ImportSummary { created: 2, updated: 0 });
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 2);
    assert_eq!(report.errors[0].column, "code");
    assert_eq!(report.errors[0].message, "Required value is missing.");
    assert!(report.warnings.is_empty());
    assert_eq!(report.skipped_rows, vec![2]);

    let repo = CostCenterRepository::new(&conn);
    let ops = repo.find_by_code("CC1").unwrap().unwrap();
    assert_eq!(ops.business_unit.as_deref(), Some("IT"));
    let sales = repo.find_by_code("CC3").unwrap().unwrap();
    assert_eq!(sales.business_unit, None);
}

#[test]
fn test_services_with_missing_vendor_leave_no_writes() {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut conn = open(&db_path);
    seed_vendor(&conn, "Bloomberg");

    let upload = csv_upload(
        "services.csv",
        "vendor,service name,list price\nBloomberg,Terminal,\"25,000.00\"\nNoSuchVendor,Feed,10\n",
    );
    let err = DataHubImporter::import(&mut conn, EntityKind::Services, &upload, "alice", None)
        .unwrap_err();

    assert!(matches!(err, DataHubError::VendorNotFound { .. }));
    assert!(err.to_string().contains("NoSuchVendor"));
    assert_eq!(count_rows(&conn, "service"), 0);
}

#[test]
fn test_vendor_second_import_is_sparse() {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut conn = open(&db_path);

    let first = csv_upload(
        "vendors.csv",
        "Vendor Name,Type,Website,Notes\nAcme,Data,https://acme.test,Key supplier\n",
    );
    DataHubImporter::import(&mut conn, EntityKind::Vendors, &first, "alice", None).unwrap();

    let second = csv_upload(
        "vendors.csv",
        "name,vendor_type,website,notes\nACME,Market Data,,\n",
    );
    let report =
        DataHubImporter::import(&mut conn, EntityKind::Vendors, &second, "alice", None).unwrap();
    assert_eq!(report.summary, ImportSummary { created: 0, updated: 1 });

    let vendor = VendorRepository::new(&conn).find_by_name("acme").unwrap().unwrap();
    assert_eq!(vendor.name, "ACME");
    assert_eq!(vendor.vendor_type.as_deref(), Some("Market Data"));
    assert_eq!(vendor.website.as_deref(), Some("https://acme.test"));
    assert_eq!(vendor.notes.as_deref(), Some("Key supplier"));
    assert_eq!(count_rows(&conn, "vendor"), 1);
}

#[test]
fn test_contract_violation_rolls_back_whole_batch() {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut conn = open(&db_path);
    seed_vendor(&conn, "Acme");

    let upload = csv_upload(
        "contracts.csv",
        "vendor_name,contract_name,end_date,notice_date\n\
         Acme,Feed,2025-12-31,2025-10-01\n\
         Acme,Terminal,31/12/2025,15/01/2026\n",
    );
    let err = DataHubImporter::import(&mut conn, EntityKind::Contracts, &upload, "alice", None)
        .unwrap_err();

    assert!(matches!(err, DataHubError::NoticeDateAfterEndDate { .. }));
    assert_eq!(count_rows(&conn, "contract"), 0);
}

#[test]
fn test_configured_notice_periods() {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut conn = open(&db_path);
    seed_vendor(&conn, "Acme");
    insert_test_config(&conn, config_keys::ALLOWED_NOTICE_PERIODS, "45, 90").unwrap();

    let ok = csv_upload(
        "contracts.csv",
        "vendor_name,contract_name,notice_period_days\nAcme,Feed,45\n",
    );
    let report =
        DataHubImporter::import(&mut conn, EntityKind::Contracts, &ok, "alice", None).unwrap();
    assert_eq!(report.summary.created, 1);

    let bad = csv_upload(
        "contracts.csv",
        "vendor_name,contract_name,notice_period_days\nAcme,Feed,30\n",
    );
    let err =
        DataHubImporter::import(&mut conn, EntityKind::Contracts, &bad, "alice", None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid notice_period_days '30' for contract 'Feed'. Allowed: 45, 90."
    );

    let vendor = VendorRepository::new(&conn).find_by_name("Acme").unwrap().unwrap();
    let contract = ContractRepository::new(&conn)
        .find_by_natural_key("alice", vendor.id, "Feed", None)
        .unwrap()
        .unwrap();
    assert_eq!(contract.notice_period_days, Some(45));
}

#[test]
fn test_contract_unknown_columns_warning() {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut conn = open(&db_path);
    seed_vendor(&conn, "Acme");

    let upload = csv_upload(
        "contracts.csv",
        "Supplier,Contract,Internal Ref,Annual Cost\nAcme,Feed,X-9,\"1 234,50\"\n",
    );
    let report =
        DataHubImporter::import(&mut conn, EntityKind::Contracts, &upload, "alice", None).unwrap();

    assert_eq!(
        report.warnings,
        vec!["Unknown columns will be ignored: internal_ref".to_string()]
    );
    assert_eq!(
        report.headers_in_file,
        vec!["Supplier", "Contract", "Internal Ref", "Annual Cost"]
    );
    assert_eq!(report.summary.created, 1);

    let vendor = VendorRepository::new(&conn).find_by_name("Acme").unwrap().unwrap();
    let contract = ContractRepository::new(&conn)
        .find_by_natural_key("alice", vendor.id, "feed", None)
        .unwrap()
        .unwrap();
    assert_eq!(contract.annual_value, Some(Decimal::from_str("1234.50").unwrap()));
    assert_eq!(contract.uploaded_by.as_deref(), Some("alice"));
}

#[test]
fn test_invoices_link_contract_and_skip_bad_rows() {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut conn = open(&db_path);
    let acme = seed_vendor(&conn, "Acme");
    let contract = seed_contract(&conn, "alice", &acme, "Feed");

    let upload = csv_upload(
        "invoices.csv",
        "vendor_name,contract_name,invoice_number,invoice_date,currency,total_amount\n\
         Acme,feed,INV-1,15.01.2025,EUR,\"1,200.00\"\n\
         Acme,,INV-2,not a date,EUR,10\n",
    );
    let report =
        DataHubImporter::import(&mut conn, EntityKind::Invoices, &upload, "alice", None).unwrap();

    assert_eq!(report.summary.created, 1);
    assert_eq!(report.skipped_rows, vec![2]);
    // 必填日期转换失败: 转换错误 + 必填缺失
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().all(|e| e.row == 2 && e.column == "invoice_date"));

    let invoice = InvoiceRepository::new(&conn)
        .find_by_natural_key("alice", acme.id, "inv-1")
        .unwrap()
        .unwrap();
    assert_eq!(invoice.contract_id, Some(contract.id));
    assert_eq!(invoice.total_amount, Decimal::from_str("1200.00").unwrap());
    assert_eq!(invoice.invoice_date.to_string(), "2025-01-15");
}

#[test]
fn test_legacy_encoded_csv() {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut conn = open(&db_path);

    let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode("name,notes\nГазпром,Поставщик\n");
    let upload = UploadedFile::new("vendors.csv", bytes.into_owned());
    DataHubImporter::import(&mut conn, EntityKind::Vendors, &upload, "alice", None).unwrap();

    let vendor = VendorRepository::new(&conn).find_by_name("газпром").unwrap().unwrap();
    assert_eq!(vendor.name, "Газпром");
    assert_eq!(vendor.notes.as_deref(), Some("Поставщик"));
}

#[test]
fn test_header_only_file() {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut conn = open(&db_path);

    let upload = csv_upload("vendors.csv", "name,website\n");
    let report =
        DataHubImporter::import(&mut conn, EntityKind::Vendors, &upload, "alice", None).unwrap();

    assert_eq!(report.summary, ImportSummary::default());
    assert_eq!(report.warnings, vec![NO_DATA_ROWS_WARNING.to_string()]);
    assert_eq!(count_rows(&conn, "vendor"), 0);
}

#[test]
fn test_header_only_invoice_file_reports_missing_columns() {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut conn = open(&db_path);

    let upload = csv_upload("invoices.csv", "vendor_name,invoice_number,currency\n");
    let report =
        DataHubImporter::import(&mut conn, EntityKind::Invoices, &upload, "alice", None).unwrap();

    assert_eq!(
        report.warnings,
        vec![
            "Missing required column (or alias) in file: invoice_date".to_string(),
            "Missing required column (or alias) in file: total_amount".to_string(),
            NO_DATA_ROWS_WARNING.to_string(),
        ]
    );
    assert_eq!(count_rows(&conn, "invoice"), 0);
}
