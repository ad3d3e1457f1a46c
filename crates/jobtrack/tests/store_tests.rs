//! CSV store behaviour against files written by hand or by older versions.

mod common;

use common::{fixed_now, RecordBuilder, TestHarness};
use jobtrack::classifier::ResponseType;
use jobtrack::pipeline::{archive_store, export_report, store_status};
use jobtrack::report::CsvReportSink;
use jobtrack::store::{merge_with_archive, Store};

#[test]
fn test_missing_files_load_as_empty() {
    let harness = TestHarness::new();
    let snapshot = harness.load();
    assert!(snapshot.active.is_empty());
    assert!(snapshot.archived.is_empty());
    assert!(snapshot.drift.is_empty());
}

#[test]
fn test_save_preserves_order_and_leaves_no_temp_files() {
    let harness = TestHarness::new();
    let active = vec![
        RecordBuilder::new("b thread").build(),
        RecordBuilder::new("a thread").build(),
        RecordBuilder::new("c thread")
            .company("Initech, Inc.")
            .response(ResponseType::Error)
            .build(),
    ];
    harness.seed(&active, &[]);

    let snapshot = harness.load();
    assert_eq!(snapshot.active, active);

    let leftovers: Vec<_> = std::fs::read_dir(harness.root())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_hand_edited_file_with_bom_and_reordered_columns() {
    let harness = TestHarness::new();
    harness.write_active_csv(
        "\u{feff}Thread_ID,Email,Subject,Response_Type,Date_Applied,Job_Title,Company,notes\n\
         acme role,jobs@acme.com,Acme role,no reply yet,2024-03-14,Engineer,Acme,call back\n\
         legacy,hr@globex.com,Legacy,Accepted,2024-02-01,Manager,Globex,\n",
    );

    let snapshot = harness.load();
    assert!(snapshot.drift.is_empty());
    assert_eq!(snapshot.active.len(), 2);

    let first = &snapshot.active[0];
    assert_eq!(first.thread_id, "acme role");
    assert_eq!(first.company, "Acme");
    assert_eq!(first.response_type, ResponseType::NoReplyYet);

    assert_eq!(
        snapshot.active[1].response_type,
        ResponseType::Unrecognized("Accepted".to_string())
    );
}

#[test]
fn test_unrecognised_labels_survive_merge_and_save() {
    let harness = TestHarness::new();
    harness.write_active_csv(
        "company,job_title,date_applied,response_type,subject,email,thread_id\n\
         Acme,Eng,2024-01-01,Accepted,s,a@x.com,old\n\
         Globex,Analyst,2024-01-02,Ghosted,g,b@globex.com,ghost\n",
    );

    let snapshot = harness.load();
    let merged = merge_with_archive(
        snapshot.active,
        &snapshot.archived,
        [RecordBuilder::new("new thread").build()],
    );
    assert_eq!(merged.added, 1);
    harness.store().save(&merged.records, &snapshot.archived).unwrap();

    let text = std::fs::read_to_string(&harness.active_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[1], "Acme,Eng,2024-01-01,Accepted,s,a@x.com,old");
    assert_eq!(lines[2], "Globex,Analyst,2024-01-02,Ghosted,g,b@globex.com,ghost");
    assert_eq!(lines.len(), 4);

    let status = store_status(&harness.store(), fixed_now(), 10).unwrap();
    assert_eq!(status.active.unknown, 2);
}

#[test]
fn test_missing_optional_columns_are_filled() {
    let harness = TestHarness::new();
    harness.write_active_csv("company,date_applied,response_type,thread_id\nAcme,2024-03-01,Interview,t1\n");

    let snapshot = harness.load();
    assert_eq!(snapshot.active.len(), 1);
    assert_eq!(snapshot.active[0].job_title, "");
    assert_eq!(snapshot.active[0].email, "");

    assert_eq!(snapshot.drift.len(), 1);
    let drift = &snapshot.drift[0];
    assert!(!drift.rebuilt);
    assert_eq!(drift.missing_columns, vec!["job_title", "subject", "email"]);
}

#[test]
fn test_header_only_file_is_empty() {
    let harness = TestHarness::new();
    harness.write_active_csv("");
    assert!(harness.load().active.is_empty());

    harness.write_active_csv("company,job_title,date_applied,response_type,subject,email,thread_id\n");
    let snapshot = harness.load();
    assert!(snapshot.active.is_empty());
    assert!(snapshot.drift.is_empty());
}

#[test]
fn test_maintenance_commands() {
    let harness = TestHarness::new();
    harness.seed(
        &[
            RecordBuilder::new("rejected")
                .response(ResponseType::Rejected)
                .build(),
            RecordBuilder::new("waiting")
                .response(ResponseType::NoReplyYet)
                .applied("2024-03-12")
                .build(),
            RecordBuilder::new("applied")
                .response(ResponseType::Applied)
                .build(),
            RecordBuilder::new("offer").response(ResponseType::Offer).build(),
        ],
        &[],
    );

    let before = store_status(&harness.store(), fixed_now(), 10).unwrap();
    assert_eq!(before.active.total(), 4);
    assert_eq!(before.active.negative, 1);
    assert_eq!(before.archived.total(), 0);

    assert_eq!(archive_store(&harness.store(), fixed_now(), 10).unwrap(), 2);
    assert_eq!(archive_store(&harness.store(), fixed_now(), 10).unwrap(), 0);

    let after = store_status(&harness.store(), fixed_now(), 10).unwrap();
    assert_eq!(after.active.total(), 2);
    assert_eq!(after.active.positive, 1);
    assert_eq!(after.active.waiting, 1);
    assert_eq!(after.archived.total(), 2);

    let sink = CsvReportSink::new(&harness.report_dir);
    let path = export_report(&harness.store(), &sink, fixed_now(), 10).unwrap();
    let report = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(
        lines[0],
        "company,job_title,date_applied,response_type,subject,email,thread_id,status"
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("Acme,Engineer,2024-03-12,No Reply Yet,waiting"));
}

#[test]
fn test_store_trait_object() {
    let harness = TestHarness::new();
    let store: Box<dyn Store> = Box::new(harness.store());
    store
        .save(&[], &[RecordBuilder::new("old").build()])
        .unwrap();
    assert_eq!(store.load().unwrap().archived.len(), 1);
}
