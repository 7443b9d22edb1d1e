#![cfg(feature = "batch")]

use std::io::{Cursor, Read};

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tiss::batch::*;
use tiss::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn snapshot(id: InvoiceId) -> InvoiceSnapshot {
    InvoiceSnapshot::new(
        id,
        date(2024, 6, 15),
        ClinicIdentity::new("Clínica Exemplo").tax_id("11222333000181"),
        PatientIdentity::new("Maria", "Silva")
            .tax_id("52998224725")
            .birth_date(date(1985, 3, 10))
            .gender("F"),
    )
    .professional(ProfessionalIdentity::new("Dr. João Souza").tax_id("11144477735"))
    .line(BilledLine::new("PROCEDURE", "10101012", "Consulta médica", 1, dec!(150.00)))
}

fn invalid_snapshot(id: InvoiceId) -> InvoiceSnapshot {
    let mut s = snapshot(id);
    s.clinic.tax_id = Some("11222333000100".into());
    s
}

fn service(snapshots: Vec<InvoiceSnapshot>) -> TissService<MemorySnapshotSource, FixedClock> {
    let config = TissConfigBuilder::new()
        .payer("11444777000161", "Saúde Mais", "123456")
        .build();
    TissService::with_clock(
        snapshots.into_iter().collect(),
        config,
        FixedClock(date(2024, 6, 16).and_hms_opt(10, 30, 0).unwrap()),
    )
}

fn entries(archive: &[u8]) -> Vec<(String, String)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut file = zip.by_index(i).unwrap();
            let mut content = String::new();
            file.read_to_string(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

// --- Single document operations ---

#[test]
fn generate_one_scenario() {
    let svc = service(vec![snapshot(1)]);
    let doc = svc.generate_one(1, false).unwrap();
    let xml = String::from_utf8(doc.xml).unwrap();
    assert!(xml.contains("<valorTotalGuia>150.00</valorTotalGuia>"));
    assert!(doc.warnings.is_empty());
}

#[test]
fn generate_one_missing_invoice() {
    let svc = service(vec![]);
    let err = svc.generate_one(9, false).unwrap_err();
    assert!(matches!(err, TissError::SnapshotNotFound(9)));
}

#[test]
fn generate_one_invalid_carries_report() {
    let svc = service(vec![invalid_snapshot(1)]);
    let err = svc.generate_one(1, false).unwrap_err();
    let report = err.report().expect("validation error");
    assert_eq!(report.total_errors(), 1);
    assert_eq!(report.errors[0].class, RuleClass::Checksum);
}

#[test]
fn preview_skips_validation() {
    let svc = service(vec![invalid_snapshot(1)]);
    let xml = String::from_utf8(svc.preview(1).unwrap()).unwrap();
    assert!(xml.contains("<cnpj>11222333000100</cnpj>"));
}

#[test]
fn validate_only_returns_report() {
    let svc = service(vec![snapshot(1), invalid_snapshot(2)]);

    let report = svc.validate_only(1).unwrap();
    assert!(report.is_valid());
    assert_eq!(report.total_errors(), 0);
    assert_eq!(report.total_warnings(), 0);

    let report = svc.validate_only(2).unwrap();
    assert!(!report.is_valid());

    assert!(svc.validate_only(3).is_err());
}

#[test]
fn validate_only_assembly_error() {
    let mut s = snapshot(1);
    s.lines.clear();
    let svc = service(vec![s]);
    assert!(matches!(svc.validate_only(1), Err(TissError::Assembly(_))));
}

#[test]
fn configured_limits_apply() {
    let mut s = snapshot(1);
    s.lines.push(s.lines[0].clone());
    let mut svc_config = TissConfigBuilder::new()
        .payer("11444777000161", "Saúde Mais", "123456")
        .build();
    svc_config.limits.max_lines_per_claim = 1;
    let svc = TissService::with_clock(
        MemorySnapshotSource::new().with(s),
        svc_config,
        FixedClock(date(2024, 6, 16).and_hms_opt(10, 30, 0).unwrap()),
    );
    assert!(!svc.validate_only(1).unwrap().is_valid());
}

// --- Batch ---

#[test]
fn batch_isolates_missing_invoice() {
    let svc = service(vec![snapshot(1), snapshot(3)]);
    let archive = svc.generate_batch(&[1, 2, 3]).unwrap();
    let entries = entries(&archive);

    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["1.xml", "error_2.txt", "3.xml"]);
    assert!(entries[0].1.contains("<numeroLote>LOTE000001</numeroLote>"));
    assert!(entries[1].1.starts_with("Error generating TISS XML for invoice 2: invoice 2 not found"));
    assert!(entries[2].1.contains("<numeroLote>LOTE000003</numeroLote>"));
}

#[test]
fn batch_isolates_invalid_invoice() {
    let svc = service(vec![snapshot(1), invalid_snapshot(2)]);
    let output = svc.generate_batch_with(&[2, 1], false).unwrap();
    assert_eq!(output.failed_count(), 1);

    let failed = output.failed().next().unwrap();
    assert_eq!(failed.invoice_id, 2);
    assert_eq!(failed.stage(), ItemStage::Failed);
    assert_eq!(failed.failed_after(), Some(ItemStage::Assembled));

    let ok = &output.items[1];
    assert_eq!(ok.stage(), ItemStage::Serialized);

    let entries = entries(&output.archive);
    assert_eq!(entries[0].0, "error_2.txt");
    assert!(entries[0].1.contains("- [checksum] claims[0].identification.provider.taxId"));
    assert_eq!(entries[1].0, "1.xml");
}

#[test]
fn batch_with_skip_validation_serializes_everything() {
    let svc = service(vec![snapshot(1), invalid_snapshot(2)]);
    let output = svc.generate_batch_with(&[1, 2], true).unwrap();
    assert_eq!(output.failed_count(), 0);
    let names: Vec<String> = entries(&output.archive).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["1.xml", "2.xml"]);
}

#[test]
fn empty_batch_is_an_empty_archive() {
    let svc = service(vec![]);
    let archive = svc.generate_batch(&[]).unwrap();
    assert!(entries(&archive).is_empty());
}

#[test]
fn batch_preserves_input_order() {
    let ids: Vec<InvoiceId> = (1..=40).rev().collect();
    let svc = service(ids.iter().filter(|id| *id % 7 != 0).map(|&id| snapshot(id)).collect());
    let archive = svc.generate_batch(&ids).unwrap();
    let names: Vec<String> = entries(&archive).into_iter().map(|(n, _)| n).collect();
    let expected: Vec<String> = ids
        .iter()
        .map(|id| {
            if id % 7 == 0 {
                format!("error_{id}.txt")
            } else {
                format!("{id}.xml")
            }
        })
        .collect();
    assert_eq!(names, expected);
}

#[test]
fn batch_with_repeated_ids_keeps_every_entry() {
    let svc = service(vec![snapshot(1)]);
    let archive = svc.generate_batch(&[1, 1]).unwrap();
    let entries = entries(&archive);
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["1.xml", "1_2.xml"]);
    assert_eq!(entries[0].1, entries[1].1);

    let archive = svc.generate_batch(&[4, 1, 4, 4]).unwrap();
    let names: Vec<String> = crate::entries(&archive).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["error_4.txt", "1.xml", "error_4_2.txt", "error_4_3.txt"]);
}

#[test]
fn batch_isolates_overflowing_line_total() {
    let mut huge = snapshot(2);
    huge.lines[0].quantity = 2;
    huge.lines[0].unit_price = rust_decimal::Decimal::MAX;
    let svc = service(vec![snapshot(1), huge]);

    let output = svc.generate_batch_with(&[1, 2], false).unwrap();
    assert_eq!(output.items[0].stage(), ItemStage::Serialized);
    let failed = &output.items[1];
    assert!(matches!(failed.error(), Some(TissError::Assembly(_))));
    assert_eq!(failed.failed_after(), Some(ItemStage::Pending));

    let names: Vec<String> = entries(&output.archive).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["1.xml", "error_2.txt"]);
    assert!(matches!(svc.generate_one(2, true), Err(TissError::Assembly(_))));
}

#[test]
fn batch_archive_is_deterministic() {
    let svc = service(vec![snapshot(1), snapshot(2)]);
    assert_eq!(
        svc.generate_batch(&[1, 2, 5]).unwrap(),
        svc.generate_batch(&[1, 2, 5]).unwrap()
    );
}

#[test]
fn closure_snapshot_source() {
    let source = |id: InvoiceId| {
        if id == 1 {
            Ok(snapshot(1))
        } else {
            Err(TissError::SnapshotNotFound(id))
        }
    };
    let svc = TissService::with_clock(
        source,
        TissConfigBuilder::new()
            .payer("11444777000161", "Saúde Mais", "123456")
            .build(),
        FixedClock(date(2024, 6, 16).and_hms_opt(10, 30, 0).unwrap()),
    );
    assert!(svc.generate_one(1, false).is_ok());
    assert!(svc.generate_one(2, false).is_err());
}
