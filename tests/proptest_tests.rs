//! Property-based tests for checksums, assembly and validation.
//!
//! Run with: `cargo test --features all --test proptest_tests`

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tiss::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Independent mod-11 reference: weights cycle 2..=max from the right.
fn reference_digit(digits: &[u32], max_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| d * (2 + (i as u32) % (max_weight - 1)))
        .sum();
    let r = sum % 11;
    if r < 2 { 0 } else { 11 - r }
}

fn to_string(digits: &[u32]) -> String {
    digits.iter().map(|d| char::from(b'0' + *d as u8)).collect()
}

fn with_check_digits(mut digits: Vec<u32>, max_weight: u32) -> Vec<u32> {
    let d1 = reference_digit(&digits, max_weight);
    digits.push(d1);
    let d2 = reference_digit(&digits, max_weight);
    digits.push(d2);
    digits
}

// ── Strategies ──────────────────────────────────────────────────────────────

fn arb_digits(len: usize) -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..10, len)
}

/// Generate a price from 0.01 to 999.99.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (1u64..100_000u64).prop_map(|cents| Decimal::new(cents as i64, 2))
}

fn arb_line() -> impl Strategy<Value = BilledLine> {
    (
        prop::sample::select(vec!["PROCEDURE", "EXAM", "CONSULTATION", "ODONTO", "SADT", "OTHER"]),
        1u32..=5,
        arb_price(),
    )
        .prop_map(|(category, qty, price)| {
            BilledLine::new(category, "10101012", "Procedimento", qty, price)
        })
}

fn snapshot(id: InvoiceId, lines: Vec<BilledLine>) -> InvoiceSnapshot {
    InvoiceSnapshot::new(
        id,
        date(2024, 6, 15),
        ClinicIdentity::new("Clínica Exemplo").tax_id("11222333000181"),
        PatientIdentity::new("Maria", "Silva")
            .tax_id("52998224725")
            .birth_date(date(1985, 3, 10)),
    )
    .professional(ProfessionalIdentity::new("Dr. João Souza").tax_id("11144477735"))
    .payer(PayerIdentity::new("11444777000161", "Saúde Mais", "123456"))
    .lines(lines)
}

proptest! {
    /// A CNPJ with correct check digits is accepted unless all digits repeat.
    #[test]
    fn cnpj_with_check_digits(base in arb_digits(12)) {
        let full = with_check_digits(base, 9);
        let all_same = full.iter().all(|d| *d == full[0]);
        prop_assert_eq!(is_valid_cnpj(&to_string(&full)), !all_same);
    }

    /// Any 14-digit string: accepted iff the reference check digits match.
    #[test]
    fn cnpj_matches_reference(digits in arb_digits(14)) {
        let expected = with_check_digits(digits[..12].to_vec(), 9);
        let all_same = digits.iter().all(|d| *d == digits[0]);
        prop_assert_eq!(is_valid_cnpj(&to_string(&digits)), expected == digits && !all_same);
    }

    #[test]
    fn cpf_with_check_digits(base in arb_digits(9)) {
        let full = with_check_digits(base, 11);
        let all_same = full.iter().all(|d| *d == full[0]);
        prop_assert_eq!(is_valid_cpf(&to_string(&full)), !all_same);
    }

    #[test]
    fn cpf_matches_reference(digits in arb_digits(11)) {
        let expected = with_check_digits(digits[..9].to_vec(), 11);
        let all_same = digits.iter().all(|d| *d == digits[0]);
        prop_assert_eq!(is_valid_cpf(&to_string(&digits)), expected == digits && !all_same);
    }

    /// Same snapshot, config and timestamp → identical document.
    #[test]
    fn assembly_is_deterministic(id in 1u64..1_000_000, lines in prop::collection::vec(arb_line(), 1..10)) {
        let s = snapshot(id, lines);
        let sent_at = date(2024, 6, 16).and_hms_opt(10, 30, 0).unwrap();
        let a = assemble(&s, &TissConfig::default(), sent_at).unwrap();
        let b = assemble(&s, &TissConfig::default(), sent_at).unwrap();
        prop_assert_eq!(&a, &b);
    }

    /// Assembled totals always reconcile, so validation never warns about them.
    #[test]
    fn assembled_totals_reconcile(lines in prop::collection::vec(arb_line(), 1..10)) {
        let expected: Decimal = lines.iter().map(|l| l.total().unwrap()).sum();
        let s = snapshot(1, lines);
        let sent_at = date(2024, 6, 16).and_hms_opt(10, 30, 0).unwrap();
        let doc = assemble(&s, &TissConfig::default(), sent_at).unwrap();
        prop_assert_eq!(doc.batch.claims[0].declared_total, expected);
        prop_assert_eq!(doc.batch.declared_total, Some(expected));

        let report = validate(&doc);
        prop_assert!(report.warnings.iter().all(|w| !w.field.ends_with("Total")));
    }

    /// is_valid() is exactly "no errors".
    #[test]
    fn validity_is_error_free(lines in prop::collection::vec(arb_line(), 0..60)) {
        let s = snapshot(1, lines.clone());
        let sent_at = date(2024, 6, 16).and_hms_opt(10, 30, 0).unwrap();
        if let Ok(doc) = assemble(&s, &TissConfig::default(), sent_at) {
            let report = validate(&doc);
            prop_assert_eq!(report.is_valid(), report.errors.is_empty());
            prop_assert_eq!(report.is_valid(), lines.len() <= 50);
        } else {
            prop_assert!(lines.is_empty());
        }
    }
}

#[cfg(feature = "xml")]
proptest! {
    #[test]
    fn serialization_is_deterministic(lines in prop::collection::vec(arb_line(), 1..5)) {
        let s = snapshot(3, lines);
        let sent_at = date(2024, 6, 16).and_hms_opt(10, 30, 0).unwrap();
        let a = xml::to_tiss_xml(&assemble(&s, &TissConfig::default(), sent_at).unwrap()).unwrap();
        let b = xml::to_tiss_xml(&assemble(&s, &TissConfig::default(), sent_at).unwrap()).unwrap();
        prop_assert_eq!(a, b);
    }
}
