use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal_macros::dec;
use tiss::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sent_at() -> NaiveDateTime {
    date(2024, 6, 16).and_hms_opt(10, 30, 0).unwrap()
}

fn config() -> TissConfig {
    TissConfigBuilder::new()
        .payer("11.444.777/0001-61", "Saúde Mais", "123456")
        .build()
}

fn snapshot(lines: Vec<BilledLine>) -> InvoiceSnapshot {
    InvoiceSnapshot::new(
        42,
        date(2024, 6, 15),
        ClinicIdentity::new("Clínica Exemplo").tax_id("11.222.333/0001-81"),
        PatientIdentity::new("Maria", "Silva")
            .tax_id("529.982.247-25")
            .birth_date(date(1985, 3, 10))
            .gender("feminino"),
    )
    .professional(
        ProfessionalIdentity::new("Dr. João Souza")
            .tax_id("111.444.777-35")
            .license("123456", "CRM", "SP"),
    )
    .lines(lines)
}

fn consultation() -> BilledLine {
    BilledLine::new("PROCEDURE", "10101012", "Consulta médica", 1, dec!(150.00))
}

#[test]
fn scenario_assembles_valid_document() {
    let doc = assemble(&snapshot(vec![consultation()]), &config(), sent_at()).unwrap();
    let report = validate(&doc);
    assert!(report.is_valid(), "{:?}", report.errors);
    assert_eq!(report.total_warnings(), 0, "{:?}", report.warnings);

    assert_eq!(doc.batch.batch_number, "LOTE000042");
    assert_eq!(doc.batch.sent_date, "2024-06-16");
    assert_eq!(doc.batch.sent_time.as_deref(), Some("10:30"));
    assert_eq!(doc.batch.declared_total, Some(dec!(150.00)));

    let claim = &doc.batch.claims[0];
    assert_eq!(claim.declared_total, dec!(150.00));
    let id = &claim.identification;
    assert_eq!(id.claim_number, "GUIA000042");
    assert_eq!(id.provider.tax_id, "11222333000181");
    assert_eq!(id.provider.provider_code.as_deref(), Some("001"));
    assert_eq!(id.payer.tax_id, "11444777000161");
    assert_eq!(id.beneficiary.tax_id, "52998224725");
    assert_eq!(id.beneficiary.card_number, "52998224725");
    assert_eq!(id.beneficiary.full_name, "Maria Silva");
    assert_eq!(id.beneficiary.sex, "F");
    assert_eq!(id.beneficiary.plan_name, "Plano Padrão");
    assert_eq!(id.contractor.occupation_code, "2251");
    assert_eq!(id.contractor.council_state.as_deref(), Some("SP"));
    assert_eq!(id.kind, ClaimKind::Consultation);
}

#[test]
fn zero_lines_is_an_assembly_error() {
    let err = assemble(&snapshot(vec![]), &config(), sent_at()).unwrap_err();
    assert!(matches!(err, TissError::Assembly(_)));
}

#[test]
fn assembly_is_deterministic() {
    let s = snapshot(vec![consultation(), consultation()]);
    let a = assemble(&s, &config(), sent_at()).unwrap();
    let b = assemble(&s, &config(), sent_at()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn line_defaults_and_overrides() {
    let own = BilledLine::new("EXAM", "40301010", "Hemograma completo", 2, dec!(25.50))
        .service_date(date(2024, 6, 10))
        .times(
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(14, 20, 0).unwrap(),
        );
    let doc = assemble(&snapshot(vec![consultation(), own]), &config(), sent_at()).unwrap();
    let lines = doc.batch.claims[0].content.service_lines();

    assert_eq!(lines[0].table_code, "02");
    assert_eq!(lines[0].performed_date, "2024-06-15");
    assert_eq!(lines[0].start_time.as_deref(), Some("08:00"));
    assert_eq!(lines[0].end_time.as_deref(), Some("09:00"));

    assert_eq!(lines[1].table_code, "03");
    assert_eq!(lines[1].line_total, dec!(51.00));
    assert_eq!(lines[1].performed_date, "2024-06-10");
    assert_eq!(lines[1].start_time.as_deref(), Some("14:00"));

    assert_eq!(doc.batch.claims[0].declared_total, dec!(201.00));
}

#[test]
fn unmapped_codes_fall_back() {
    let line = BilledLine::new("SURGERY", "INT-77", "Procedimento interno", 1, dec!(10));
    let doc = assemble(&snapshot(vec![line]), &config(), sent_at()).unwrap();
    let lines = doc.batch.claims[0].content.service_lines();
    assert_eq!(lines[0].table_code, "99");
    assert_eq!(lines[0].procedure_code, "INT-77");
}

#[test]
fn all_dental_lines_make_a_dental_block() {
    let line = BilledLine::new("ODONTO", "50101012", "Restauração", 1, dec!(200))
        .dental(16, ToothFace::Occlusal, DentalArch::Upper);
    let doc = assemble(&snapshot(vec![line]), &config(), sent_at()).unwrap();
    match &doc.batch.claims[0].content {
        ClaimContent::Dental(lines) => {
            assert_eq!(lines[0].service.table_code, "05");
            assert_eq!(lines[0].tooth.as_deref(), Some("16"));
            assert_eq!(lines[0].face.as_deref(), Some("O"));
            assert_eq!(lines[0].arch.as_deref(), Some("S"));
        }
        other => panic!("expected dental block, got {other:?}"),
    }
    assert!(validate(&doc).is_valid());
}

#[test]
fn all_sadt_lines_make_an_exam_claim() {
    let line = BilledLine::new("sadt", "60101010", "Ultrassonografia", 1, dec!(180))
        .exam("US", "Sala 3");
    let doc = assemble(&snapshot(vec![line]), &config(), sent_at()).unwrap();
    let claim = &doc.batch.claims[0];
    assert!(matches!(claim.content, ClaimContent::AncillaryExam(_)));
    assert_eq!(claim.identification.kind, ClaimKind::AncillaryExam);
    assert!(validate(&doc).is_valid());
}

#[test]
fn mixed_categories_stay_procedures() {
    let dental = BilledLine::new("ODONTO", "50101011", "Profilaxia", 1, dec!(90));
    let doc = assemble(&snapshot(vec![consultation(), dental]), &config(), sent_at()).unwrap();
    assert!(matches!(
        doc.batch.claims[0].content,
        ClaimContent::Procedures(_)
    ));
}

#[test]
fn gaps_are_defaulted_and_reported() {
    let snapshot = InvoiceSnapshot::new(
        7,
        date(2024, 6, 15),
        ClinicIdentity::new("Clínica Sem Cadastro"),
        PatientIdentity::new("José", "Santos"),
    )
    .line(consultation());
    let doc = assemble(&snapshot, &TissConfig::default(), sent_at()).unwrap();
    let id = &doc.batch.claims[0].identification;
    assert_eq!(id.provider.tax_id, "00000000000000");
    assert_eq!(id.beneficiary.tax_id, "00000000000");
    assert_eq!(id.beneficiary.birth_date, "1900-01-01");
    assert_eq!(id.beneficiary.sex, "M");
    assert_eq!(id.contractor.full_name, "Profissional Padrão");
    assert_eq!(id.payer.legal_name, "Operadora Padrão");

    let report = validate(&doc);
    assert!(!report.is_valid());
    let checksum_errors = report
        .errors
        .iter()
        .filter(|e| e.class == RuleClass::Checksum)
        .count();
    // provider, payer, beneficiary and contractor placeholders
    assert_eq!(checksum_errors, 4);
}

#[test]
fn payer_on_invoice_wins_over_config() {
    let s = snapshot(vec![consultation()]).payer(PayerIdentity::new("11222333000181", "Outra", "654321"));
    let doc = assemble(&s, &config(), sent_at()).unwrap();
    assert_eq!(doc.batch.claims[0].identification.payer.registration, "654321");
}

#[test]
fn authorization_and_note_are_carried() {
    let s = snapshot(vec![consultation()])
        .authorization(Authorization {
            date: date(2024, 6, 1),
            password: "ABC123".into(),
            origin_claim_number: Some("GUIA000001".into()),
        })
        .note("Retorno em 30 dias");
    let doc = assemble(&s, &config(), sent_at()).unwrap();
    let claim = &doc.batch.claims[0];
    assert_eq!(claim.identification.authorization_date.as_deref(), Some("2024-06-01"));
    assert_eq!(claim.identification.authorization_password.as_deref(), Some("ABC123"));
    assert_eq!(claim.note.as_deref(), Some("Retorno em 30 dias"));
    assert!(validate(&doc).is_valid());
}

#[test]
fn unknown_gender_surfaces_in_validation() {
    let mut s = snapshot(vec![consultation()]);
    s.patient.gender = Some("outro".into());
    let doc = assemble(&s, &config(), sent_at()).unwrap();
    let report = validate(&doc);
    assert_eq!(report.total_errors(), 1);
    assert_eq!(report.errors[0].class, RuleClass::Enumeration);
}

#[test]
fn overflowing_totals_are_assembly_errors() {
    let mut line = consultation();
    line.quantity = 2;
    line.unit_price = rust_decimal::Decimal::MAX;
    let err = assemble(&snapshot(vec![line]), &config(), sent_at()).unwrap_err();
    assert!(matches!(&err, TissError::Assembly(msg) if msg.contains("line total out of range")));

    let mut line = consultation();
    line.unit_price = rust_decimal::Decimal::MAX;
    let err = assemble(&snapshot(vec![line.clone(), line]), &config(), sent_at()).unwrap_err();
    assert!(matches!(&err, TissError::Assembly(msg) if msg.contains("claim total out of range")));
}
