use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tiss::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

    // A clean invoice
    let snapshot = InvoiceSnapshot::new(
        1,
        day,
        ClinicIdentity::new("Clínica Exemplo").tax_id("11.222.333/0001-81"),
        PatientIdentity::new("Maria", "Silva")
            .tax_id("529.982.247-25")
            .birth_date(NaiveDate::from_ymd_opt(1985, 3, 10).unwrap())
            .gender("feminino"),
    )
    .professional(ProfessionalIdentity::new("Dr. João Souza").tax_id("111.444.777-35"))
    .line(BilledLine::new("PROCEDURE", "10101012", "Consulta médica", 1, dec!(150.00)));

    let config = TissConfigBuilder::new()
        .payer("11444777000161", "Saúde Mais", "123456")
        .build();
    let sent_at = day.and_hms_opt(18, 0, 0).unwrap();

    let doc = assemble(&snapshot, &config, sent_at).expect("snapshot has lines");
    print_report("clean invoice", &validate(&doc));

    // Same invoice with a mistyped CNPJ and a hand-edited total
    let mut broken = doc.clone();
    broken.batch.claims[0].identification.provider.tax_id = "11222333000182".into();
    broken.batch.claims[0].declared_total = dec!(149.99);
    print_report("broken invoice", &validate(&broken));

    // Defaults only: every placeholder is reported
    let bare = InvoiceSnapshot::new(2, day, ClinicIdentity::new("Clínica"), PatientIdentity::new("José", ""))
        .line(BilledLine::new("ODONTO", "50101011", "Profilaxia", 1, dec!(90)));
    let doc = assemble(&bare, &TissConfig::default(), sent_at).expect("snapshot has lines");
    print_report("snapshot with gaps", &validate(&doc));
}

fn print_report(title: &str, report: &ValidationReport) {
    println!(
        "{title}: valid={} errors={} warnings={}",
        report.is_valid(),
        report.total_errors(),
        report.total_warnings()
    );
    for issue in report.issues() {
        println!("  {issue}");
    }
}
