use std::fs;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tiss::batch::{MemorySnapshotSource, TissService};
use tiss::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tiss=info")),
        )
        .init();

    let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let patient = PatientIdentity::new("Maria", "Silva")
        .tax_id("52998224725")
        .birth_date(NaiveDate::from_ymd_opt(1985, 3, 10).unwrap())
        .gender("F");
    let clinic = ClinicIdentity::new("Clínica Exemplo")
        .tax_id("11222333000181")
        .facility_code("1234567");

    let mut source = MemorySnapshotSource::new();
    source.insert(
        InvoiceSnapshot::new(101, day, clinic.clone(), patient.clone())
            .line(BilledLine::new("PROCEDURE", "10101012", "Consulta médica", 1, dec!(150.00))),
    );
    source.insert(
        InvoiceSnapshot::new(102, day, clinic.clone(), patient.clone()).line(
            BilledLine::new("ODONTO", "50101012", "Restauração", 1, dec!(220.00))
                .dental(16, ToothFace::Occlusal, DentalArch::Upper),
        ),
    );
    // 103 is missing; 104 has no lines
    source.insert(InvoiceSnapshot::new(104, day, clinic, patient));

    let config = TissConfigBuilder::new()
        .payer("11444777000161", "Saúde Mais", "123456")
        .build();
    let service = TissService::new(source, config);

    let output = service.generate_batch_with(&[101, 102, 103, 104], false)?;
    for item in &output.items {
        println!("{:>4}  {:<10}  {}", item.invoice_id, item.stage(), item.entry_name());
    }

    let path = std::env::temp_dir().join("tiss_batch.zip");
    fs::write(&path, &output.archive)?;
    println!(
        "wrote {} ({} bytes, {} failed)",
        path.display(),
        output.archive.len(),
        output.failed_count()
    );
    Ok(())
}
