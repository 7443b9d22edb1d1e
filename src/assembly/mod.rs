//! Assembly of a [`TissDocument`] from an invoice snapshot.
//!
//! Assembly is pure: it reads only the snapshot, the configuration and the
//! injected send time. Identifiers are derived from the invoice id, so the
//! same inputs always produce the same document. Gaps in the snapshot are
//! filled with placeholder values that the validator then reports.

mod config;
mod snapshot;

pub use config::{TissConfig, TissConfigBuilder};
pub use snapshot::{
    Authorization, BilledLine, ClinicIdentity, InvoiceSnapshot, PatientIdentity, PayerIdentity,
    ProfessionalIdentity,
};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::core::formats::{format_date, format_time};
use crate::core::tables::{ANCILLARY_EXAM_CATEGORY, DENTAL_CATEGORY};
use crate::core::{
    Beneficiary, ClaimBuilder, ClaimContent, ClaimKind, Contractor, DentalLine, DocumentBuilder,
    ExamLine, IdentificationBuilder, Payer, Provider, ServiceLine, Sex, TissDocument, TissError,
    normalize_tax_id, table_code_for_category, tuss_code_for,
};

const PLACEHOLDER_CNPJ: &str = "00000000000000";
const PLACEHOLDER_CPF: &str = "00000000000";
const PLACEHOLDER_BIRTH_DATE: &str = "1900-01-01";
const PLACEHOLDER_PROFESSIONAL: &str = "Profissional Padrão";

/// Build one TISS document (one batch, one claim) from an invoice snapshot.
///
/// `sent_at` becomes `dataEnvio`/`horaEnvio`; callers inject it so assembly
/// never reads the wall clock.
///
/// # Errors
///
/// [`TissError::Assembly`] when the snapshot has no billed lines or a line
/// total overflows. Every other gap is defaulted and left for the validator
/// to report.
pub fn assemble(
    snapshot: &InvoiceSnapshot,
    config: &TissConfig,
    sent_at: NaiveDateTime,
) -> Result<TissDocument, TissError> {
    if snapshot.lines.is_empty() {
        return Err(TissError::Assembly(format!(
            "invoice {} has no billed lines",
            snapshot.invoice_id
        )));
    }

    let (content, kind) = claim_content(snapshot, config)?;

    let mut identification = IdentificationBuilder::new(
        provider(snapshot, config),
        payer(snapshot, config),
        beneficiary(snapshot, config),
        contractor(snapshot, config),
        snapshot.issue_date,
        config.numbering.claim_number(snapshot.invoice_id),
    )
    .kind(kind);
    if let Some(auth) = &snapshot.authorization {
        identification = identification.authorization(auth.date, auth.password.clone());
        if let Some(origin) = &auth.origin_claim_number {
            identification = identification.origin_claim_number(origin.clone());
        }
    }

    let mut claim = ClaimBuilder::new(identification.build()).content(content);
    if let Some(note) = &snapshot.note {
        claim = claim.note(note.clone());
    }
    let claim = claim.build()?;

    let doc = DocumentBuilder::new(config.numbering.batch_number(snapshot.invoice_id), sent_at)
        .version(config.version.clone())
        .add_claim(claim)
        .with_computed_total()
        .build_unchecked();

    debug!(
        invoice_id = snapshot.invoice_id,
        claims = doc.batch.claims.len(),
        lines = snapshot.lines.len(),
        "assembled TISS document"
    );
    Ok(doc)
}

/// Map a free-form gender to the `sexo` code.
///
/// Missing values default to `M`. Unrecognized values pass through
/// upper-cased so the validator can report them.
pub fn map_gender(gender: Option<&str>) -> String {
    let Some(raw) = gender.map(str::trim) else {
        return Sex::Male.code().to_string();
    };
    match raw.to_lowercase().as_str() {
        "male" | "masculino" | "m" => Sex::Male.code().to_string(),
        "female" | "feminino" | "f" => Sex::Female.code().to_string(),
        _ => raw.to_uppercase(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn provider(snapshot: &InvoiceSnapshot, config: &TissConfig) -> Provider {
    let clinic = &snapshot.clinic;
    let tax_id = non_empty(&clinic.tax_id)
        .map(normalize_tax_id)
        .unwrap_or_else(|| PLACEHOLDER_CNPJ.to_string());
    let mut provider = Provider::new(tax_id, clinic.name.trim());
    if !config.provider_code.is_empty() {
        provider = provider.provider_code(config.provider_code.clone());
    }
    if let Some(cnes) = non_empty(&clinic.facility_code) {
        provider = provider.facility_code(cnes);
    }
    provider
}

fn payer(snapshot: &InvoiceSnapshot, config: &TissConfig) -> Payer {
    match &snapshot.payer {
        Some(p) => Payer::new(normalize_tax_id(&p.tax_id), p.name.trim(), p.registration.trim()),
        None => Payer::new(
            normalize_tax_id(&config.payer_tax_id),
            config.payer_name.clone(),
            config.payer_registration.clone(),
        ),
    }
}

fn beneficiary(snapshot: &InvoiceSnapshot, config: &TissConfig) -> Beneficiary {
    let patient = &snapshot.patient;
    let cpf = non_empty(&patient.tax_id)
        .map(normalize_tax_id)
        .unwrap_or_else(|| PLACEHOLDER_CPF.to_string());
    let card = non_empty(&patient.card_number)
        .map(str::to_string)
        .unwrap_or_else(|| cpf.clone());
    let birth_date = patient
        .birth_date
        .map(format_date)
        .unwrap_or_else(|| PLACEHOLDER_BIRTH_DATE.to_string());
    let plan = non_empty(&patient.plan_name).unwrap_or(config.default_plan_name.as_str());

    let mut beneficiary = Beneficiary::new(card, patient.full_name(), cpf, birth_date, Sex::Male, plan);
    beneficiary.sex = map_gender(patient.gender.as_deref());
    if let Some(validity) = patient.card_validity {
        beneficiary = beneficiary.card_validity(validity);
    }
    beneficiary
}

fn contractor(snapshot: &InvoiceSnapshot, config: &TissConfig) -> Contractor {
    let Some(professional) = &snapshot.professional else {
        return Contractor::new(
            PLACEHOLDER_CPF,
            PLACEHOLDER_PROFESSIONAL,
            config.default_occupation_code.clone(),
        );
    };
    let cpf = non_empty(&professional.tax_id)
        .map(normalize_tax_id)
        .unwrap_or_else(|| PLACEHOLDER_CPF.to_string());
    let cbo = non_empty(&professional.occupation_code).unwrap_or(config.default_occupation_code.as_str());
    let mut contractor = Contractor::new(cpf, professional.name.trim(), cbo);
    if let Some(number) = non_empty(&professional.license_number) {
        contractor.license_number = Some(number.to_string());
        contractor.council = non_empty(&professional.council).map(str::to_string);
        contractor.council_state = non_empty(&professional.council_state).map(str::to_string);
    }
    contractor
}

fn is_category(line: &BilledLine, category: &str) -> bool {
    line.category.trim().eq_ignore_ascii_case(category)
}

/// Pick the line block: all-dental and all-SADT invoices get their own
/// block, anything else is billed as plain procedures.
fn claim_content(
    snapshot: &InvoiceSnapshot,
    config: &TissConfig,
) -> Result<(ClaimContent, ClaimKind), TissError> {
    let lines = &snapshot.lines;
    if lines.iter().all(|l| is_category(l, DENTAL_CATEGORY)) {
        let dental = lines
            .iter()
            .map(|l| {
                let mut line = DentalLine::new(service_line(l, snapshot, config)?);
                if let Some(tooth) = l.tooth {
                    line = line.tooth(tooth);
                }
                if let Some(face) = l.face {
                    line = line.face(face);
                }
                if let Some(arch) = l.arch {
                    line = line.arch(arch);
                }
                Ok(line)
            })
            .collect::<Result<_, TissError>>()?;
        Ok((ClaimContent::Dental(dental), ClaimKind::Consultation))
    } else if lines.iter().all(|l| is_category(l, ANCILLARY_EXAM_CATEGORY)) {
        let exams = lines
            .iter()
            .map(|l| {
                let mut line = ExamLine::new(service_line(l, snapshot, config)?);
                if let Some(exam_type) = &l.exam_type {
                    line = line.exam_type(exam_type.clone());
                }
                if let Some(location) = &l.exam_location {
                    line = line.location(location.clone());
                }
                Ok(line)
            })
            .collect::<Result<_, TissError>>()?;
        Ok((ClaimContent::AncillaryExam(exams), ClaimKind::AncillaryExam))
    } else {
        let procedures = lines
            .iter()
            .map(|l| service_line(l, snapshot, config))
            .collect::<Result<_, TissError>>()?;
        Ok((ClaimContent::Procedures(procedures), ClaimKind::Consultation))
    }
}

fn service_line(
    line: &BilledLine,
    snapshot: &InvoiceSnapshot,
    config: &TissConfig,
) -> Result<ServiceLine, TissError> {
    let line_total = line.total().ok_or_else(|| {
        TissError::Assembly(format!(
            "invoice {}: line total out of range for {}",
            snapshot.invoice_id,
            line.code.trim()
        ))
    })?;
    let procedure_code = tuss_code_for(line.code.trim())
        .map(str::to_string)
        .unwrap_or_else(|| line.code.trim().to_string());
    let (start_time, end_time) = match (line.start_time, line.end_time) {
        (Some(start), Some(end)) => (format_time(start), format_time(end)),
        _ => (
            config.default_start_time.clone(),
            config.default_end_time.clone(),
        ),
    };
    Ok(ServiceLine {
        table_code: table_code_for_category(&line.category).to_string(),
        procedure_code,
        description: line.description.trim().to_string(),
        quantity: line.quantity,
        unit_price: line.unit_price,
        line_total,
        performed_date: format_date(line.service_date.unwrap_or(snapshot.issue_date)),
        start_time: Some(start_time),
        end_time: Some(end_time),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_mapping() {
        assert_eq!(map_gender(Some("female")), "F");
        assert_eq!(map_gender(Some("Feminino")), "F");
        assert_eq!(map_gender(Some(" m ")), "M");
        assert_eq!(map_gender(Some("MASCULINO")), "M");
        assert_eq!(map_gender(None), "M");
        assert_eq!(map_gender(Some("x")), "X");
    }

    #[test]
    fn full_name_is_trimmed() {
        assert_eq!(PatientIdentity::new("Maria", "").full_name(), "Maria");
        assert_eq!(PatientIdentity::new(" Maria ", " Silva").full_name(), "Maria Silva");
    }
}
