use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::checksum::{self, TaxIdError};
use super::error::{Issue, RuleClass, ValidationReport};
use super::formats::{is_digits, parse_date, parse_time};
use super::tables::is_known_table_code;
use super::types::*;

/// Structural limits and tolerances applied by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Maximum lines per claim (`procedimentos` per `guia`).
    pub max_lines_per_claim: usize,
    /// Maximum claims per batch (`guias` per `lote`).
    pub max_claims_per_batch: usize,
    /// Hard ceiling for a claim's declared total.
    pub max_claim_total: Decimal,
    /// Totals differing by less than this are considered equal.
    pub tolerance: Decimal,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_lines_per_claim: 50,
            max_claims_per_batch: 1000,
            max_claim_total: dec!(999999.99),
            tolerance: dec!(0.01),
        }
    }
}

const MAX_BATCH_NUMBER_LEN: usize = 20;
const MAX_CLAIM_NUMBER_LEN: usize = 20;
const MAX_NOTE_LEN: usize = 500;
const MAX_DESCRIPTION_LEN: usize = 200;
const MAX_PROCEDURE_CODE_LEN: usize = 10;
const MAX_NAME_LEN: usize = 100;
const MAX_CARD_NUMBER_LEN: usize = 20;
const MAX_PASSWORD_LEN: usize = 20;
const MAX_EXAM_TYPE_LEN: usize = 50;
const MAX_LOCATION_LEN: usize = 100;

/// Validate a document with the default limits.
///
/// Deterministic and side-effect-free. Returns every finding, not just the first.
pub fn validate(doc: &TissDocument) -> ValidationReport {
    validate_with(doc, &ValidationLimits::default())
}

/// Validate a document with explicit limits.
pub fn validate_with(doc: &TissDocument, limits: &ValidationLimits) -> ValidationReport {
    let mut report = ValidationReport::default();

    if doc.version.trim().is_empty() {
        report.push(Issue::error(
            "version",
            "TISS version is required",
            RuleClass::Presence,
        ));
    } else if !SUPPORTED_TISS_VERSIONS.contains(&doc.version.as_str()) {
        report.push(Issue::warning(
            "version",
            format!("TISS version {} may not be supported", doc.version),
            RuleClass::Consistency,
        ));
    }

    validate_batch(&doc.batch, limits, &mut report);

    for (i, claim) in doc.batch.claims.iter().enumerate() {
        validate_claim(claim, i, limits, &mut report);
    }

    report
}

fn validate_batch(batch: &Batch, limits: &ValidationLimits, report: &mut ValidationReport) {
    if required(report, "batch.batchNumber", &batch.batch_number, "batch number") {
        max_len(
            report,
            "batch.batchNumber",
            &batch.batch_number,
            MAX_BATCH_NUMBER_LEN,
            "batch number",
        );
    }

    required_date(report, "batch.sentDate", &batch.sent_date, "sent date");
    if let Some(time) = &batch.sent_time {
        optional_time(report, "batch.sentTime", time, "sent time");
    }

    if batch.claims.is_empty() {
        report.push(Issue::error(
            "batch.claims",
            "batch must contain at least one claim",
            RuleClass::Structure,
        ));
    } else if batch.claims.len() > limits.max_claims_per_batch {
        report.push(Issue::error(
            "batch.claims",
            format!(
                "batch must contain at most {} claims, found {}",
                limits.max_claims_per_batch,
                batch.claims.len()
            ),
            RuleClass::Structure,
        ));
    }

    if let Some(declared) = batch.declared_total {
        if declared.is_sign_negative() {
            report.push(Issue::error(
                "batch.declaredTotal",
                "batch total must not be negative",
                RuleClass::Structure,
            ));
        }
        let computed = checked_total(batch.claims.iter().map(|c| c.declared_total));
        if differs(declared, computed, limits.tolerance) {
            report.push(Issue::warning(
                "batch.declaredTotal",
                format!(
                    "batch total {declared} does not match sum of claim totals {}",
                    display_total(computed)
                ),
                RuleClass::Consistency,
            ));
        }
    }
}

fn validate_claim(
    claim: &Claim,
    index: usize,
    limits: &ValidationLimits,
    report: &mut ValidationReport,
) {
    let prefix = format!("claims[{index}]");

    validate_identification(
        &claim.identification,
        &format!("{prefix}.identification"),
        report,
    );

    let block = format!("{prefix}.{}", claim.content.path_name());
    let line_count = claim.content.len();
    if line_count == 0 {
        report.push(Issue::error(
            block.clone(),
            "claim must contain at least one line",
            RuleClass::Structure,
        ));
    } else if line_count > limits.max_lines_per_claim {
        report.push(Issue::error(
            block.clone(),
            format!(
                "claim must contain at most {} lines, found {line_count}",
                limits.max_lines_per_claim
            ),
            RuleClass::Structure,
        ));
    }

    let expected_table = claim.content.expected_table_code();
    match &claim.content {
        ClaimContent::Procedures(lines) => {
            for (j, line) in lines.iter().enumerate() {
                validate_service_line(line, &format!("{block}[{j}]"), expected_table, limits, report);
            }
        }
        ClaimContent::Dental(lines) => {
            for (j, line) in lines.iter().enumerate() {
                let path = format!("{block}[{j}]");
                validate_service_line(&line.service, &path, expected_table, limits, report);
                validate_dental_detail(line, &path, report);
            }
        }
        ClaimContent::AncillaryExam(lines) => {
            for (j, line) in lines.iter().enumerate() {
                let path = format!("{block}[{j}]");
                validate_service_line(&line.service, &path, expected_table, limits, report);
                if let Some(exam_type) = &line.exam_type {
                    max_len(report, &format!("{path}.examType"), exam_type, MAX_EXAM_TYPE_LEN, "exam type");
                }
                if let Some(location) = &line.location {
                    max_len(report, &format!("{path}.location"), location, MAX_LOCATION_LEN, "execution location");
                }
            }
        }
    }

    let total_path = format!("{prefix}.declaredTotal");
    if claim.declared_total.is_sign_negative() {
        report.push(Issue::error(
            total_path.clone(),
            "claim total must not be negative",
            RuleClass::Structure,
        ));
    }
    if claim.declared_total > limits.max_claim_total {
        report.push(Issue::error(
            total_path.clone(),
            format!(
                "claim total {} exceeds the maximum of {}",
                claim.declared_total, limits.max_claim_total
            ),
            RuleClass::Structure,
        ));
    }
    let computed = checked_total(claim.content.service_lines().iter().map(|l| l.line_total));
    if differs(claim.declared_total, computed, limits.tolerance) {
        report.push(Issue::warning(
            total_path,
            format!(
                "claim total {} does not match sum of line totals {}",
                claim.declared_total,
                display_total(computed)
            ),
            RuleClass::Consistency,
        ));
    }

    if let Some(note) = &claim.note {
        max_len(report, &format!("{prefix}.note"), note, MAX_NOTE_LEN, "note");
    }
}

fn validate_identification(id: &Identification, prefix: &str, report: &mut ValidationReport) {
    // prestador
    let p = format!("{prefix}.provider");
    tax_id(report, &format!("{p}.taxId"), &id.provider.tax_id, TaxIdKind::Cnpj, "provider CNPJ");
    named(report, &format!("{p}.legalName"), &id.provider.legal_name, "provider name");

    // operadora
    let p = format!("{prefix}.payer");
    tax_id(report, &format!("{p}.taxId"), &id.payer.tax_id, TaxIdKind::Cnpj, "payer CNPJ");
    named(report, &format!("{p}.legalName"), &id.payer.legal_name, "payer name");
    let path = format!("{p}.registration");
    if required(report, &path, &id.payer.registration, "ANS registration")
        && !is_digits(&id.payer.registration, 6)
    {
        report.push(Issue::error(
            path,
            "ANS registration must be exactly 6 digits",
            RuleClass::Format,
        ));
    }

    // beneficiario
    let b = &id.beneficiary;
    let p = format!("{prefix}.beneficiary");
    if required(report, &format!("{p}.cardNumber"), &b.card_number, "card number") {
        max_len(report, &format!("{p}.cardNumber"), &b.card_number, MAX_CARD_NUMBER_LEN, "card number");
    }
    named(report, &format!("{p}.fullName"), &b.full_name, "beneficiary name");
    tax_id(report, &format!("{p}.taxId"), &b.tax_id, TaxIdKind::Cpf, "beneficiary CPF");
    required_date(report, &format!("{p}.birthDate"), &b.birth_date, "birth date");
    let path = format!("{p}.sex");
    if required(report, &path, &b.sex, "sex") && Sex::from_code(&b.sex).is_none() {
        report.push(Issue::error(
            path,
            format!("sex must be M or F, found '{}'", b.sex),
            RuleClass::Enumeration,
        ));
    }
    named(report, &format!("{p}.planName"), &b.plan_name, "plan name");
    if let Some(validity) = &b.card_validity {
        optional_date(report, &format!("{p}.cardValidity"), validity, "card validity");
    }

    // contratado
    let c = &id.contractor;
    let p = format!("{prefix}.contractor");
    tax_id(report, &format!("{p}.taxId"), &c.tax_id, TaxIdKind::Cpf, "contractor CPF");
    named(report, &format!("{p}.fullName"), &c.full_name, "contractor name");
    let path = format!("{p}.occupationCode");
    if required(report, &path, &c.occupation_code, "occupation code (CBO)")
        && !is_digits(&c.occupation_code, 4)
    {
        report.push(Issue::error(
            path,
            "occupation code (CBO) must be exactly 4 digits",
            RuleClass::Format,
        ));
    }

    // claim-level identifiers
    required_date(report, &format!("{prefix}.issueDate"), &id.issue_date, "issue date");
    let path = format!("{prefix}.claimNumber");
    if required(report, &path, &id.claim_number, "claim number") {
        max_len(report, &path, &id.claim_number, MAX_CLAIM_NUMBER_LEN, "claim number");
    }
    if let Some(date) = &id.authorization_date {
        optional_date(report, &format!("{prefix}.authorizationDate"), date, "authorization date");
    }
    if let Some(password) = &id.authorization_password {
        max_len(report, &format!("{prefix}.authorizationPassword"), password, MAX_PASSWORD_LEN, "authorization password");
    }
    if let Some(origin) = &id.origin_claim_number {
        max_len(report, &format!("{prefix}.originClaimNumber"), origin, MAX_CLAIM_NUMBER_LEN, "origin claim number");
    }
}

fn validate_service_line(
    line: &ServiceLine,
    prefix: &str,
    expected_table: Option<&'static str>,
    limits: &ValidationLimits,
    report: &mut ValidationReport,
) {
    let path = format!("{prefix}.tableCode");
    if required(report, &path, &line.table_code, "table code") {
        if !is_known_table_code(&line.table_code) {
            report.push(Issue::error(
                path,
                format!("unknown table code '{}'", line.table_code),
                RuleClass::Enumeration,
            ));
        } else if let Some(expected) = expected_table {
            if line.table_code != expected {
                report.push(Issue::warning(
                    path,
                    format!(
                        "table code '{}' does not match the claim block (expected '{expected}')",
                        line.table_code
                    ),
                    RuleClass::Consistency,
                ));
            }
        }
    }

    let path = format!("{prefix}.procedureCode");
    if required(report, &path, &line.procedure_code, "procedure code") {
        max_len(report, &path, &line.procedure_code, MAX_PROCEDURE_CODE_LEN, "procedure code");
    }

    let path = format!("{prefix}.description");
    if required(report, &path, &line.description, "procedure description") {
        max_len(report, &path, &line.description, MAX_DESCRIPTION_LEN, "procedure description");
    }

    if line.quantity == 0 {
        report.push(Issue::error(
            format!("{prefix}.quantity"),
            "quantity must be at least 1",
            RuleClass::Structure,
        ));
    }
    if line.unit_price.is_sign_negative() {
        report.push(Issue::error(
            format!("{prefix}.unitPrice"),
            "unit price must not be negative",
            RuleClass::Structure,
        ));
    }
    if line.line_total.is_sign_negative() {
        report.push(Issue::error(
            format!("{prefix}.lineTotal"),
            "line total must not be negative",
            RuleClass::Structure,
        ));
    }

    let expected = Decimal::from(line.quantity).checked_mul(line.unit_price);
    if differs(line.line_total, expected, limits.tolerance) {
        report.push(Issue::warning(
            format!("{prefix}.lineTotal"),
            format!(
                "line total {} does not match quantity × unit price ({} × {} = {})",
                line.line_total,
                line.quantity,
                line.unit_price,
                display_total(expected)
            ),
            RuleClass::Consistency,
        ));
    }

    required_date(report, &format!("{prefix}.performedDate"), &line.performed_date, "performed date");

    let start = line
        .start_time
        .as_deref()
        .and_then(|t| optional_time(report, &format!("{prefix}.startTime"), t, "start time"));
    let end = line
        .end_time
        .as_deref()
        .and_then(|t| optional_time(report, &format!("{prefix}.endTime"), t, "end time"));
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            report.push(Issue::warning(
                format!("{prefix}.endTime"),
                "end time is before start time",
                RuleClass::Consistency,
            ));
        }
    }
}

fn validate_dental_detail(line: &DentalLine, prefix: &str, report: &mut ValidationReport) {
    if let Some(tooth) = &line.tooth {
        let in_range = tooth.parse::<u8>().is_ok_and(|n| (1..=32).contains(&n));
        if !in_range {
            report.push(Issue::error(
                format!("{prefix}.tooth"),
                format!("tooth number must be between 1 and 32, found '{tooth}'"),
                RuleClass::Enumeration,
            ));
        }
    }
    if let Some(face) = &line.face {
        if ToothFace::from_code(&face.to_ascii_uppercase()).is_none() {
            report.push(Issue::error(
                format!("{prefix}.face"),
                format!("tooth face must be one of V, L, M, D, O, found '{face}'"),
                RuleClass::Enumeration,
            ));
        }
    }
    if let Some(arch) = &line.arch {
        if DentalArch::from_code(&arch.to_ascii_uppercase()).is_none() {
            report.push(Issue::error(
                format!("{prefix}.arch"),
                format!("dental arch must be S (upper) or I (lower), found '{arch}'"),
                RuleClass::Enumeration,
            ));
        }
    }
}

/// Sum that yields `None` instead of overflowing.
fn checked_total(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// `|declared - computed| >= tolerance`. An overflowed total never matches.
fn differs(declared: Decimal, computed: Option<Decimal>, tolerance: Decimal) -> bool {
    match computed.and_then(|c| declared.checked_sub(c)) {
        Some(diff) => diff.abs() >= tolerance,
        None => true,
    }
}

fn display_total(total: Option<Decimal>) -> String {
    total.map_or_else(|| "out of range".to_string(), |t| t.to_string())
}

#[derive(Clone, Copy)]
enum TaxIdKind {
    Cnpj,
    Cpf,
}

/// Presence + format + checksum for a CNPJ/CPF field.
fn tax_id(report: &mut ValidationReport, path: &str, value: &str, kind: TaxIdKind, label: &str) {
    if !required(report, path, value, label) {
        return;
    }
    let result = match kind {
        TaxIdKind::Cnpj => checksum::check_cnpj(value),
        TaxIdKind::Cpf => checksum::check_cpf(value),
    };
    if let Err(e) = result {
        let class = match e {
            TaxIdError::NonDigit | TaxIdError::Length { .. } => RuleClass::Format,
            TaxIdError::RepeatedDigits | TaxIdError::CheckDigits => RuleClass::Checksum,
        };
        report.push(Issue::error(path, format!("invalid {label}: {e}"), class));
    }
}

/// Presence + length for a name field.
fn named(report: &mut ValidationReport, path: &str, value: &str, label: &str) {
    if required(report, path, value, label) {
        max_len(report, path, value, MAX_NAME_LEN, label);
    }
}

/// Push a presence error for an empty value. Returns true when present.
fn required(report: &mut ValidationReport, path: &str, value: &str, label: &str) -> bool {
    if value.trim().is_empty() {
        report.push(Issue::error(
            path,
            format!("{label} is required"),
            RuleClass::Presence,
        ));
        false
    } else {
        true
    }
}

fn max_len(report: &mut ValidationReport, path: &str, value: &str, max: usize, label: &str) {
    let len = value.chars().count();
    if len > max {
        report.push(Issue::error(
            path,
            format!("{label} must be at most {max} characters, found {len}"),
            RuleClass::Format,
        ));
    }
}

fn required_date(report: &mut ValidationReport, path: &str, value: &str, label: &str) {
    if required(report, path, value, label) {
        optional_date(report, path, value, label);
    }
}

fn optional_date(report: &mut ValidationReport, path: &str, value: &str, label: &str) {
    if parse_date(value).is_none() {
        report.push(Issue::error(
            path,
            format!("{label} must be a valid date in YYYY-MM-DD format, found '{value}'"),
            RuleClass::Format,
        ));
    }
}

fn optional_time(
    report: &mut ValidationReport,
    path: &str,
    value: &str,
    label: &str,
) -> Option<chrono::NaiveTime> {
    let parsed = parse_time(value);
    if parsed.is_none() {
        report.push(Issue::error(
            path,
            format!("{label} must be a valid time in HH:MM format, found '{value}'"),
            RuleClass::Format,
        ));
    }
    parsed
}
