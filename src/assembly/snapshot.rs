//! Invoice snapshot: the read-only input the assembler consumes.
//!
//! Produced by the billing store (out of scope here). Every optional field
//! that is missing is filled with a default during assembly and surfaced
//! later by the validator rather than rejected up front.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{DentalArch, InvoiceId, ToothFace};

/// One invoice, flattened for TISS generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSnapshot {
    pub invoice_id: InvoiceId,
    pub issue_date: NaiveDate,
    pub clinic: ClinicIdentity,
    pub patient: PatientIdentity,
    pub professional: Option<ProfessionalIdentity>,
    /// Operator identity carried by the invoice. Falls back to the clinic configuration.
    pub payer: Option<PayerIdentity>,
    pub authorization: Option<Authorization>,
    pub note: Option<String>,
    pub lines: Vec<BilledLine>,
}

impl InvoiceSnapshot {
    pub fn new(
        invoice_id: InvoiceId,
        issue_date: NaiveDate,
        clinic: ClinicIdentity,
        patient: PatientIdentity,
    ) -> Self {
        Self {
            invoice_id,
            issue_date,
            clinic,
            patient,
            professional: None,
            payer: None,
            authorization: None,
            note: None,
            lines: Vec::new(),
        }
    }

    pub fn professional(mut self, professional: ProfessionalIdentity) -> Self {
        self.professional = Some(professional);
        self
    }

    pub fn payer(mut self, payer: PayerIdentity) -> Self {
        self.payer = Some(payer);
        self
    }

    pub fn authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = Some(authorization);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn line(mut self, line: BilledLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn lines(mut self, lines: impl IntoIterator<Item = BilledLine>) -> Self {
        self.lines.extend(lines);
        self
    }
}

/// The billing clinic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicIdentity {
    pub name: String,
    /// CNPJ, formatted or bare.
    pub tax_id: Option<String>,
    /// CNES facility code.
    pub facility_code: Option<String>,
    pub address: Option<String>,
}

impl ClinicIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tax_id: None,
            facility_code: None,
            address: None,
        }
    }

    pub fn tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    pub fn facility_code(mut self, code: impl Into<String>) -> Self {
        self.facility_code = Some(code.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// The patient (beneficiary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIdentity {
    pub first_name: String,
    pub last_name: String,
    /// CPF, formatted or bare.
    pub tax_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Free-form gender as stored upstream ("female", "masculino", "F", ...).
    pub gender: Option<String>,
    /// Insurance card number. Defaults to the CPF.
    pub card_number: Option<String>,
    pub plan_name: Option<String>,
    pub card_validity: Option<NaiveDate>,
}

impl PatientIdentity {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            tax_id: None,
            birth_date: None,
            gender: None,
            card_number: None,
            plan_name: None,
            card_validity: None,
        }
    }

    pub fn tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    pub fn birth_date(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn card_number(mut self, number: impl Into<String>) -> Self {
        self.card_number = Some(number.into());
        self
    }

    pub fn plan(mut self, name: impl Into<String>, validity: Option<NaiveDate>) -> Self {
        self.plan_name = Some(name.into());
        self.card_validity = validity;
        self
    }

    /// `first_name + " " + last_name`, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// The treating professional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalIdentity {
    pub name: String,
    /// CPF, formatted or bare.
    pub tax_id: Option<String>,
    /// CBO occupation code.
    pub occupation_code: Option<String>,
    pub license_number: Option<String>,
    pub council: Option<String>,
    pub council_state: Option<String>,
}

impl ProfessionalIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tax_id: None,
            occupation_code: None,
            license_number: None,
            council: None,
            council_state: None,
        }
    }

    pub fn tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    pub fn occupation_code(mut self, code: impl Into<String>) -> Self {
        self.occupation_code = Some(code.into());
        self
    }

    pub fn license(
        mut self,
        number: impl Into<String>,
        council: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        self.license_number = Some(number.into());
        self.council = Some(council.into());
        self.council_state = Some(state.into());
        self
    }
}

/// Operator identity carried on the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerIdentity {
    pub tax_id: String,
    pub name: String,
    pub registration: String,
}

impl PayerIdentity {
    pub fn new(
        tax_id: impl Into<String>,
        name: impl Into<String>,
        registration: impl Into<String>,
    ) -> Self {
        Self {
            tax_id: tax_id.into(),
            name: name.into(),
            registration: registration.into(),
        }
    }
}

/// Prior authorization granted by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub date: NaiveDate,
    pub password: String,
    pub origin_claim_number: Option<String>,
}

/// One billed item on the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilledLine {
    /// Internal service category ("PROCEDURE", "ODONTO", "SADT", ...).
    pub category: String,
    /// Internal procedure code, mapped to TUSS when known.
    pub code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub service_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub tooth: Option<u8>,
    pub face: Option<ToothFace>,
    pub arch: Option<DentalArch>,
    pub exam_type: Option<String>,
    pub exam_location: Option<String>,
}

impl BilledLine {
    pub fn new(
        category: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Self {
        Self {
            category: category.into(),
            code: code.into(),
            description: description.into(),
            quantity,
            unit_price,
            service_date: None,
            start_time: None,
            end_time: None,
            tooth: None,
            face: None,
            arch: None,
            exam_type: None,
            exam_location: None,
        }
    }

    pub fn service_date(mut self, date: NaiveDate) -> Self {
        self.service_date = Some(date);
        self
    }

    pub fn times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Dental detail: tooth number, face and arch.
    pub fn dental(mut self, tooth: u8, face: ToothFace, arch: DentalArch) -> Self {
        self.tooth = Some(tooth);
        self.face = Some(face);
        self.arch = Some(arch);
        self
    }

    pub fn exam(mut self, exam_type: impl Into<String>, location: impl Into<String>) -> Self {
        self.exam_type = Some(exam_type.into());
        self.exam_location = Some(location.into());
        self
    }

    /// quantity × unit price, or `None` when the product overflows.
    pub fn total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}
