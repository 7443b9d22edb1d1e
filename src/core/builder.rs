use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use super::error::TissError;
use super::formats::{format_date, format_time};
use super::types::*;
use super::validation;

/// Builder for a complete TISS document.
///
/// ```
/// use tiss::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// let identification = IdentificationBuilder::new(
///     Provider::new("11222333000181", "Clínica Exemplo"),
///     Payer::new("11444777000161", "Saúde Mais", "123456"),
///     Beneficiary::new("52998224725", "Maria Silva", "52998224725", "1985-03-10", Sex::Female, "Plano Ouro"),
///     Contractor::new("11144477735", "Dr. João Souza", "2251"),
///     day,
///     "GUIA000001",
/// )
/// .build();
///
/// let claim = ClaimBuilder::new(identification)
///     .procedures(vec![ServiceLineBuilder::new("02", "10101012", "Consulta médica", 1, dec!(150), day).build().unwrap()])
///     .build()
///     .unwrap();
///
/// let doc = DocumentBuilder::new("LOTE000001", day.and_hms_opt(9, 0, 0).unwrap())
///     .add_claim(claim)
///     .build()
///     .unwrap();
/// assert_eq!(doc.batch.claims[0].declared_total, dec!(150));
/// ```
pub struct DocumentBuilder {
    version: String,
    batch_number: String,
    sent_at: NaiveDateTime,
    claims: Vec<Claim>,
    declared_total: Option<Decimal>,
}

impl DocumentBuilder {
    pub fn new(batch_number: impl Into<String>, sent_at: NaiveDateTime) -> Self {
        Self {
            version: DEFAULT_TISS_VERSION.to_string(),
            batch_number: batch_number.into(),
            sent_at,
            claims: Vec::new(),
            declared_total: None,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn add_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    pub fn claims(mut self, claims: Vec<Claim>) -> Self {
        self.claims.extend(claims);
        self
    }

    /// Declare `valorTotalLote` explicitly.
    pub fn declared_total(mut self, total: Decimal) -> Self {
        self.declared_total = Some(total);
        self
    }

    /// Declare `valorTotalLote` as Σ claim totals. Left undeclared if the
    /// sum overflows.
    pub fn with_computed_total(mut self) -> Self {
        self.declared_total = self
            .claims
            .iter()
            .try_fold(Decimal::ZERO, |acc, c| acc.checked_add(c.declared_total));
        self
    }

    /// Build and validate. Returns the full report on any blocking error.
    pub fn build(self) -> Result<TissDocument, TissError> {
        let doc = self.build_unchecked();
        let report = validation::validate(&doc);
        if !report.is_valid() {
            return Err(TissError::Validation(report));
        }
        Ok(doc)
    }

    /// Build without validation. Used for previews and tests.
    pub fn build_unchecked(self) -> TissDocument {
        TissDocument {
            version: self.version,
            batch: Batch {
                batch_number: self.batch_number,
                sent_date: format_date(self.sent_at.date()),
                sent_time: Some(format_time(self.sent_at.time())),
                claims: self.claims,
                declared_total: self.declared_total,
            },
        }
    }
}

/// Builder for the `identificacao` block.
pub struct IdentificationBuilder {
    provider: Provider,
    payer: Payer,
    beneficiary: Beneficiary,
    contractor: Contractor,
    issue_date: NaiveDate,
    claim_number: String,
    kind: ClaimKind,
    authorization_date: Option<NaiveDate>,
    authorization_password: Option<String>,
    origin_claim_number: Option<String>,
}

impl IdentificationBuilder {
    pub fn new(
        provider: Provider,
        payer: Payer,
        beneficiary: Beneficiary,
        contractor: Contractor,
        issue_date: NaiveDate,
        claim_number: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            payer,
            beneficiary,
            contractor,
            issue_date,
            claim_number: claim_number.into(),
            kind: ClaimKind::default(),
            authorization_date: None,
            authorization_password: None,
            origin_claim_number: None,
        }
    }

    pub fn kind(mut self, kind: ClaimKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn authorization(mut self, date: NaiveDate, password: impl Into<String>) -> Self {
        self.authorization_date = Some(date);
        self.authorization_password = Some(password.into());
        self
    }

    pub fn origin_claim_number(mut self, number: impl Into<String>) -> Self {
        self.origin_claim_number = Some(number.into());
        self
    }

    pub fn build(self) -> Identification {
        Identification {
            provider: self.provider,
            payer: self.payer,
            beneficiary: self.beneficiary,
            contractor: self.contractor,
            issue_date: format_date(self.issue_date),
            claim_number: self.claim_number,
            kind: self.kind,
            authorization_date: self.authorization_date.map(format_date),
            authorization_password: self.authorization_password,
            origin_claim_number: self.origin_claim_number,
        }
    }
}

/// Builder for a claim (`guia`).
pub struct ClaimBuilder {
    identification: Identification,
    content: Option<ClaimContent>,
    declared_total: Option<Decimal>,
    note: Option<String>,
}

impl ClaimBuilder {
    pub fn new(identification: Identification) -> Self {
        Self {
            identification,
            content: None,
            declared_total: None,
            note: None,
        }
    }

    pub fn procedures(mut self, lines: Vec<ServiceLine>) -> Self {
        self.content = Some(ClaimContent::Procedures(lines));
        self
    }

    pub fn dental(mut self, lines: Vec<DentalLine>) -> Self {
        self.content = Some(ClaimContent::Dental(lines));
        self
    }

    pub fn exams(mut self, lines: Vec<ExamLine>) -> Self {
        self.content = Some(ClaimContent::AncillaryExam(lines));
        self
    }

    pub fn content(mut self, content: ClaimContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Override `valorTotalGuia`. Defaults to Σ line totals.
    pub fn declared_total(mut self, total: Decimal) -> Self {
        self.declared_total = Some(total);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn build(self) -> Result<Claim, TissError> {
        let content = self
            .content
            .ok_or_else(|| TissError::Assembly("claim line block is required".into()))?;
        let declared_total = match self.declared_total {
            Some(total) => total,
            None => content
                .lines_total()
                .ok_or_else(|| TissError::Assembly("claim total out of range".into()))?,
        };
        Ok(Claim {
            identification: self.identification,
            content,
            declared_total,
            note: self.note,
        })
    }
}

/// Builder for the fields shared by every line variant.
pub struct ServiceLineBuilder {
    table_code: String,
    procedure_code: String,
    description: String,
    quantity: u32,
    unit_price: Decimal,
    line_total: Option<Decimal>,
    performed_date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
}

impl ServiceLineBuilder {
    pub fn new(
        table_code: impl Into<String>,
        procedure_code: impl Into<String>,
        description: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
        performed_date: NaiveDate,
    ) -> Self {
        Self {
            table_code: table_code.into(),
            procedure_code: procedure_code.into(),
            description: description.into(),
            quantity,
            unit_price,
            line_total: None,
            performed_date,
            start_time: None,
            end_time: None,
        }
    }

    pub fn times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Override `valorTotal`. Defaults to quantity × unit price.
    pub fn line_total(mut self, total: Decimal) -> Self {
        self.line_total = Some(total);
        self
    }

    /// # Errors
    ///
    /// [`TissError::Assembly`] when quantity × unit price overflows and no
    /// explicit total was given.
    pub fn build(self) -> Result<ServiceLine, TissError> {
        let line_total = match self.line_total {
            Some(total) => total,
            None => Decimal::from(self.quantity)
                .checked_mul(self.unit_price)
                .ok_or_else(|| TissError::Assembly("line total out of range".into()))?,
        };
        Ok(ServiceLine {
            table_code: self.table_code,
            procedure_code: self.procedure_code,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            line_total,
            performed_date: format_date(self.performed_date),
            start_time: self.start_time.map(format_time),
            end_time: self.end_time.map(format_time),
        })
    }
}

impl DentalLine {
    pub fn new(service: ServiceLine) -> Self {
        Self {
            service,
            tooth: None,
            face: None,
            arch: None,
        }
    }

    pub fn tooth(mut self, tooth: u8) -> Self {
        self.tooth = Some(tooth.to_string());
        self
    }

    pub fn face(mut self, face: ToothFace) -> Self {
        self.face = Some(face.code().to_string());
        self
    }

    pub fn arch(mut self, arch: DentalArch) -> Self {
        self.arch = Some(arch.code().to_string());
        self
    }
}

impl ExamLine {
    pub fn new(service: ServiceLine) -> Self {
        Self {
            service,
            exam_type: None,
            location: None,
        }
    }

    pub fn exam_type(mut self, exam_type: impl Into<String>) -> Self {
        self.exam_type = Some(exam_type.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl Provider {
    pub fn new(tax_id: impl Into<String>, legal_name: impl Into<String>) -> Self {
        Self {
            tax_id: tax_id.into(),
            legal_name: legal_name.into(),
            provider_code: None,
            facility_code: None,
        }
    }

    pub fn provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn facility_code(mut self, code: impl Into<String>) -> Self {
        self.facility_code = Some(code.into());
        self
    }
}

impl Payer {
    pub fn new(
        tax_id: impl Into<String>,
        legal_name: impl Into<String>,
        registration: impl Into<String>,
    ) -> Self {
        Self {
            tax_id: tax_id.into(),
            legal_name: legal_name.into(),
            registration: registration.into(),
        }
    }
}

impl Beneficiary {
    pub fn new(
        card_number: impl Into<String>,
        full_name: impl Into<String>,
        tax_id: impl Into<String>,
        birth_date: impl Into<String>,
        sex: Sex,
        plan_name: impl Into<String>,
    ) -> Self {
        Self {
            card_number: card_number.into(),
            full_name: full_name.into(),
            tax_id: tax_id.into(),
            birth_date: birth_date.into(),
            sex: sex.code().to_string(),
            plan_name: plan_name.into(),
            card_validity: None,
        }
    }

    pub fn card_validity(mut self, date: NaiveDate) -> Self {
        self.card_validity = Some(format_date(date));
        self
    }
}

impl Contractor {
    pub fn new(
        tax_id: impl Into<String>,
        full_name: impl Into<String>,
        occupation_code: impl Into<String>,
    ) -> Self {
        Self {
            tax_id: tax_id.into(),
            full_name: full_name.into(),
            occupation_code: occupation_code.into(),
            license_number: None,
            council: None,
            council_state: None,
        }
    }

    /// Professional license (e.g. CRM 123456 / SP).
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
