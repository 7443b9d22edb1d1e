use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Internal invoice identifier used to derive batch/claim numbers and archive entry names.
pub type InvoiceId = u64;

/// TISS standard version written when nothing else is configured.
pub const DEFAULT_TISS_VERSION: &str = "3.05.02";

/// Versions the validator accepts without a warning.
pub const SUPPORTED_TISS_VERSIONS: &[&str] = &["3.05.02", "3.03.00"];

/// Root of a TISS document: one version tag and one batch.
///
/// Built fresh per generation request from an invoice snapshot and never
/// persisted. Dates (`YYYY-MM-DD`) and times (`HH:MM`) are kept in their wire
/// form so the validator can report malformed values coming from upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TissDocument {
    /// `versao`: TISS standard version (e.g. "3.05.02").
    pub version: String,
    /// `lote`: the submission envelope.
    pub batch: Batch,
}

/// `lote`: submission envelope containing 1..=1000 claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// `numeroLote`: at most 20 characters.
    pub batch_number: String,
    /// `dataEnvio`: `YYYY-MM-DD`.
    pub sent_date: String,
    /// `horaEnvio`: `HH:MM`.
    pub sent_time: Option<String>,
    /// `guias`.
    pub claims: Vec<Claim>,
    /// `valorTotalLote`: when present must reconcile with the claim totals.
    pub declared_total: Option<Decimal>,
}

/// `guia`: one billing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// `identificacao`.
    pub identification: Identification,
    /// `procedimentos` | `odonto` | `sadt`.
    pub content: ClaimContent,
    /// `valorTotalGuia`.
    pub declared_total: Decimal,
    /// `observacao`: at most 500 characters.
    pub note: Option<String>,
}

/// The line block of a claim. Exactly one variant per claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimContent {
    /// `procedimentos`: executed procedures.
    Procedures(Vec<ServiceLine>),
    /// `odonto`: dental procedures.
    Dental(Vec<DentalLine>),
    /// `sadt`: ancillary diagnostic and therapy exams.
    AncillaryExam(Vec<ExamLine>),
}

impl ClaimContent {
    /// Number of billed lines in the block.
    pub fn len(&self) -> usize {
        match self {
            Self::Procedures(lines) => lines.len(),
            Self::Dental(lines) => lines.len(),
            Self::AncillaryExam(lines) => lines.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The shared line fields, in order, regardless of variant.
    pub fn service_lines(&self) -> Vec<&ServiceLine> {
        match self {
            Self::Procedures(lines) => lines.iter().collect(),
            Self::Dental(lines) => lines.iter().map(|l| &l.service).collect(),
            Self::AncillaryExam(lines) => lines.iter().map(|l| &l.service).collect(),
        }
    }

    /// Σ line totals, or `None` on overflow.
    pub fn lines_total(&self) -> Option<Decimal> {
        self.service_lines()
            .iter()
            .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.line_total))
    }

    /// Table code every line of this block is expected to carry, if the block
    /// is tied to one table.
    pub fn expected_table_code(&self) -> Option<&'static str> {
        match self {
            Self::Procedures(_) => None,
            Self::Dental(_) => Some(super::tables::DENTAL_TABLE_CODE),
            Self::AncillaryExam(_) => Some(super::tables::ANCILLARY_EXAM_TABLE_CODE),
        }
    }

    /// Path segment used in validation field paths.
    pub fn path_name(&self) -> &'static str {
        match self {
            Self::Procedures(_) => "procedures",
            Self::Dental(_) => "dental",
            Self::AncillaryExam(_) => "exams",
        }
    }
}

/// `identificacao`: the four identity blocks plus claim-level identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub provider: Provider,
    pub payer: Payer,
    pub beneficiary: Beneficiary,
    pub contractor: Contractor,
    /// `dataEmissao`: `YYYY-MM-DD`.
    pub issue_date: String,
    /// `numeroGuia`: at most 20 characters.
    pub claim_number: String,
    /// `tipoGuia`.
    pub kind: ClaimKind,
    /// `dataAutorizacao`: `YYYY-MM-DD`.
    pub authorization_date: Option<String>,
    /// `senha`: authorization password.
    pub authorization_password: Option<String>,
    /// `numeroGuiaOrigem`.
    pub origin_claim_number: Option<String>,
}

/// `prestador`: the billing facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// `cnpj`: 14 digits.
    pub tax_id: String,
    /// `nome`.
    pub legal_name: String,
    /// `codigoPrestador`: provider code at the operator.
    pub provider_code: Option<String>,
    /// `cnes`: national facility registry code.
    pub facility_code: Option<String>,
}

/// `operadora`: the insurer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    /// `cnpj`: 14 digits.
    pub tax_id: String,
    /// `nome`.
    pub legal_name: String,
    /// `registroANS`: exactly 6 digits.
    pub registration: String,
}

/// `beneficiario`: the patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    /// `numeroCarteira`.
    pub card_number: String,
    /// `nome`.
    pub full_name: String,
    /// `cpf`: 11 digits.
    pub tax_id: String,
    /// `dataNascimento`: `YYYY-MM-DD`.
    pub birth_date: String,
    /// `sexo`: "M" or "F" (see [`Sex`]).
    pub sex: String,
    /// `nomePlano`.
    pub plan_name: String,
    /// `validadeCarteira`: `YYYY-MM-DD`.
    pub card_validity: Option<String>,
}

/// `contratado`: the treating professional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contractor {
    /// `cpf`: 11 digits.
    pub tax_id: String,
    /// `nome`.
    pub full_name: String,
    /// `cbo`: occupation code, exactly 4 digits.
    pub occupation_code: String,
    /// `crm`: professional license number.
    pub license_number: Option<String>,
    /// `conselho`: issuing council (CRM, CRO, ...).
    pub council: Option<String>,
    /// `ufConselho`: council state.
    pub council_state: Option<String>,
}

/// Fields shared by every line variant (`procedimento`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLine {
    /// `codigoTabela`: 2-char procedure table code.
    pub table_code: String,
    /// `codigoProcedimento`.
    pub procedure_code: String,
    /// `descricaoProcedimento`: at most 200 characters.
    pub description: String,
    /// `quantidadeExecutada`: at least 1.
    pub quantity: u32,
    /// `valorUnitario`.
    pub unit_price: Decimal,
    /// `valorTotal`: should equal quantity × unit price.
    pub line_total: Decimal,
    /// `dataExecucao`: `YYYY-MM-DD`.
    pub performed_date: String,
    /// `horaInicio`: `HH:MM`.
    pub start_time: Option<String>,
    /// `horaFim`: `HH:MM`.
    pub end_time: Option<String>,
}

/// Dental procedure line (`odonto`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DentalLine {
    pub service: ServiceLine,
    /// `dente`: 1..=32.
    pub tooth: Option<String>,
    /// `face`: see [`ToothFace`].
    pub face: Option<String>,
    /// `arcada`: see [`DentalArch`].
    pub arch: Option<String>,
}

/// Ancillary exam line (`sadt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamLine {
    pub service: ServiceLine,
    /// `tipoExame`.
    pub exam_type: Option<String>,
    /// `localExecucao`.
    pub location: Option<String>,
}

/// `tipoGuia`: claim kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimKind {
    /// 1: Consulta.
    #[default]
    Consultation,
    /// 2: Internação.
    Admission,
    /// 3: SP/SADT.
    AncillaryExam,
}

impl ClaimKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Consultation => "1",
            Self::Admission => "2",
            Self::AncillaryExam => "3",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Consultation),
            "2" => Some(Self::Admission),
            "3" => Some(Self::AncillaryExam),
            _ => None,
        }
    }
}

/// `sexo` domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Self::Male),
            "F" => Some(Self::Female),
            _ => None,
        }
    }
}

/// `face` domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToothFace {
    /// V: vestibular.
    Vestibular,
    /// L: lingual.
    Lingual,
    /// M: mesial.
    Mesial,
    /// D: distal.
    Distal,
    /// O: occlusal.
    Occlusal,
}

impl ToothFace {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Vestibular => "V",
            Self::Lingual => "L",
            Self::Mesial => "M",
            Self::Distal => "D",
            Self::Occlusal => "O",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "V" => Some(Self::Vestibular),
            "L" => Some(Self::Lingual),
            "M" => Some(Self::Mesial),
            "D" => Some(Self::Distal),
            "O" => Some(Self::Occlusal),
            _ => None,
        }
    }
}

/// `arcada` domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DentalArch {
    /// S: superior.
    Upper,
    /// I: inferior.
    Lower,
}

impl DentalArch {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Upper => "S",
            Self::Lower => "I",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(Self::Upper),
            "I" => Some(Self::Lower),
            _ => None,
        }
    }
}
