use std::fmt;

use thiserror::Error;

use super::types::InvoiceId;

/// Errors that can occur while assembling, validating, serializing or
/// packaging TISS documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TissError {
    /// The snapshot source could not supply the invoice.
    #[error("invoice {0} not found")]
    SnapshotNotFound(InvoiceId),

    /// The snapshot is structurally incomplete (e.g. zero billed lines).
    #[error("assembly error: {0}")]
    Assembly(String),

    /// One or more validation rules failed. Carries the full report.
    #[error("TISS validation failed: {}", .0.error_summary())]
    Validation(ValidationReport),

    /// XML generation failed. Not expected for a well-formed document model.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Building the batch archive failed.
    #[error("archive error: {0}")]
    Archive(String),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

impl TissError {
    /// The validation report, if this is a validation failure.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Validation(report) => Some(report),
            _ => None,
        }
    }
}

/// Whether a finding blocks generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Blocks generation.
    Error,
    /// Reported alongside a successful result; never blocks.
    Warning,
}

/// The rule class a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleClass {
    /// Mandatory field is empty.
    Presence,
    /// Date, time, length or digit pattern is wrong.
    Format,
    /// CNPJ/CPF check digits do not match.
    Checksum,
    /// Value is outside its enumerated domain.
    Enumeration,
    /// Count or ceiling limits.
    Structure,
    /// Cross-field arithmetic or coding mismatch.
    Consistency,
}

impl RuleClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Format => "format",
            Self::Checksum => "checksum",
            Self::Enumeration => "enumeration",
            Self::Structure => "structure",
            Self::Consistency => "consistency",
        }
    }
}

/// A single validation finding with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Path to the offending field (e.g. "claims[0].identification.provider.taxId").
    pub field: String,
    /// Human-readable description.
    pub message: String,
    pub severity: Severity,
    pub class: RuleClass,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.class.as_str(), self.field, self.message)
    }
}

impl Issue {
    /// Create a blocking finding.
    pub fn error(
        field: impl Into<String>,
        message: impl Into<String>,
        class: RuleClass,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
            class,
        }
    }

    /// Create a non-blocking finding.
    pub fn warning(
        field: impl Into<String>,
        message: impl Into<String>,
        class: RuleClass,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
            class,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome of validating a document: blocking errors and soft warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    /// True when no blocking errors were found. Warnings never affect this.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_errors(&self) -> usize {
        self.errors.len()
    }

    pub fn total_warnings(&self) -> usize {
        self.warnings.len()
    }

    /// All findings, errors first.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub(crate) fn push(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    /// `Ok(warnings)` when valid, otherwise the whole report as an error.
    pub fn into_result(self) -> Result<Vec<Issue>, TissError> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(TissError::Validation(self))
        }
    }

    /// Errors joined into one line, for logs and error artifacts.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_affect_validity() {
        let mut report = ValidationReport::default();
        report.push(Issue::warning("batch.declaredTotal", "mismatch", RuleClass::Consistency));
        assert!(report.is_valid());
        assert_eq!(report.total_warnings(), 1);

        report.push(Issue::error("version", "required", RuleClass::Presence));
        assert!(!report.is_valid());
        assert_eq!(report.issues().count(), 2);
    }

    #[test]
    fn validation_error_display_lists_errors() {
        let mut report = ValidationReport::default();
        report.push(Issue::error("a", "first", RuleClass::Presence));
        report.push(Issue::error("b", "second", RuleClass::Format));
        let err = report.into_result().unwrap_err();
        assert_eq!(err.to_string(), "TISS validation failed: a: first; b: second");
        assert_eq!(err.report().unwrap().total_errors(), 2);
    }

    #[test]
    fn issue_display() {
        let issue = Issue::error(
            "claims[0].identification.payer.taxId",
            "invalid CNPJ check digits",
            RuleClass::Checksum,
        );
        assert_eq!(
            issue.to_string(),
            "[checksum] claims[0].identification.payer.taxId: invalid CNPJ check digits"
        );
    }
}
