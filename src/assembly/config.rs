//! Clinic-level TISS configuration.

use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_TISS_VERSION, DocumentNumbering, ValidationLimits};

/// Defaults applied when an invoice snapshot does not carry a value itself.
///
/// Supplies the operator (payer) identity, the default plan and occupation
/// code, and the procedure time window for lines without explicit times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TissConfig {
    /// TISS standard version written to `versao`.
    pub version: String,
    /// Provider code at the operator (`codigoPrestador`).
    pub provider_code: String,
    /// Operator CNPJ. The placeholder default is rejected by the validator.
    pub payer_tax_id: String,
    pub payer_name: String,
    /// ANS registration, 6 digits.
    pub payer_registration: String,
    pub default_plan_name: String,
    /// CBO occupation code used when the professional has none.
    pub default_occupation_code: String,
    /// `HH:MM`
    pub default_start_time: String,
    /// `HH:MM`
    pub default_end_time: String,
    pub numbering: DocumentNumbering,
    pub limits: ValidationLimits,
}

impl Default for TissConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_TISS_VERSION.into(),
            provider_code: "001".into(),
            payer_tax_id: "00000000000000".into(),
            payer_name: "Operadora Padrão".into(),
            payer_registration: "000000".into(),
            default_plan_name: "Plano Padrão".into(),
            default_occupation_code: "2251".into(),
            default_start_time: "08:00".into(),
            default_end_time: "09:00".into(),
            numbering: DocumentNumbering::default(),
            limits: ValidationLimits::default(),
        }
    }
}

#[cfg(feature = "json")]
impl TissConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    ///
    /// ```
    /// let config = tiss::TissConfig::from_json(r#"{"payer_registration": "123456"}"#).unwrap();
    /// assert_eq!(config.payer_registration, "123456");
    /// assert_eq!(config.version, "3.05.02");
    /// ```
    pub fn from_json(json: &str) -> Result<Self, crate::core::TissError> {
        serde_json::from_str(json).map_err(|e| crate::core::TissError::Config(e.to_string()))
    }
}

/// Builder for [`TissConfig`].
///
/// ```
/// use tiss::TissConfigBuilder;
///
/// let config = TissConfigBuilder::new()
///     .payer("11444777000161", "Saúde Mais", "123456")
///     .default_plan_name("Plano Ouro")
///     .build();
/// assert_eq!(config.payer_name, "Saúde Mais");
/// ```
#[derive(Default)]
pub struct TissConfigBuilder {
    config: TissConfig,
}

impl TissConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn provider_code(mut self, code: impl Into<String>) -> Self {
        self.config.provider_code = code.into();
        self
    }

    /// Set the operator identity used when the invoice carries none.
    pub fn payer(
        mut self,
        tax_id: impl Into<String>,
        name: impl Into<String>,
        registration: impl Into<String>,
    ) -> Self {
        self.config.payer_tax_id = tax_id.into();
        self.config.payer_name = name.into();
        self.config.payer_registration = registration.into();
        self
    }

    pub fn default_plan_name(mut self, name: impl Into<String>) -> Self {
        self.config.default_plan_name = name.into();
        self
    }

    pub fn default_occupation_code(mut self, code: impl Into<String>) -> Self {
        self.config.default_occupation_code = code.into();
        self
    }

    /// Set the default procedure window (`HH:MM`).
    pub fn default_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.config.default_start_time = start.into();
        self.config.default_end_time = end.into();
        self
    }

    pub fn numbering(mut self, numbering: DocumentNumbering) -> Self {
        self.config.numbering = numbering;
        self
    }

    pub fn limits(mut self, limits: ValidationLimits) -> Self {
        self.config.limits = limits;
        self
    }

    pub fn build(self) -> TissConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = TissConfig::default();
        assert_eq!(c.version, "3.05.02");
        assert_eq!(c.provider_code, "001");
        assert_eq!(c.default_occupation_code, "2251");
        assert_eq!(c.default_start_time, "08:00");
        assert_eq!(c.limits.max_lines_per_claim, 50);
    }

    #[test]
    fn builder_overrides() {
        let c = TissConfigBuilder::new()
            .version("3.03.00")
            .default_times("13:00", "14:30")
            .build();
        assert_eq!(c.version, "3.03.00");
        assert_eq!(c.default_end_time, "14:30");
        assert_eq!(c.payer_name, "Operadora Padrão");
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_errors_map_to_config() {
        let err = TissConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::core::TissError::Config(_)));
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_nested_limits() {
        let c = TissConfig::from_json(r#"{"limits": {"max_lines_per_claim": 10}}"#).unwrap();
        assert_eq!(c.limits.max_lines_per_claim, 10);
        assert_eq!(c.limits.max_claims_per_batch, 1000);
    }
}
