use serde::{Deserialize, Serialize};

use super::types::InvoiceId;

/// Deterministic batch and claim numbers derived from the invoice id.
///
/// Numbers have the form `{prefix}{id:0>width}`, e.g. "LOTE000042" and
/// "GUIA000042". The same invoice id always yields the same numbers, so
/// re-generating a document never changes its identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentNumbering {
    pub batch_prefix: String,
    pub claim_prefix: String,
    pub zero_pad: usize,
}

impl Default for DocumentNumbering {
    fn default() -> Self {
        Self {
            batch_prefix: "LOTE".into(),
            claim_prefix: "GUIA".into(),
            zero_pad: 6,
        }
    }
}

impl DocumentNumbering {
    /// Set zero-padding width (default: 6, so "000042").
    pub fn with_padding(mut self, width: usize) -> Self {
        self.zero_pad = width;
        self
    }

    /// `numeroLote` for an invoice.
    pub fn batch_number(&self, invoice_id: InvoiceId) -> String {
        format!(
            "{}{:0>width$}",
            self.batch_prefix,
            invoice_id,
            width = self.zero_pad
        )
    }

    /// `numeroGuia` for an invoice.
    pub fn claim_number(&self, invoice_id: InvoiceId) -> String {
        format!(
            "{}{:0>width$}",
            self.claim_prefix,
            invoice_id,
            width = self.zero_pad
        )
    }
}
