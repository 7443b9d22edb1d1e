use std::fmt;

use crate::core::{InvoiceId, Issue, TissError};

/// Where a batch item is in its lifecycle.
///
/// `Pending → Assembled → Validated → Serialized` on success;
/// any stage may move to `Failed`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStage {
    Pending,
    Assembled,
    Validated,
    Serialized,
    Failed,
}

impl ItemStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assembled => "assembled",
            Self::Validated => "validated",
            Self::Serialized => "serialized",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Serialized | Self::Failed)
    }
}

impl fmt::Display for ItemStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One invoice's passage through a batch run.
#[derive(Debug)]
pub struct BatchItem {
    pub invoice_id: InvoiceId,
    /// 1 for the first time an id appears in a batch, 2 for its repeat, ...
    occurrence: usize,
    stage: ItemStage,
    failed_after: Option<ItemStage>,
    xml: Option<Vec<u8>>,
    warnings: Vec<Issue>,
    error: Option<TissError>,
}

impl BatchItem {
    pub(crate) fn pending(invoice_id: InvoiceId) -> Self {
        Self {
            invoice_id,
            occurrence: 1,
            stage: ItemStage::Pending,
            failed_after: None,
            xml: None,
            warnings: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn set_occurrence(&mut self, occurrence: usize) {
        self.occurrence = occurrence;
    }

    pub(crate) fn advance(&mut self, stage: ItemStage) {
        debug_assert!(!self.stage.is_terminal(), "advance from {}", self.stage);
        self.stage = stage;
    }

    pub(crate) fn serialized(mut self, xml: Vec<u8>, warnings: Vec<Issue>) -> Self {
        self.advance(ItemStage::Serialized);
        self.xml = Some(xml);
        self.warnings = warnings;
        self
    }

    pub(crate) fn fail(mut self, error: TissError) -> Self {
        self.failed_after = Some(self.stage);
        self.stage = ItemStage::Failed;
        self.error = Some(error);
        self
    }

    pub fn stage(&self) -> ItemStage {
        self.stage
    }

    /// The last stage reached before the item failed.
    pub fn failed_after(&self) -> Option<ItemStage> {
        self.failed_after
    }

    pub fn is_failed(&self) -> bool {
        self.stage == ItemStage::Failed
    }

    pub fn xml(&self) -> Option<&[u8]> {
        self.xml.as_deref()
    }

    pub fn warnings(&self) -> &[Issue] {
        &self.warnings
    }

    pub fn error(&self) -> Option<&TissError> {
        self.error.as_ref()
    }

    pub fn occurrence(&self) -> usize {
        self.occurrence
    }

    /// `<id>.xml` for a serialized item, `error_<id>.txt` otherwise.
    /// Repeats of an id within a batch get an `_<n>` suffix.
    pub fn entry_name(&self) -> String {
        let stem = match self.occurrence {
            0 | 1 => self.invoice_id.to_string(),
            n => format!("{}_{n}", self.invoice_id),
        };
        if self.xml.is_some() {
            format!("{stem}.xml")
        } else {
            format!("error_{stem}.txt")
        }
    }

    /// Archive entry content: the XML, or the error descriptor.
    pub fn entry_bytes(&self) -> Vec<u8> {
        match &self.xml {
            Some(xml) => xml.clone(),
            None => self.error_descriptor().into_bytes(),
        }
    }

    fn error_descriptor(&self) -> String {
        let mut text = format!("Error generating TISS XML for invoice {}: ", self.invoice_id);
        match &self.error {
            Some(error) => text.push_str(&error.to_string()),
            None => text.push_str("unknown error"),
        }
        text.push('\n');
        if let Some(report) = self.error.as_ref().and_then(TissError::report) {
            for issue in report.issues() {
                text.push_str(&format!("- {issue}\n"));
            }
        }
        text
    }
}
