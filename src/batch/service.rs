use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, warn};

use super::archive::write_archive;
use super::item::{BatchItem, ItemStage};
use super::source::{Clock, SnapshotSource, SystemClock};
use crate::assembly::{TissConfig, assemble};
use crate::core::{InvoiceId, Issue, TissDocument, TissError, ValidationReport, validate_with};
use crate::xml::to_tiss_xml;

/// A serialized document plus the warnings found while validating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub invoice_id: InvoiceId,
    pub xml: Vec<u8>,
    /// Empty when validation was skipped.
    pub warnings: Vec<Issue>,
}

/// Result of a batch run: the archive and the per-item outcomes, in input order.
#[derive(Debug)]
pub struct BatchOutput {
    pub archive: Vec<u8>,
    pub items: Vec<BatchItem>,
}

impl BatchOutput {
    pub fn failed(&self) -> impl Iterator<Item = &BatchItem> {
        self.items.iter().filter(|i| i.is_failed())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }
}

/// Entry point for generating TISS documents from stored invoices.
///
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
/// use tiss::batch::{FixedClock, MemorySnapshotSource, TissService};
/// use tiss::*;
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// let snapshot = InvoiceSnapshot::new(
///     1,
///     day,
///     ClinicIdentity::new("Clínica Exemplo").tax_id("11222333000181"),
///     PatientIdentity::new("Maria", "Silva").tax_id("52998224725").gender("F"),
/// )
/// .professional(ProfessionalIdentity::new("Dr. João Souza").tax_id("11144477735"))
/// .line(BilledLine::new("PROCEDURE", "10101012", "Consulta médica", 1, dec!(150.00)));
///
/// let config = TissConfigBuilder::new()
///     .payer("11444777000161", "Saúde Mais", "123456")
///     .build();
/// let service = TissService::with_clock(
///     MemorySnapshotSource::new().with(snapshot),
///     config,
///     FixedClock(day.and_hms_opt(10, 0, 0).unwrap()),
/// );
///
/// let doc = service.generate_one(1, false).unwrap();
/// assert!(String::from_utf8(doc.xml).unwrap().contains("<valorTotalGuia>150.00</valorTotalGuia>"));
/// assert!(matches!(service.generate_one(2, false), Err(TissError::SnapshotNotFound(2))));
/// ```
pub struct TissService<S, C = SystemClock> {
    source: S,
    config: TissConfig,
    clock: C,
}

impl<S: SnapshotSource> TissService<S, SystemClock> {
    pub fn new(source: S, config: TissConfig) -> Self {
        Self::with_clock(source, config, SystemClock)
    }
}

impl<S: SnapshotSource, C: Clock> TissService<S, C> {
    pub fn with_clock(source: S, config: TissConfig, clock: C) -> Self {
        Self {
            source,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &TissConfig {
        &self.config
    }

    fn assemble(&self, invoice_id: InvoiceId) -> Result<TissDocument, TissError> {
        let snapshot = self.source.fetch(invoice_id)?;
        assemble(&snapshot, &self.config, self.clock.now())
    }

    fn validate(&self, doc: &TissDocument) -> ValidationReport {
        validate_with(doc, &self.config.limits)
    }

    /// Generate the XML for one invoice.
    ///
    /// With `skip_validation` the document is serialized unchecked. That is
    /// for human preview only and is logged as a bypass.
    ///
    /// # Errors
    ///
    /// `SnapshotNotFound`, `Assembly`, or `Validation` carrying the full
    /// report. Warnings are returned on success.
    pub fn generate_one(
        &self,
        invoice_id: InvoiceId,
        skip_validation: bool,
    ) -> Result<GeneratedDocument, TissError> {
        let doc = self.assemble(invoice_id)?;
        let warnings = if skip_validation {
            warn!(invoice_id, validation_bypassed = true, "generating TISS XML without validation");
            Vec::new()
        } else {
            self.validate(&doc).into_result()?
        };
        let xml = to_tiss_xml(&doc)?;
        Ok(GeneratedDocument {
            invoice_id,
            xml,
            warnings,
        })
    }

    /// Unvalidated XML for display. Never submit the result.
    pub fn preview(&self, invoice_id: InvoiceId) -> Result<Vec<u8>, TissError> {
        self.generate_one(invoice_id, true).map(|doc| doc.xml)
    }

    /// Assemble and validate without serializing.
    ///
    /// Returns the report whether or not the document is valid; only a
    /// missing or unassemblable invoice is an error.
    pub fn validate_only(&self, invoice_id: InvoiceId) -> Result<ValidationReport, TissError> {
        let doc = self.assemble(invoice_id)?;
        Ok(self.validate(&doc))
    }

    /// Zip archive with one entry per id, validating every document.
    pub fn generate_batch(&self, invoice_ids: &[InvoiceId]) -> Result<Vec<u8>, TissError> {
        self.generate_batch_with(invoice_ids, false)
            .map(|output| output.archive)
    }

    /// Process every id independently and package the results.
    ///
    /// A failing id becomes an `error_<id>.txt` entry; the call itself only
    /// fails when the archive cannot be written. Entries follow input order,
    /// and an id listed more than once gets one entry per listing.
    pub fn generate_batch_with(
        &self,
        invoice_ids: &[InvoiceId],
        skip_validation: bool,
    ) -> Result<BatchOutput, TissError> {
        info!(items = invoice_ids.len(), skip_validation, "starting TISS batch");
        if skip_validation {
            warn!(items = invoice_ids.len(), validation_bypassed = true, "TISS batch without validation");
        }

        #[cfg(feature = "parallel")]
        let mut items: Vec<BatchItem> = invoice_ids
            .par_iter()
            .map(|&id| self.process(id, skip_validation))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let mut items: Vec<BatchItem> = invoice_ids
            .iter()
            .map(|&id| self.process(id, skip_validation))
            .collect();
        number_repeats(&mut items);

        let archive = write_archive(&items)?;
        let output = BatchOutput { archive, items };
        info!(
            items = output.items.len(),
            failed = output.failed_count(),
            bytes = output.archive.len(),
            "finished TISS batch"
        );
        Ok(output)
    }

    fn process(&self, invoice_id: InvoiceId, skip_validation: bool) -> BatchItem {
        let mut item = BatchItem::pending(invoice_id);

        let doc = match self.assemble(invoice_id) {
            Ok(doc) => doc,
            Err(e) => return failed(item, e),
        };
        item.advance(ItemStage::Assembled);

        let warnings = if skip_validation {
            Vec::new()
        } else {
            match self.validate(&doc).into_result() {
                Ok(warnings) => {
                    item.advance(ItemStage::Validated);
                    warnings
                }
                Err(e) => return failed(item, e),
            }
        };

        match to_tiss_xml(&doc) {
            Ok(xml) => item.serialized(xml, warnings),
            Err(e) => failed(item, e),
        }
    }
}

/// Number repeated ids in input order so every entry name is unique.
fn number_repeats(items: &mut [BatchItem]) {
    let mut seen: HashMap<InvoiceId, usize> = HashMap::new();
    for item in items {
        let count = seen.entry(item.invoice_id).or_default();
        *count += 1;
        item.set_occurrence(*count);
    }
}

fn failed(item: BatchItem, error: TissError) -> BatchItem {
    let item = item.fail(error);
    if let Some(error) = item.error() {
        warn!(
            invoice_id = item.invoice_id,
            stage = %item.failed_after().unwrap_or(ItemStage::Pending),
            error = %error,
            "TISS batch item failed"
        );
    }
    item
}
