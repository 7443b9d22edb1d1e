use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::assembly::InvoiceSnapshot;
use crate::core::{InvoiceId, TissError};

/// Supplies invoice snapshots by id.
///
/// Implemented by the billing store. A fetch that fails for one id must not
/// affect any other id; return [`TissError::SnapshotNotFound`] when the
/// invoice does not exist.
pub trait SnapshotSource: Send + Sync {
    fn fetch(&self, invoice_id: InvoiceId) -> Result<InvoiceSnapshot, TissError>;
}

impl<F> SnapshotSource for F
where
    F: Fn(InvoiceId) -> Result<InvoiceSnapshot, TissError> + Send + Sync,
{
    fn fetch(&self, invoice_id: InvoiceId) -> Result<InvoiceSnapshot, TissError> {
        self(invoice_id)
    }
}

/// In-memory snapshot store, keyed by invoice id.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotSource {
    snapshots: HashMap<InvoiceId, InvoiceSnapshot>,
}

impl MemorySnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the snapshot stored under its own invoice id.
    pub fn insert(&mut self, snapshot: InvoiceSnapshot) {
        self.snapshots.insert(snapshot.invoice_id, snapshot);
    }

    pub fn with(mut self, snapshot: InvoiceSnapshot) -> Self {
        self.insert(snapshot);
        self
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl FromIterator<InvoiceSnapshot> for MemorySnapshotSource {
    fn from_iter<I: IntoIterator<Item = InvoiceSnapshot>>(iter: I) -> Self {
        let mut source = Self::new();
        for snapshot in iter {
            source.insert(snapshot);
        }
        source
    }
}

impl SnapshotSource for MemorySnapshotSource {
    fn fetch(&self, invoice_id: InvoiceId) -> Result<InvoiceSnapshot, TissError> {
        self.snapshots
            .get(&invoice_id)
            .cloned()
            .ok_or(TissError::SnapshotNotFound(invoice_id))
    }
}

/// Source of the send timestamp (`dataEnvio`/`horaEnvio`).
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
