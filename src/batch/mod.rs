//! Single-document and batch generation over a snapshot source.
//!
//! [`TissService`] exposes the four operations callers use:
//! [`generate_one`](TissService::generate_one), [`preview`](TissService::preview),
//! [`validate_only`](TissService::validate_only) and
//! [`generate_batch`](TissService::generate_batch). Batch items are isolated
//! from each other: a failing invoice becomes an `error_<id>.txt` entry in
//! the archive instead of aborting the run.
//!
//! With the `parallel` feature items are processed on the rayon pool;
//! archive entries still follow input order.

mod archive;
mod item;
mod service;
mod source;

pub use item::{BatchItem, ItemStage};
pub use service::{BatchOutput, GeneratedDocument, TissService};
pub use source::{Clock, FixedClock, MemorySnapshotSource, SnapshotSource, SystemClock};
