//! # tiss
//!
//! Generation and validation of ANS TISS (Troca de Informação em Saúde
//! Suplementar) billing documents for Brazilian health-insurance operators.
//!
//! An internal invoice snapshot is assembled into a [`TissDocument`]
//! (batch → claim → procedure lines), checked against the TISS structural,
//! format, checksum and consistency rules, and serialized as namespaced XML.
//! Batches of invoices are packaged into a zip archive with per-item fault
//! isolation.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use tiss::*;
//! use rust_decimal_macros::dec;
//!
//! let snapshot = InvoiceSnapshot::new(
//!     42,
//!     NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
//!     ClinicIdentity::new("Clínica Exemplo").tax_id("11.222.333/0001-81"),
//!     PatientIdentity::new("Maria", "Silva")
//!         .tax_id("529.982.247-25")
//!         .birth_date(NaiveDate::from_ymd_opt(1985, 3, 10).unwrap())
//!         .gender("female"),
//! )
//! .professional(ProfessionalIdentity::new("Dr. João Souza").tax_id("111.444.777-35"))
//! .payer(PayerIdentity::new("11444777000161", "Saúde Mais", "123456"))
//! .line(BilledLine::new("PROCEDURE", "10101012", "Consulta médica", 1, dec!(150.00)));
//!
//! let sent_at = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap().and_hms_opt(10, 30, 0).unwrap();
//! let doc = assemble(&snapshot, &TissConfig::default(), sent_at).unwrap();
//! let report = validate(&doc);
//! assert!(report.is_valid());
//! assert_eq!(doc.batch.claims[0].declared_total, dec!(150.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Document model, reference tables, assembler, validator |
//! | `xml` | TISS XML serialization |
//! | `batch` | `TissService` and zip batch packaging |
//! | `parallel` | Batch items processed on a rayon pool |
//! | `json` | Load `TissConfig` from JSON |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod assembly;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "batch")]
pub mod batch;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::assembly::*;
#[cfg(feature = "core")]
pub use crate::core::*;
