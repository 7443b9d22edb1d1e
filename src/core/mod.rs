//! Core TISS types, checksum primitives, reference tables and validation.
//!
//! This module provides the document model for the ANS TISS hierarchy
//! (lote → guia → procedimentos) and the rules it must satisfy before
//! it is transmitted to an operator.

mod builder;
pub mod checksum;
mod error;
pub mod formats;
mod numbering;
pub mod tables;
mod types;
mod validation;

pub use builder::*;
pub use checksum::{is_valid_cnpj, is_valid_cpf, normalize_tax_id};
pub use error::*;
pub use numbering::*;
pub use tables::{is_known_table_code, table_code_for_category, tuss_code_for};
pub use types::*;
pub use validation::*;
