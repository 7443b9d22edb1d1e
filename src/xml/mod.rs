//! TISS XML serialization.
//!
//! Elements are written in the fixed order the ANS schema mandates:
//! `lote` → `guias` → `guia` → `identificacao` → line block → totals.
//! The serializer performs no semantic validation; run
//! [`validate`](crate::core::validate) first.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use tiss::*;
//!
//! let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let snapshot = InvoiceSnapshot::new(
//!     1,
//!     day,
//!     ClinicIdentity::new("Clínica Exemplo").tax_id("11222333000181"),
//!     PatientIdentity::new("Maria", "Silva").tax_id("52998224725"),
//! )
//! .line(BilledLine::new("PROCEDURE", "10101012", "Consulta médica", 1, dec!(150.00)));
//! let config = TissConfigBuilder::new()
//!     .payer("11444777000161", "Saúde Mais", "123456")
//!     .build();
//!
//! let doc = assemble(&snapshot, &config, day.and_hms_opt(9, 0, 0).unwrap()).unwrap();
//! let xml = tiss::xml::to_tiss_string(&doc).unwrap();
//! assert!(xml.contains("<numeroLote>LOTE000001</numeroLote>"));
//! assert!(xml.contains("<valorTotalGuia>150.00</valorTotalGuia>"));
//! ```

mod serialize;
pub(crate) mod writer;

pub use serialize::{to_tiss_string, to_tiss_xml};

/// Default namespace of every TISS document.
pub const TISS_NAMESPACE: &str = "http://www.ans.gov.br/padroes/tiss/schemas";

/// XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// `xsi:schemaLocation` value for a TISS version, e.g.
/// `... tissV3_05_02.xsd` for "3.05.02".
///
/// ```
/// assert!(tiss::xml::schema_location("3.05.02").ends_with("/tissV3_05_02.xsd"));
/// ```
pub fn schema_location(version: &str) -> String {
    format!(
        "{TISS_NAMESPACE} {TISS_NAMESPACE}/tissV{}.xsd",
        version.replace('.', "_")
    )
}
