//! Reference tables: internal service category → TISS table code, and
//! internal procedure code → TUSS procedure code.
//!
//! Both are immutable, process-wide and sorted for binary search, so they
//! can be shared by concurrent batch workers without locking.

/// Table code used for lines whose category is not mapped.
pub const OTHER_TABLE_CODE: &str = "99";
/// Table code every dental line must carry.
pub const DENTAL_TABLE_CODE: &str = "05";
/// Table code every ancillary exam (SADT) line must carry.
pub const ANCILLARY_EXAM_TABLE_CODE: &str = "06";

/// Internal category name for dental services.
pub const DENTAL_CATEGORY: &str = "ODONTO";
/// Internal category name for ancillary exams.
pub const ANCILLARY_EXAM_CATEGORY: &str = "SADT";

/// Sorted (category, table code) pairs.
static CATEGORY_TABLE_CODES: &[(&str, &str)] = &[
    ("CONSULTATION", "01"), // Consultas
    ("EXAM", "03"),         // Exames
    ("MEDICATION", "04"),   // Medicamentos
    ("ODONTO", "05"),       // Odontologia
    ("OTHER", "99"),        // Outros
    ("PROCEDURE", "02"),    // Procedimentos
    ("SADT", "06"),         // Serviços auxiliares de diagnóstico e terapia
];

/// Sorted set of table codes the validator accepts.
static KNOWN_TABLE_CODES: &[&str] = &["01", "02", "03", "04", "05", "06", "99"];

/// A TUSS table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TussEntry {
    /// Internal service item code.
    pub internal_code: &'static str,
    /// TUSS procedure code.
    pub tuss_code: &'static str,
    pub description: &'static str,
}

/// Sorted by internal code.
static TUSS_CODES: &[TussEntry] = &[
    tuss("10101012", "10101012", "Consulta médica"),
    tuss("10101013", "10101013", "Consulta de retorno"),
    tuss("20101010", "20101010", "Eletrocardiograma"),
    tuss("20101011", "20101011", "Ecocardiograma"),
    tuss("30101010", "30101010", "Curativo simples"),
    tuss("30101020", "30101020", "Aplicação de injeção"),
    tuss("40301010", "40301010", "Hemograma completo"),
    tuss("40301011", "40301011", "Glicemia de jejum"),
    tuss("40301012", "40301012", "Colesterol total"),
    tuss("50101010", "50101010", "Consulta odontológica"),
    tuss("50101011", "50101011", "Profilaxia"),
    tuss("50101012", "50101012", "Restauração"),
    tuss("60101010", "60101010", "Ultrassonografia"),
    tuss("60101011", "60101011", "Radiografia"),
    tuss("60101012", "60101012", "Tomografia"),
];

const fn tuss(
    internal_code: &'static str,
    tuss_code: &'static str,
    description: &'static str,
) -> TussEntry {
    TussEntry {
        internal_code,
        tuss_code,
        description,
    }
}

/// Table code for an internal service category. Unmapped categories fall
/// back to [`OTHER_TABLE_CODE`]; matching ignores ASCII case.
pub fn table_code_for_category(category: &str) -> &'static str {
    let key = category.trim().to_ascii_uppercase();
    CATEGORY_TABLE_CODES
        .binary_search_by(|(c, _)| c.cmp(&key.as_str()))
        .map(|i| CATEGORY_TABLE_CODES[i].1)
        .unwrap_or(OTHER_TABLE_CODE)
}

/// Check whether `code` is a known TISS table code.
pub fn is_known_table_code(code: &str) -> bool {
    KNOWN_TABLE_CODES.binary_search(&code).is_ok()
}

/// TUSS entry for an internal procedure code, if mapped.
pub fn tuss_entry(internal_code: &str) -> Option<&'static TussEntry> {
    TUSS_CODES
        .binary_search_by(|e| e.internal_code.cmp(internal_code))
        .ok()
        .map(|i| &TUSS_CODES[i])
}

/// TUSS procedure code for an internal code, if mapped.
pub fn tuss_code_for(internal_code: &str) -> Option<&'static str> {
    tuss_entry(internal_code).map(|e| e.tuss_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_sorted() {
        assert!(CATEGORY_TABLE_CODES.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(KNOWN_TABLE_CODES.windows(2).all(|w| w[0] < w[1]));
        assert!(TUSS_CODES.windows(2).all(|w| w[0].internal_code < w[1].internal_code));
    }

    #[test]
    fn category_lookup() {
        assert_eq!(table_code_for_category("PROCEDURE"), "02");
        assert_eq!(table_code_for_category("odonto"), "05");
        assert_eq!(table_code_for_category("SADT"), "06");
        assert_eq!(table_code_for_category("SURGERY"), "99");
        assert_eq!(table_code_for_category(""), "99");
    }

    #[test]
    fn every_mapped_table_code_is_known() {
        for (_, code) in CATEGORY_TABLE_CODES {
            assert!(is_known_table_code(code), "{code}");
        }
        assert!(!is_known_table_code("07"));
    }

    #[test]
    fn tuss_lookup() {
        assert_eq!(tuss_code_for("10101012"), Some("10101012"));
        assert_eq!(tuss_entry("60101011").unwrap().description, "Radiografia");
        assert_eq!(tuss_code_for("INTERNAL-1"), None);
    }
}
