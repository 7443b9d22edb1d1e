//! CNPJ and CPF check-digit validation.
//!
//! Both identifiers end in two mod-11 check digits. Each digit is the weighted
//! sum of the preceding digits modulo 11, mapped as `r < 2 → 0, else 11 − r`.

use std::fmt;

const CNPJ_WEIGHTS_1: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_WEIGHTS_2: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CPF_WEIGHTS_1: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const CPF_WEIGHTS_2: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];

/// Why a tax identifier was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdError {
    /// Contains something other than ASCII digits.
    NonDigit,
    /// Wrong number of digits.
    Length { expected: usize, actual: usize },
    /// All digits identical (placeholder value).
    RepeatedDigits,
    /// Check digits do not match.
    CheckDigits,
}

impl fmt::Display for TaxIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonDigit => write!(f, "must contain only digits"),
            Self::Length { expected, actual } => {
                write!(f, "must have {expected} digits, found {actual}")
            }
            Self::RepeatedDigits => write!(f, "must not consist of a single repeated digit"),
            Self::CheckDigits => write!(f, "check digits do not match"),
        }
    }
}

impl std::error::Error for TaxIdError {}

/// Strip punctuation (".", "/", "-", spaces) from a formatted CNPJ/CPF.
///
/// ```
/// assert_eq!(tiss::normalize_tax_id("11.222.333/0001-81"), "11222333000181");
/// ```
pub fn normalize_tax_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '.' | '/' | '-' | ' '))
        .collect()
}

/// Check a 14-digit CNPJ (digits only).
pub fn check_cnpj(cnpj: &str) -> Result<(), TaxIdError> {
    let digits = parse_digits(cnpj, 14)?;
    let d1 = check_digit(&digits[..12], &CNPJ_WEIGHTS_1);
    let d2 = check_digit(&digits[..13], &CNPJ_WEIGHTS_2);
    if digits[12] == d1 && digits[13] == d2 {
        Ok(())
    } else {
        Err(TaxIdError::CheckDigits)
    }
}

/// Check an 11-digit CPF (digits only).
pub fn check_cpf(cpf: &str) -> Result<(), TaxIdError> {
    let digits = parse_digits(cpf, 11)?;
    let d1 = check_digit(&digits[..9], &CPF_WEIGHTS_1);
    let d2 = check_digit(&digits[..10], &CPF_WEIGHTS_2);
    if digits[9] == d1 && digits[10] == d2 {
        Ok(())
    } else {
        Err(TaxIdError::CheckDigits)
    }
}

pub fn is_valid_cnpj(cnpj: &str) -> bool {
    check_cnpj(cnpj).is_ok()
}

pub fn is_valid_cpf(cpf: &str) -> bool {
    check_cpf(cpf).is_ok()
}

/// Compute the two check digits for the first 12 digits of a CNPJ.
/// Returns `None` if `base` is not exactly 12 ASCII digits.
pub fn cnpj_check_digits(base: &str) -> Option<(u32, u32)> {
    let mut digits = base_digits(base, 12)?;
    let d1 = check_digit(&digits, &CNPJ_WEIGHTS_1);
    digits.push(d1);
    let d2 = check_digit(&digits, &CNPJ_WEIGHTS_2);
    Some((d1, d2))
}

/// Compute the two check digits for the first 9 digits of a CPF.
/// Returns `None` if `base` is not exactly 9 ASCII digits.
pub fn cpf_check_digits(base: &str) -> Option<(u32, u32)> {
    let mut digits = base_digits(base, 9)?;
    let d1 = check_digit(&digits, &CPF_WEIGHTS_1);
    digits.push(d1);
    let d2 = check_digit(&digits, &CPF_WEIGHTS_2);
    Some((d1, d2))
}

fn parse_digits(value: &str, len: usize) -> Result<Vec<u32>, TaxIdError> {
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(TaxIdError::NonDigit);
    }
    if value.len() != len {
        return Err(TaxIdError::Length {
            expected: len,
            actual: value.len(),
        });
    }
    let bytes = value.as_bytes();
    if bytes.iter().all(|b| *b == bytes[0]) {
        return Err(TaxIdError::RepeatedDigits);
    }
    Ok(bytes.iter().map(|b| u32::from(b - b'0')).collect())
}

// A base may repeat a single digit; only the full identifier may not.
fn base_digits(value: &str, len: usize) -> Option<Vec<u32>> {
    if value.len() != len || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(value.bytes().map(|b| u32::from(b - b'0')).collect())
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 { 0 } else { 11 - remainder }
}
