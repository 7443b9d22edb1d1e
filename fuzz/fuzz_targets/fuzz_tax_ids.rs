#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic on any input.
        let normalized = tiss::normalize_tax_id(s);
        let cnpj = tiss::is_valid_cnpj(&normalized);
        let cpf = tiss::is_valid_cpf(&normalized);
        assert!(!(cnpj && cpf), "an id cannot be both CNPJ and CPF");
        if cnpj {
            assert_eq!(normalized.len(), 14);
        }
        if cpf {
            assert_eq!(normalized.len(), 11);
        }
    }
});
