#![no_main]

use libfuzzer_sys::fuzz_target;

// Arbitrary documents decoded from JSON must validate and serialize
// without panicking.
fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = serde_json::from_slice::<tiss::TissDocument>(data) {
        let report = tiss::validate(&doc);
        assert_eq!(report.is_valid(), report.errors.is_empty());
        let _ = tiss::xml::to_tiss_xml(&doc);
    }
});
