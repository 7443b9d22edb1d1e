use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::item::BatchItem;
use crate::core::TissError;

fn archive_err(e: impl std::fmt::Display) -> TissError {
    TissError::Archive(e.to_string())
}

/// Write one entry per item, in item order, into a deflate-compressed zip.
///
/// Entry timestamps are fixed so identical input yields identical bytes.
pub(crate) fn write_archive(items: &[BatchItem]) -> Result<Vec<u8>, TissError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    for item in items {
        zip.start_file(item.entry_name(), options)
            .map_err(archive_err)?;
        zip.write_all(&item.entry_bytes()).map_err(archive_err)?;
    }

    let cursor = zip.finish().map_err(archive_err)?;
    Ok(cursor.into_inner())
}
