// CSV loading into typed records

use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use xlbench_table::Record;

use crate::error::{Error, Result};

/// Read and deserialize every row of the CSV file at `path`.
pub fn load_records<R>(path: &Path) -> Result<Vec<R>>
where
    R: Record + DeserializeOwned,
{
    let content = read_file_as_utf8(path)?;
    let records = load_records_from_str(&content)?;
    log::info!("loaded {} {} records from {}", records.len(), R::TYPE_NAME, path.display());
    Ok(records)
}

/// Deserialize CSV text with a header row. Columns are matched by name;
/// extra columns are ignored, a missing one is an error.
pub fn load_records_from_str<R>(content: &str) -> Result<Vec<R>>
where
    R: Record + DeserializeOwned,
{
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(csv_error)?.clone();
    for name in R::column_names() {
        if !headers.iter().any(|h| h == name) {
            return Err(Error::MissingColumn(name.to_string()));
        }
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<R>() {
        records.push(row.map_err(csv_error)?);
    }
    Ok(records)
}

/// Read a file as UTF-8, falling back to Windows-1252 for non-UTF-8 input
pub fn read_file_as_utf8(path: &Path) -> Result<String> {
    let read_error = |source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(read_error)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_error)?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::warn!("{} is not UTF-8, decoded as Windows-1252", path.display());
            Ok(decoded.into_owned())
        }
    }
}

fn csv_error(e: csv::Error) -> Error {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    Error::Csv {
        line,
        message: e.to_string(),
    }
}
