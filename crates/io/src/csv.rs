// CSV snapshot import and result export

use std::io::{Read, Write};
use std::path::Path;

use rosterdiff_recon::{RecordSet, ResultTable, Snapshot};

use crate::error::IoError;

/// Read a snapshot export from disk. Every cell is kept as text.
pub fn read_snapshot(path: &Path, snapshot: Snapshot, delimiter: u8) -> Result<RecordSet, IoError> {
    let content = read_file_as_utf8(path)?;
    parse_snapshot(&content, snapshot, delimiter)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read { path: path.to_path_buf(), source };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;
    Ok(decode(bytes))
}

fn decode(bytes: Vec<u8>) -> String {
    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            tracing::debug!("input is not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Parse delimited text with a header row into a [`RecordSet`].
///
/// Short rows are padded with empty cells. A row wider than the header,
/// or a missing header, is malformed input.
pub fn parse_snapshot(content: &str, snapshot: Snapshot, delimiter: u8) -> Result<RecordSet, IoError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(&e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IoError::Malformed {
            line: Some(1),
            message: format!("{snapshot} snapshot has no header row"),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(&e))?;
        if record.len() > headers.len() {
            return Err(IoError::Malformed {
                line: record.position().map(|p| p.line()),
                message: format!(
                    "{snapshot} snapshot: row has {} fields, header has {} (wrong delimiter?)",
                    record.len(),
                    headers.len()
                ),
            });
        }
        // Blank lines come through as a single empty field.
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) && headers.len() > 1 {
            continue;
        }
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    tracing::debug!(%snapshot, columns = headers.len(), rows = rows.len(), "snapshot parsed");
    Ok(RecordSet::new(snapshot, headers, rows))
}

fn malformed(e: &csv::Error) -> IoError {
    IoError::Malformed {
        line: e.position().map(|p| p.line()),
        message: e.to_string(),
    }
}

/// Write a result table as comma-delimited UTF-8 with a header row.
pub fn write_table<W: Write>(table: &ResultTable, writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().delimiter(b',').from_writer(writer);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export(table: &ResultTable, path: &Path) -> Result<(), IoError> {
    let write_err = |message: String| IoError::Write { path: path.to_path_buf(), message };
    let file = std::fs::File::create(path).map_err(|e| write_err(e.to_string()))?;
    write_table(table, std::io::BufWriter::new(file)).map_err(|e| write_err(e.to_string()))
}
