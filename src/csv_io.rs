use std::path::Path;

use tracing::{debug, info};

use crate::config::write_atomic;
use crate::errors::{IbgeMatchError, Result};
use crate::types::{InputRow, ReportRow};

/// Column headers of the result file, in order.
pub const OUTPUT_HEADER: [&str; 7] = [
    "municipio_input",
    "populacao_input",
    "municipio_ibge",
    "uf",
    "regiao",
    "id_ibge",
    "status",
];

/// Reads the input CSV.
///
/// The first record is a header and is skipped. Records with fewer than two
/// fields are ignored; column 0 is the municipality name and column 1 the
/// population, parsed leniently (see [`parse_population`]). Fields that are
/// not valid UTF-8 (e.g. Latin-1 exports) are decoded lossily so the row
/// still goes through matching.
pub fn read_input(path: &Path) -> Result<Vec<InputRow>> {
    if !path.exists() {
        return Err(IbgeMatchError::File {
            message: "input CSV not found".to_string(),
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IbgeMatchError::File {
            message: format!("failed to open input CSV: {}", e),
            path: path.display().to_string(),
        })?;

    let mut records = reader.byte_records();
    match records.next() {
        Some(header) => {
            header?;
        }
        None => {
            return Err(IbgeMatchError::Input {
                message: "input CSV is empty (no header)".to_string(),
                path: path.display().to_string(),
                line: None,
            })
        }
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|e| IbgeMatchError::Input {
            message: e.to_string(),
            path: path.display().to_string(),
            line: e.position().map(|p| p.line()),
        })?;

        if record.len() < 2 {
            debug!(line = ?record.position().map(|p| p.line()), "skipping short record");
            continue;
        }

        rows.push(InputRow {
            name: String::from_utf8_lossy(&record[0]).into_owned(),
            population: parse_population(&String::from_utf8_lossy(&record[1])),
        });
    }

    info!(path = %path.display(), rows = rows.len(), "input read");
    Ok(rows)
}

/// Parses a population figure the forgiving way: surrounding whitespace is
/// ignored and the leading optional sign and digits are taken, so `"1234"`,
/// `" 1234 "` and `"1234.7"` all give 1234. Anything else gives 0.
pub fn parse_population(s: &str) -> i64 {
    let s = s.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());

    let value = digits[..end].parse::<i64>().unwrap_or(0);
    if negative {
        -value
    } else {
        value
    }
}

/// Writes the result CSV atomically, header first.
pub fn write_output(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(OUTPUT_HEADER)?;

    for row in rows {
        let population = row.input_population.to_string();
        writer.write_record([
            row.input_name.as_str(),
            population.as_str(),
            row.registry_name.as_str(),
            row.region_code.as_str(),
            row.region_name.as_str(),
            row.registry_id.as_str(),
            row.status.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| IbgeMatchError::File {
        message: format!("failed to flush result CSV: {}", e),
        path: path.display().to_string(),
    })?;

    write_atomic(path, &bytes).map_err(|e| IbgeMatchError::File {
        message: format!("failed to write result CSV: {}", e),
        path: path.display().to_string(),
    })?;

    info!(path = %path.display(), rows = rows.len(), "result written");
    Ok(())
}
