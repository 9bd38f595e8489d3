use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::Table;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Load a headered CSV file into a [`Table`].
///
/// Rows may have fewer or more cells than the header; interpretation of the
/// cells is left to the caller (see [`Table::numeric_rows`]).
pub fn load_csv(path: &Path) -> Result<Table, LoadError> {
    if !path.is_file() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        rows.len(),
        headers,
        path.display()
    );
    Ok(Table::new(headers, rows))
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Write a [`Table`] to `path`, replacing any existing file.
pub fn write_csv(path: &Path, table: &Table) -> Result<(), LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(&table.headers).map_err(csv_err)?;
    for row in &table.rows {
        writer.write_record(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
