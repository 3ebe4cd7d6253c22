//! CSV storage for klines, features, factors and backtest artifacts.

use alpha101::panel::{DATETIME, SYMBOL};
use anyhow::{Context, Result, bail};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read one CSV with `datetime` and `symbol` as strings and every other
/// column as `f64`, so per-symbol files stack into one frame.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let mut frame = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("failed to read {}", path.display()))?;

    let names: Vec<String> = frame
        .get_column_names_str()
        .into_iter()
        .map(str::to_string)
        .collect();
    for name in names {
        let target = if name == DATETIME || name == SYMBOL {
            DataType::String
        } else {
            DataType::Float64
        };
        let column = frame.column(&name)?.cast(&target)?;
        frame.with_column(column)?;
    }
    Ok(frame)
}

/// Every `*.csv` in `dir`, sorted by file name.
pub(crate) fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("directory not found: {}", dir.display());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();
    Ok(files)
}

/// Read and stack every CSV in `dir`, keeping `columns` when given.
///
/// Files that fail to read or lack a requested column are skipped with a
/// warning.
pub(crate) fn read_dir(dir: &Path, columns: Option<&[&str]>) -> Result<DataFrame> {
    let mut stacked: Option<DataFrame> = None;
    for path in csv_files(dir)? {
        let frame = match read_csv(&path).and_then(|f| match columns {
            Some(cols) => Ok(f.select(cols.iter().copied())?),
            None => Ok(f),
        }) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        match stacked.as_mut() {
            Some(all) => {
                if let Err(e) = all.vstack_mut(&frame) {
                    warn!(file = %path.display(), error = %e, "skipping file with a different schema");
                }
            }
            None => stacked = Some(frame),
        }
    }
    match stacked {
        Some(frame) => {
            debug!(dir = %dir.display(), rows = frame.height(), "loaded frames");
            Ok(frame)
        }
        None => bail!("no CSV files found in {}", dir.display()),
    }
}

/// Write `frame` as CSV, creating parent directories.
pub(crate) fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!(file = %path.display(), rows = frame.height(), "wrote frame");
    Ok(())
}
