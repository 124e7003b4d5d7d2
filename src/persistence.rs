//! Plain-text value tables: one row per state, entries separated by spaces.
//!
//! Entries are written in scientific notation with 18 fractional digits,
//! enough for every `f64` to read back bit-for-bit.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use ndarray::Array2;

use crate::error::PersistenceError;

pub fn save_table(path: &Path, table: &Array2<f64>) -> Result<(), PersistenceError> {
    let io_error = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    for row in table.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{:.18e}", v)).collect();
        writeln!(writer, "{}", line.join(" ")).map_err(io_error)?;
    }
    writer.flush().map_err(io_error)?;
    debug!("saved {:?} table to {:?}", table.dim(), path);
    Ok(())
}

/// Reads a table and checks it against `expected` (rows, columns).
pub fn load_table(path: &Path, expected: (usize, usize)) -> Result<Array2<f64>, PersistenceError> {
    let io_error = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_error)?);

    let mut values: Vec<f64> = Vec::with_capacity(expected.0 * expected.1);
    let mut n_rows = 0;
    let mut n_cols: Option<usize> = None;
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error)?;
        if line.trim().is_empty() {
            continue;
        }
        let mut width = 0;
        for token in line.split_whitespace() {
            let value: f64 = token.parse().map_err(|_| PersistenceError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                token: token.to_string(),
            })?;
            if !value.is_finite() {
                return Err(PersistenceError::NonFinite {
                    path: path.to_path_buf(),
                    line: index + 1,
                });
            }
            values.push(value);
            width += 1;
        }
        match n_cols {
            None => n_cols = Some(width),
            Some(cols) if cols != width => {
                return Err(PersistenceError::ShapeMismatch {
                    path: path.to_path_buf(),
                    expected,
                    found: (n_rows + 1, width),
                })
            }
            Some(_) => {}
        }
        n_rows += 1;
    }

    let n_cols = n_cols.ok_or_else(|| PersistenceError::Empty {
        path: path.to_path_buf(),
    })?;
    if (n_rows, n_cols) != expected {
        return Err(PersistenceError::ShapeMismatch {
            path: path.to_path_buf(),
            expected,
            found: (n_rows, n_cols),
        });
    }
    debug!("loaded {:?} table from {:?}", expected, path);
    Array2::from_shape_vec(expected, values).map_err(|_| PersistenceError::ShapeMismatch {
        path: path.to_path_buf(),
        expected,
        found: (n_rows, n_cols),
    })
}
