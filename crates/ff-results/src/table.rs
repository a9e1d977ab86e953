//! Column tables written as comma-separated text.

use crate::{ResultsError, ResultsResult};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Named columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Table {
    pub fn from_columns(header: &[&str], columns: Vec<Vec<f64>>) -> ResultsResult<Self> {
        if header.len() != columns.len() {
            return Err(ResultsError::Table {
                what: format!(
                    "{} header names for {} columns",
                    header.len(),
                    columns.len()
                ),
            });
        }
        if let Some(first) = columns.first()
            && columns.iter().any(|c| c.len() != first.len())
        {
            return Err(ResultsError::Table {
                what: "columns have different lengths".to_string(),
            });
        }
        Ok(Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            columns,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.header
            .iter()
            .position(|h| h == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Header line `a, b, c` followed by one ` {:16.12e}` field per value.
    pub fn render(&self) -> String {
        let mut out = self.header.join(", ");
        out.push('\n');
        for row in 0..self.n_rows() {
            for (i, col) in self.columns.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, " {:16.12e}", col[row]);
            }
            out.push('\n');
        }
        out
    }

    pub fn write(&self, path: &Path) -> ResultsResult<()> {
        fs::write(path, self.render())?;
        Ok(())
    }

    /// Inverse of [`Table::render`].
    pub fn parse(text: &str) -> ResultsResult<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header_line = lines.next().ok_or_else(|| ResultsError::Table {
            what: "missing header".to_string(),
        })?;
        let header: Vec<&str> = header_line.split(',').map(str::trim).collect();
        let mut columns = vec![Vec::new(); header.len()];
        for (n, line) in lines.enumerate() {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != header.len() {
                return Err(ResultsError::Table {
                    what: format!("row {n} has {} fields", fields.len()),
                });
            }
            for (col, field) in columns.iter_mut().zip(fields) {
                let v = field.parse::<f64>().map_err(|_| ResultsError::Table {
                    what: format!("row {n}: '{field}' is not a number"),
                })?;
                col.push(v);
            }
        }
        Self::from_columns(&header, columns)
    }

    pub fn read(path: &Path) -> ResultsResult<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }
}
