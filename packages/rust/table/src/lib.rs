//! Tabular store for property records.
//!
//! [`AddressTable`] holds the working dataset in memory: the header row plus
//! every data row exactly as read from the input CSV. Rows are identified by
//! position, which is stable for the life of a run — the store never reorders
//! or deduplicates. Only the two target cells (county, owner) are ever
//! written; every other cell is preserved byte-for-byte through load → save.

mod missing;

use std::path::Path;

use titlescout_shared::{Result, TableConfig, TargetField, TitleScoutError};
use tracing::{debug, info};

pub use missing::is_missing;

/// Resolved header indices for the columns the pipeline touches.
#[derive(Debug, Clone, Copy)]
struct Columns {
    street: usize,
    city: usize,
    state: usize,
    zip: usize,
    county: usize,
    owner: usize,
}

/// In-memory tabular representation of the dataset.
#[derive(Debug)]
pub struct AddressTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    cols: Columns,
    sentinel: String,
}

impl AddressTable {
    /// Load a CSV file into memory.
    ///
    /// Fails with a `Validation` error if any required address column is
    /// absent. The two target columns are appended (empty) when missing, so
    /// the output schema always carries them.
    pub fn load(path: &Path, config: &TableConfig) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| match e.kind() {
                csv::ErrorKind::Io(_) => {
                    TitleScoutError::io(path, std::io::Error::other(e.to_string()))
                }
                _ => TitleScoutError::Table(format!("{}: {e}", path.display())),
            })?;

        let mut headers: Vec<String> = reader
            .headers()
            .map_err(|e| TitleScoutError::Table(format!("{}: {e}", path.display())))?
            .iter()
            .map(str::to_string)
            .collect();

        fn position(headers: &[String], name: &str) -> Option<usize> {
            headers.iter().position(|h| h == name)
        }

        fn find_or_append(headers: &mut Vec<String>, name: &str) -> usize {
            match position(headers, name) {
                Some(idx) => idx,
                None => {
                    debug!(column = %name, "target column absent, creating");
                    headers.push(name.to_string());
                    headers.len() - 1
                }
            }
        }

        let required = [
            &config.street_column,
            &config.city_column,
            &config.state_column,
            &config.zip_column,
        ];
        let absent: Vec<&str> = required
            .iter()
            .filter(|name| position(&headers, name).is_none())
            .map(|name| name.as_str())
            .collect();
        if !absent.is_empty() {
            return Err(TitleScoutError::validation(format!(
                "{}: missing required column(s): {}",
                path.display(),
                absent.join(", ")
            )));
        }

        let county = find_or_append(&mut headers, &config.county_column);
        let owner = find_or_append(&mut headers, &config.owner_column);

        let cols = Columns {
            street: position(&headers, &config.street_column).unwrap(),
            city: position(&headers, &config.city_column).unwrap(),
            state: position(&headers, &config.state_column).unwrap(),
            zip: position(&headers, &config.zip_column).unwrap(),
            county,
            owner,
        };

        let width = headers.len();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| TitleScoutError::Table(format!("{}: {e}", path.display())))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            // Short rows (flexible CSV, appended target columns) pad out to
            // the header width so cell indexing is always in bounds.
            row.resize(width, String::new());
            rows.push(row);
        }

        info!(path = %path.display(), rows = rows.len(), "loaded table");

        Ok(Self {
            headers,
            rows,
            cols,
            sentinel: config.sentinel.clone(),
        })
    }

    /// Write the table to `path`: same schema, same row order.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| TitleScoutError::io(path, std::io::Error::other(e.to_string())))?;

        writer
            .write_record(&self.headers)
            .map_err(|e| TitleScoutError::Table(format!("{}: {e}", path.display())))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| TitleScoutError::Table(format!("{}: {e}", path.display())))?;
        }
        writer
            .flush()
            .map_err(|e| TitleScoutError::io(path, e))?;

        info!(path = %path.display(), rows = self.rows.len(), "saved table");
        Ok(())
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row, including any appended target columns.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Full cell vector for one row (passthrough columns included).
    pub fn row(&self, row: usize) -> &[String] {
        &self.rows[row]
    }

    /// The configured sentinel string.
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    pub fn street(&self, row: usize) -> &str {
        &self.rows[row][self.cols.street]
    }

    pub fn city(&self, row: usize) -> &str {
        &self.rows[row][self.cols.city]
    }

    pub fn state(&self, row: usize) -> &str {
        &self.rows[row][self.cols.state]
    }

    pub fn zip(&self, row: usize) -> &str {
        &self.rows[row][self.cols.zip]
    }

    pub fn county(&self, row: usize) -> &str {
        &self.rows[row][self.cols.county]
    }

    pub fn owner(&self, row: usize) -> &str {
        &self.rows[row][self.cols.owner]
    }

    /// Apply a resolved county name to a row.
    pub fn set_county(&mut self, row: usize, value: &str) {
        self.rows[row][self.cols.county] = value.to_string();
    }

    /// Apply a resolved owner name to a row.
    pub fn set_owner(&mut self, row: usize, value: &str) {
        self.rows[row][self.cols.owner] = value.to_string();
    }

    /// Row indices whose `field` is missing, in row order.
    ///
    /// Lazy and restartable: iterating does not consume or mutate the table,
    /// and the same call can be made again after a phase has applied values.
    pub fn missing(&self, field: TargetField) -> impl Iterator<Item = usize> + '_ {
        let col = match field {
            TargetField::County => self.cols.county,
            TargetField::Owner => self.cols.owner,
        };
        (0..self.rows.len()).filter(move |&row| is_missing(&self.rows[row][col], &self.sentinel))
    }
}
