//! CSV loading.

use std::path::Path;

use csv::StringRecord;
use tracing::{error, info};

use crate::error::TrainError;

/// Raw training table: header plus string cells.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }
}

/// Reads a headed CSV file into memory.
pub fn load_data(path: &Path) -> Result<RawTable, TrainError> {
    info!("Attempting to load data from {}", path.display());
    if !path.is_file() {
        error!("Data file not found at {}", path.display());
        return Err(TrainError::DataNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let table = read_table(&mut reader)?;
    info!("Data loaded successfully. Shape: {:?}", table.shape());
    Ok(table)
}

/// Reads CSV text that is already in memory.
pub fn parse_data(text: &str) -> Result<RawTable, TrainError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    read_table(&mut reader)
}

fn read_table<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<RawTable, TrainError> {
    let headers = reader.headers()?.iter().map(String::from).collect();
    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    if rows.is_empty() {
        return Err(TrainError::EmptyDataset);
    }
    Ok(RawTable { headers, rows })
}
