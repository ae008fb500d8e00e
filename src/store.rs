//! Building inventory sources.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::building::BuildingRecord;
use crate::error::Result;
use crate::user_config::FilterCriteria;

/// Source of building rows filtered by [`FilterCriteria`].
pub trait BuildingStore: Send + Sync {
    /// Returns every row matching `filter`, in inventory order.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying source cannot be read.
    fn query(&self, filter: &FilterCriteria) -> Result<Vec<BuildingRecord>>;
}

/// Inventory backed by a CSV file with a header row.
///
/// Recognised columns: `id` (or `nummeraanduiding_id`), `postcode` (or
/// `meestvoorkomendepostcode`), `function`, `building_type`, `age_range`,
/// `height`, `area`, `perimeter`, `average_wwr`. Geometry columns may be
/// empty or missing.
#[derive(Debug, Clone)]
pub struct CsvBuildingStore {
    path: PathBuf,
}

impl CsvBuildingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BuildingStore for CsvBuildingStore {
    fn query(&self, filter: &FilterCriteria) -> Result<Vec<BuildingRecord>> {
        let file = std::fs::File::open(&self.path)?;
        let rows = read_buildings(file, filter)?;
        log::info!(
            "loaded {} building(s) from {}",
            rows.len(),
            self.path.display()
        );
        Ok(rows)
    }
}

/// Reads building rows from any CSV source, keeping those matching `filter`.
///
/// # Errors
///
/// Returns a CSV error for malformed rows or a missing required column.
pub fn read_buildings(reader: impl Read, filter: &FilterCriteria) -> Result<Vec<BuildingRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize::<BuildingRecord>() {
        let record = record?;
        if filter.matches(&record) {
            rows.push(record);
        }
    }
    Ok(rows)
}

/// In-memory inventory, mainly for tests and the HTTP front door.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuildingStore {
    rows: Vec<BuildingRecord>,
}

impl MemoryBuildingStore {
    pub fn new(rows: Vec<BuildingRecord>) -> Self {
        Self { rows }
    }
}

impl BuildingStore for MemoryBuildingStore {
    fn query(&self, filter: &FilterCriteria) -> Result<Vec<BuildingRecord>> {
        Ok(self
            .rows
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }
}
