//! Dated-partition CSV fact adapter.
//!
//! Daily data lives in one file per trading day:
//! `<root>/<dataset>/<YYYYMMDD>.csv`. Columns are matched by header name;
//! `sym` is required, and any of `time, open, high, low, close, volume,
//! dividend, split` may be present. Empty cells read as missing values;
//! `time` holds the time of day of intraday rows.

use crate::domain::calendar::{format_day, parse_dates, parse_day};
use crate::domain::config_validation::DEFAULT_DATASET;
use crate::domain::error::CycError;
use crate::domain::stock_fact::{FactField, FactTable, StockFact};
use crate::domain::time_of_day::{parse_time_of_day, TimeWindow};
use crate::ports::config_port::ConfigPort;
use crate::ports::fact_port::FactPort;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct PartitionedCsvAdapter {
    root: PathBuf,
    dataset: String,
}

impl PartitionedCsvAdapter {
    pub fn new(root: impl Into<PathBuf>, dataset: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            dataset: dataset.into(),
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, CycError> {
        let root = config.require_string("data", "path")?;
        let dataset = config
            .get_string("data", "dataset")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_DATASET.to_string());
        Ok(Self::new(root, dataset))
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn dataset_dir(&self) -> PathBuf {
        self.root.join(&self.dataset)
    }

    pub fn partition_path(&self, date: NaiveDate) -> PathBuf {
        self.dataset_dir().join(format!("{}.csv", format_day(date)))
    }

    fn ensure_dataset_dir(&self) -> Result<PathBuf, CycError> {
        let dir = self.dataset_dir();
        if !dir.is_dir() {
            return Err(CycError::DataSource {
                reason: format!("data path '{}' does not exist", dir.display()),
            });
        }
        Ok(dir)
    }

    /// Loads every partition for the trading days of `range`
    /// (`YYYYMMDD` or `YYYYMMDD-YYYYMMDD`).
    pub fn load_range(&self, range: &str) -> Result<Vec<StockFact>, CycError> {
        let dates = parse_dates(range)?;
        if dates.is_empty() {
            return Err(CycError::invalid_range(range, "no trading days found in range"));
        }
        self.load_dates(&dates)
    }

    /// [`load_range`](Self::load_range) keeping only rows whose time of day
    /// falls inside `window`. Rows without a time are dropped by any bounded
    /// window.
    pub fn load_range_within(
        &self,
        range: &str,
        window: &TimeWindow,
    ) -> Result<Vec<StockFact>, CycError> {
        let mut facts = self.load_range(range)?;
        if !window.is_unbounded() {
            let before = facts.len();
            facts.retain(|fact| window.admits(fact.time));
            debug!(kept = facts.len(), dropped = before - facts.len(), "applied time window");
        }
        Ok(facts)
    }

    /// Loads the partitions for `dates` in the given order. Missing
    /// partitions are skipped and reported in a single warning.
    pub fn load_dates(&self, dates: &[NaiveDate]) -> Result<Vec<StockFact>, CycError> {
        if dates.is_empty() {
            return Err(CycError::InvalidInput {
                reason: "no dates provided".into(),
            });
        }
        self.ensure_dataset_dir()?;
        info!(dataset = %self.dataset, days = dates.len(), "loading partitions");

        let mut facts = Vec::new();
        let mut missing = Vec::new();
        for &date in dates {
            let path = self.partition_path(date);
            if !path.is_file() {
                missing.push(format_day(date));
                continue;
            }
            facts.extend(read_partition(&path, date)?);
        }

        if !missing.is_empty() {
            warn!(dataset = %self.dataset, missing_dates = %missing.join(", "), "missing partitions");
        }
        Ok(facts)
    }

    /// Dates with a partition file on disk, ascending.
    pub fn list_partitions(&self) -> Result<Vec<NaiveDate>, CycError> {
        let dir = self.ensure_dataset_dir()?;
        let entries = fs::read_dir(&dir).map_err(|e| CycError::DataSource {
            reason: format!("failed to read directory {}: {}", dir.display(), e),
        })?;

        let mut dates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CycError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".csv") {
                if let Ok(date) = parse_day(stem) {
                    dates.push(date);
                }
            }
        }
        dates.sort();
        Ok(dates)
    }
}

impl FactPort for PartitionedCsvAdapter {
    fn fetch(
        &self,
        symbols: &BTreeSet<String>,
        dates: &BTreeSet<NaiveDate>,
    ) -> Result<FactTable, CycError> {
        self.ensure_dataset_dir()?;

        let mut table = FactTable::new();
        for &date in dates {
            let path = self.partition_path(date);
            if !path.is_file() {
                debug!(%date, "no partition");
                continue;
            }
            read_partition(&path, date)?
                .into_iter()
                .filter(|fact| symbols.contains(&fact.symbol))
                .for_each(|fact| table.insert(fact));
        }
        Ok(table)
    }
}

fn read_partition(path: &Path, date: NaiveDate) -> Result<Vec<StockFact>, CycError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| CycError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

    let headers = rdr
        .headers()
        .map_err(|e| CycError::DataSource {
            reason: format!("{}: CSV header error: {}", path.display(), e),
        })?
        .clone();
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let sym_idx = find("sym")
        .or_else(|| find("symbol"))
        .ok_or_else(|| CycError::DataSource {
            reason: format!("{}: missing sym column", path.display()),
        })?;
    let time_idx = find("time");
    let columns: Vec<(FactField, usize)> = FactField::ALL
        .into_iter()
        .filter_map(|field| find(field.column()).map(|idx| (field, idx)))
        .collect();

    let mut facts = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| CycError::DataSource {
            reason: format!("{}: CSV parse error: {}", path.display(), e),
        })?;

        let symbol = record.get(sym_idx).unwrap_or_default();
        if symbol.is_empty() {
            continue;
        }

        let mut fact = StockFact::new(symbol, date);
        if let Some(idx) = time_idx {
            let cell = record.get(idx).unwrap_or_default();
            if !cell.is_empty() {
                fact.time = Some(parse_time_of_day(cell).map_err(|e| CycError::DataSource {
                    reason: format!("{}: invalid time value for {}: {}", path.display(), symbol, e),
                })?);
            }
        }
        for &(field, idx) in &columns {
            let value = parse_cell(record.get(idx).unwrap_or_default()).map_err(|reason| {
                CycError::DataSource {
                    reason: format!("{}: invalid {} value for {}: {}", path.display(), field, symbol, reason),
                }
            })?;
            set_field(&mut fact, field, value);
        }
        facts.push(fact);
    }
    Ok(facts)
}

fn parse_cell(cell: &str) -> Result<Option<f64>, String> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    cell.parse::<f64>().map(Some).map_err(|e| e.to_string())
}

fn set_field(fact: &mut StockFact, field: FactField, value: Option<f64>) {
    let slot = match field {
        FactField::Open => &mut fact.open,
        FactField::High => &mut fact.high,
        FactField::Low => &mut fact.low,
        FactField::Close => &mut fact.close,
        FactField::Volume => &mut fact.volume,
        FactField::Dividend => &mut fact.dividend,
        FactField::Split => &mut fact.split,
    };
    *slot = value;
}
