#![allow(dead_code)]

use chrono::NaiveDate;
use cyc::domain::error::CycError;
pub use cyc::domain::stock_fact::StockFact;
use cyc::domain::stock_fact::FactTable;
use cyc::ports::fact_port::FactPort;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// In-memory fact source that records every fetch it serves.
pub struct MockFactPort {
    pub facts: Vec<StockFact>,
    pub error: Option<String>,
    pub fetches: RefCell<Vec<(BTreeSet<String>, BTreeSet<NaiveDate>)>>,
}

impl MockFactPort {
    pub fn new() -> Self {
        Self {
            facts: Vec::new(),
            error: None,
            fetches: RefCell::new(Vec::new()),
        }
    }

    pub fn with_fact(mut self, fact: StockFact) -> Self {
        self.facts.push(fact);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.borrow().len()
    }
}

impl FactPort for MockFactPort {
    fn fetch(
        &self,
        symbols: &BTreeSet<String>,
        dates: &BTreeSet<NaiveDate>,
    ) -> Result<FactTable, CycError> {
        self.fetches
            .borrow_mut()
            .push((symbols.clone(), dates.clone()));
        if let Some(reason) = &self.error {
            return Err(CycError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .facts
            .iter()
            .filter(|f| symbols.contains(&f.symbol) && dates.contains(&f.date))
            .cloned()
            .collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn close_fact(symbol: &str, day: NaiveDate, close: f64) -> StockFact {
    StockFact {
        close: Some(close),
        ..StockFact::new(symbol, day)
    }
}

pub fn action_fact(
    symbol: &str,
    day: NaiveDate,
    close: f64,
    dividend: Option<f64>,
    split: Option<f64>,
) -> StockFact {
    StockFact {
        close: Some(close),
        dividend,
        split,
        ..StockFact::new(symbol, day)
    }
}

/// Writes `<root>/<dataset>/<name>.csv`.
pub fn write_partition(root: &Path, dataset: &str, name: &str, content: &str) {
    let dir = root.join(dataset);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{name}.csv")), content).unwrap();
}
