//! Per-symbol, per-day stock facts and the broadcast input shape used by
//! batch lookups.

use crate::domain::error::CycError;
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One row of stock data. Every numeric column may be missing.
///
/// Daily rows carry no `time`; intraday partitions set it per row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StockFact {
    pub symbol: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub dividend: Option<f64>,
    pub split: Option<f64>,
}

impl StockFact {
    pub fn new(symbol: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            ..Self::default()
        }
    }

    pub fn field(&self, field: FactField) -> Option<f64> {
        match field {
            FactField::Open => self.open,
            FactField::High => self.high,
            FactField::Low => self.low,
            FactField::Close => self.close,
            FactField::Volume => self.volume,
            FactField::Dividend => self.dividend,
            FactField::Split => self.split,
        }
    }

    pub fn price(&self, field: PriceField) -> Option<f64> {
        self.field(field.into())
    }

    /// Dividend with the null-means-none default.
    pub fn dividend_or_zero(&self) -> f64 {
        self.dividend.unwrap_or(0.0)
    }

    /// Split factor with the null-means-unchanged default.
    pub fn split_or_one(&self) -> f64 {
        self.split.unwrap_or(1.0)
    }
}

/// Price column an adjusted spot is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PriceField {
    Open,
    High,
    Low,
    #[default]
    Close,
}

impl FromStr for PriceField {
    type Err = CycError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            other => Err(CycError::InvalidInput {
                reason: format!("unknown price field '{other}'"),
            }),
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(FactField::from(*self).column())
    }
}

/// Any numeric column of a [`StockFact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactField {
    Open,
    High,
    Low,
    Close,
    Volume,
    Dividend,
    Split,
}

impl FactField {
    pub const ALL: [FactField; 7] = [
        FactField::Open,
        FactField::High,
        FactField::Low,
        FactField::Close,
        FactField::Volume,
        FactField::Dividend,
        FactField::Split,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            FactField::Open => "open",
            FactField::High => "high",
            FactField::Low => "low",
            FactField::Close => "close",
            FactField::Volume => "volume",
            FactField::Dividend => "dividend",
            FactField::Split => "split",
        }
    }
}

impl From<PriceField> for FactField {
    fn from(field: PriceField) -> Self {
        match field {
            PriceField::Open => FactField::Open,
            PriceField::High => FactField::High,
            PriceField::Low => FactField::Low,
            PriceField::Close => FactField::Close,
        }
    }
}

impl FromStr for FactField {
    type Err = CycError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        FactField::ALL
            .into_iter()
            .find(|f| f.column() == wanted)
            .ok_or_else(|| CycError::InvalidInput {
                reason: format!("unknown field '{}'", s.trim()),
            })
    }
}

impl fmt::Display for FactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Facts keyed by `(symbol, date)`; absent keys are missing data.
#[derive(Debug, Clone, Default)]
pub struct FactTable {
    facts: HashMap<(String, NaiveDate), StockFact>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts for the same key replace earlier ones.
    pub fn insert(&mut self, fact: StockFact) {
        self.facts.insert((fact.symbol.clone(), fact.date), fact);
    }

    pub fn get(&self, symbol: &str, date: NaiveDate) -> Option<&StockFact> {
        self.facts.get(&(symbol.to_string(), date))
    }

    pub fn value(&self, symbol: &str, date: NaiveDate, field: FactField) -> Option<f64> {
        self.get(symbol, date).and_then(|f| f.field(field))
    }

    pub fn dividend(&self, symbol: &str, date: NaiveDate) -> f64 {
        self.get(symbol, date).map_or(0.0, StockFact::dividend_or_zero)
    }

    pub fn split(&self, symbol: &str, date: NaiveDate) -> f64 {
        self.get(symbol, date).map_or(1.0, StockFact::split_or_one)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl FromIterator<StockFact> for FactTable {
    fn from_iter<I: IntoIterator<Item = StockFact>>(iter: I) -> Self {
        let mut table = FactTable::new();
        for fact in iter {
            table.insert(fact);
        }
        table
    }
}

/// Batch input: a single value repeated, or one value per row.
#[derive(Debug, Clone, PartialEq)]
pub enum Broadcast<T> {
    Scalar(T),
    Series(Vec<T>),
}

impl<T: Clone> Broadcast<T> {
    fn series_len(&self) -> Option<usize> {
        match self {
            Broadcast::Scalar(_) => None,
            Broadcast::Series(values) => Some(values.len()),
        }
    }

    fn expand(self, len: usize) -> Vec<T> {
        match self {
            Broadcast::Scalar(value) => vec![value; len],
            Broadcast::Series(values) => values,
        }
    }
}

/// Expands two broadcast inputs into aligned rows.
///
/// At least one side must be a series; two series must have equal length.
pub fn align<A: Clone, B: Clone>(
    left: Broadcast<A>,
    right: Broadcast<B>,
) -> Result<Vec<(A, B)>, CycError> {
    let len = match (left.series_len(), right.series_len()) {
        (None, None) => {
            return Err(CycError::InvalidInput {
                reason: "symbol and date cannot both be scalars".into(),
            });
        }
        (Some(l), Some(r)) if l != r => {
            return Err(CycError::InvalidInput {
                reason: format!("length mismatch: {l} symbols vs {r} dates"),
            });
        }
        (Some(n), _) | (None, Some(n)) => n,
    };
    Ok(left
        .expand(len)
        .into_iter()
        .zip(right.expand(len))
        .collect())
}
