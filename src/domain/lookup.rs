//! Aligned stock field lookup for symbol/date rows.

use crate::domain::error::CycError;
use crate::domain::stock_fact::{align, Broadcast, FactField};
use crate::ports::fact_port::FactPort;
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct LookupRow {
    pub symbol: String,
    pub date: NaiveDate,
    /// One value per requested field, in request order.
    pub values: Vec<Option<f64>>,
}

/// Looks up `fields` for each symbol/date row with a single fetch.
pub fn lookup_fields(
    port: &dyn FactPort,
    symbols: Broadcast<String>,
    dates: Broadcast<NaiveDate>,
    fields: &[FactField],
) -> Result<Vec<LookupRow>, CycError> {
    if fields.is_empty() {
        return Err(CycError::InvalidInput {
            reason: "at least one field is required".into(),
        });
    }

    let rows = align(symbols, dates)?;
    let wanted_symbols: BTreeSet<String> = rows.iter().map(|(s, _)| s.clone()).collect();
    let wanted_dates: BTreeSet<NaiveDate> = rows.iter().map(|(_, d)| *d).collect();
    let table = port.fetch(&wanted_symbols, &wanted_dates)?;

    Ok(rows
        .into_iter()
        .map(|(symbol, date)| {
            let values = fields
                .iter()
                .map(|&field| table.value(&symbol, date, field))
                .collect();
            LookupRow {
                symbol,
                date,
                values,
            }
        })
        .collect())
}

/// Single-field form of [`lookup_fields`].
pub fn lookup_field(
    port: &dyn FactPort,
    symbols: Broadcast<String>,
    dates: Broadcast<NaiveDate>,
    field: FactField,
) -> Result<Vec<Option<f64>>, CycError> {
    Ok(lookup_fields(port, symbols, dates, &[field])?
        .into_iter()
        .map(|row| row.values[0])
        .collect())
}
