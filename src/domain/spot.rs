//! Split- and dividend-adjusted spot prices.
//!
//! `adjusted_spot(symbol, date, n)` restates the price found `n` trading days
//! away in terms of `date`'s basis:
//!
//! - `n == 0`: the raw price on `date`.
//! - `n > 0`: `spot(next, n - 1) * split(next) + dividend(next)`.
//! - `n < 0`: `(spot(prev, n + 1) - dividend(date)) / split(date)`.
//!
//! Each step uses the corporate actions of the later of the two days it
//! joins. A missing dividend counts as 0 and a missing split as 1; a missing
//! price leaves the whole result `None`.
//!
//! The recursion is evaluated as a loop over a precomputed chain of trading
//! days, innermost step first, and all facts for a call are fetched at once.

use crate::domain::calendar::{next_trading_day, previous_trading_day, within_reach};
use crate::domain::error::CycError;
use crate::domain::stock_fact::{align, Broadcast, FactTable, PriceField};
use crate::ports::fact_port::FactPort;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

/// Trading days visited by one adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotChain {
    /// Day whose raw price seeds the computation.
    pub base: NaiveDate,
    /// Days whose dividend/split are applied, outermost first.
    pub anchors: Vec<NaiveDate>,
    pub forward: bool,
}

impl SpotChain {
    pub fn build(date: NaiveDate, offset: i64) -> Result<Self, CycError> {
        if !within_reach(date, offset) {
            return Err(CycError::DateOutOfRange { date });
        }
        let forward = offset >= 0;
        let steps = offset.unsigned_abs() as usize;

        let mut path = Vec::with_capacity(steps.min(366) + 1);
        path.push(date);
        let mut current = date;
        for _ in 0..steps {
            let stepped = if forward {
                next_trading_day(current)
            } else {
                previous_trading_day(current)
            };
            current = stepped.ok_or(CycError::DateOutOfRange { date: current })?;
            path.push(current);
        }

        // Forward steps anchor on the day stepped to, backward steps on the
        // day stepped from.
        let anchors = if forward {
            path[1..].to_vec()
        } else {
            path[..steps].to_vec()
        };
        Ok(Self {
            base: current,
            anchors,
            forward,
        })
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        std::iter::once(self.base).chain(self.anchors.iter().copied())
    }

    /// Evaluates the chain against already-fetched facts.
    pub fn evaluate(&self, table: &FactTable, symbol: &str, field: PriceField) -> Option<f64> {
        let mut spot = table.value(symbol, self.base, field.into());
        for &anchor in self.anchors.iter().rev() {
            let dividend = table.dividend(symbol, anchor);
            let split = table.split(symbol, anchor);
            spot = if self.forward {
                spot.map(|s| s * split + dividend)
            } else {
                spot.map(|s| (s - dividend) / split)
            };
        }
        spot
    }
}

pub fn adjusted_spot(
    port: &dyn FactPort,
    symbol: &str,
    date: NaiveDate,
    offset: i64,
    field: PriceField,
) -> Result<Option<f64>, CycError> {
    let chain = SpotChain::build(date, offset)?;
    let symbols = BTreeSet::from([symbol.to_string()]);
    let dates: BTreeSet<NaiveDate> = chain.dates().collect();

    let table = port.fetch(&symbols, &dates)?;
    debug!(symbol, %date, offset, facts = table.len(), "adjusting spot");
    Ok(chain.evaluate(&table, symbol, field))
}

/// Adjusted spots for aligned symbol/date rows, in input order.
pub fn adjusted_spots(
    port: &dyn FactPort,
    symbols: Broadcast<String>,
    dates: Broadcast<NaiveDate>,
    offset: i64,
    field: PriceField,
) -> Result<Vec<Option<f64>>, CycError> {
    let rows = align(symbols, dates)?;
    let chains = rows
        .iter()
        .map(|(_, date)| SpotChain::build(*date, offset))
        .collect::<Result<Vec<_>, _>>()?;

    let wanted_symbols: BTreeSet<String> = rows.iter().map(|(s, _)| s.clone()).collect();
    let wanted_dates: BTreeSet<NaiveDate> = chains.iter().flat_map(SpotChain::dates).collect();
    let table = port.fetch(&wanted_symbols, &wanted_dates)?;
    debug!(
        rows = rows.len(),
        symbols = wanted_symbols.len(),
        dates = wanted_dates.len(),
        facts = table.len(),
        "adjusting spots"
    );

    Ok(rows
        .iter()
        .zip(&chains)
        .map(|((symbol, _), chain)| chain.evaluate(&table, symbol, field))
        .collect())
}
