//! Stock fact lookup port.

use crate::domain::error::CycError;
use crate::domain::stock_fact::FactTable;
use chrono::NaiveDate;
use std::collections::BTreeSet;

pub trait FactPort {
    /// Facts for every requested `(symbol, date)` combination that exists.
    ///
    /// Missing combinations are left out of the table rather than reported
    /// as errors; errors mean the source itself could not be read.
    fn fetch(
        &self,
        symbols: &BTreeSet<String>,
        dates: &BTreeSet<NaiveDate>,
    ) -> Result<FactTable, CycError>;
}
