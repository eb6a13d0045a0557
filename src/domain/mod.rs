//! Core domain types and logic.

pub mod holidays;
pub mod calendar;
pub mod time_of_day;
pub mod stock_fact;
pub mod spot;
pub mod lookup;
pub mod symbols;
pub mod config_validation;
pub mod error;
