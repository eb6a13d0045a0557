//! Symbol list parsing for batch requests.

use crate::domain::error::CycError;
use std::collections::HashSet;

/// Splits a comma-separated symbol list, upper-casing each entry.
///
/// Empty entries and duplicates are rejected.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, CycError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(CycError::InvalidInput {
                reason: format!("empty symbol in '{input}'"),
            });
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(CycError::InvalidInput {
                reason: format!("duplicate symbol: {symbol}"),
            });
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}
