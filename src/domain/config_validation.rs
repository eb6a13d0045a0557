//! Configuration validation.
//!
//! Checks the `[data]`, `[spot]` and `[display]` sections before any
//! partition is read.

use crate::domain::error::CycError;
use crate::domain::stock_fact::PriceField;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DATASET: &str = "stock_data_day";
pub const MIN_DISPLAY_WIDTH: i64 = 20;
pub const MAX_PRECISION: i64 = 12;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), CycError> {
    validate_data_path(config)?;
    validate_dataset(config)?;
    validate_spot_field(config)?;
    validate_display(config)?;
    Ok(())
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), CycError> {
    config.require_string("data", "path").map(|_| ())
}

fn validate_dataset(config: &dyn ConfigPort) -> Result<(), CycError> {
    let Some(dataset) = config.get_string("data", "dataset") else {
        return Ok(());
    };
    let dataset = dataset.trim();
    if dataset.is_empty() || dataset.contains(['/', '\\']) || dataset == ".." {
        return Err(CycError::ConfigInvalid {
            section: "data".to_string(),
            key: "dataset".to_string(),
            reason: "dataset must be a plain directory name".to_string(),
        });
    }
    Ok(())
}

fn validate_spot_field(config: &dyn ConfigPort) -> Result<(), CycError> {
    if let Some(field) = config.get_string("spot", "field") {
        field
            .parse::<PriceField>()
            .map_err(|e| CycError::ConfigInvalid {
                section: "spot".to_string(),
                key: "field".to_string(),
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

fn validate_display(config: &dyn ConfigPort) -> Result<(), CycError> {
    let width = config.get_int("display", "width", 120);
    if width < MIN_DISPLAY_WIDTH {
        return Err(CycError::ConfigInvalid {
            section: "display".to_string(),
            key: "width".to_string(),
            reason: format!("width must be at least {MIN_DISPLAY_WIDTH}"),
        });
    }
    let precision = config.get_int("display", "precision", 4);
    if !(0..=MAX_PRECISION).contains(&precision) {
        return Err(CycError::ConfigInvalid {
            section: "display".to_string(),
            key: "precision".to_string(),
            reason: format!("precision must be between 0 and {MAX_PRECISION}"),
        });
    }
    Ok(())
}
