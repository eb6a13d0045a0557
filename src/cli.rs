//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;

use crate::adapters::csv_adapter::PartitionedCsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::table_format::{format_value, render_table};
use crate::domain::calendar::{format_day, parse_dates, parse_day, shift_trading_days, DateRange};
use crate::domain::config_validation::validate_data_config;
use crate::domain::error::CycError;
use crate::domain::holidays::holidays;
use crate::domain::lookup::lookup_fields;
use crate::domain::spot::adjusted_spots;
use crate::domain::stock_fact::{align, Broadcast, FactField, PriceField};
use crate::domain::symbols::parse_symbols;
use crate::domain::time_of_day::{format_time, parse_time_to_ns, TimeWindow};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "cyc", about = "Trading calendar and adjusted spot prices")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List trading days in YYYYMMDD or YYYYMMDD-YYYYMMDD
    Days { range: String },
    /// Trading day before a date
    Prev {
        date: String,
        #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
    /// Trading day after a date
    Next {
        date: String,
        #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
    /// Observed market holidays of a year
    Holidays { year: i32 },
    /// Nanoseconds since midnight for H:MM[:SS[.fraction]]
    Time { text: String },
    /// Split/dividend adjusted spot prices
    Spot {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: String,
        #[arg(long)]
        date: String,
        #[arg(long, allow_hyphen_values = true)]
        offset: i64,
        #[arg(long)]
        field: Option<String>,
        /// Fail when any requested spot is missing
        #[arg(long)]
        strict: bool,
    },
    /// Raw fields for symbols over a date range
    Lookup {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: String,
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "close,dividend,split")]
        fields: String,
    },
    /// Load daily partitions for a date range
    Load {
        #[arg(short, long)]
        config: PathBuf,
        range: String,
        #[arg(long)]
        symbol: Option<String>,
        /// Keep rows at or after this time of day (H:MM[:SS[.fraction]])
        #[arg(long)]
        time_start: Option<String>,
        /// Keep rows at or before this time of day
        #[arg(long)]
        time_end: Option<String>,
    },
    /// List partition dates available on disk
    Partitions {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Output settings from the `[display]` and `[spot]` sections.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub width: usize,
    pub precision: usize,
    pub field: PriceField,
    pub strict: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 120,
            precision: 4,
            field: PriceField::Close,
            strict: false,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match execute(cli.command, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

/// Runs one command, writing its result to `out`.
pub fn execute(command: Command, out: &mut dyn Write) -> Result<(), CycError> {
    match command {
        Command::Days { range } => run_days(&range, out),
        Command::Prev { date, count } => run_shift(&date, -i64::from(count), out),
        Command::Next { date, count } => run_shift(&date, i64::from(count), out),
        Command::Holidays { year } => run_holidays(year, out),
        Command::Time { text } => {
            writeln!(out, "{}", parse_time_to_ns(&text)?)?;
            Ok(())
        }
        Command::Spot {
            config,
            symbols,
            date,
            offset,
            field,
            strict,
        } => {
            let (adapter, mut display) = open_data(&config)?;
            if let Some(f) = field {
                display.field = f.parse()?;
            }
            display.strict |= strict;
            run_spot(&adapter, &symbols, &date, offset, &display, out)
        }
        Command::Lookup {
            config,
            symbols,
            date,
            fields,
        } => {
            let (adapter, display) = open_data(&config)?;
            run_lookup(&adapter, &symbols, &date, &fields, &display, out)
        }
        Command::Load {
            config,
            range,
            symbol,
            time_start,
            time_end,
        } => {
            let window = TimeWindow::parse(time_start.as_deref(), time_end.as_deref())?;
            let (adapter, display) = open_data(&config)?;
            run_load(&adapter, &range, symbol.as_deref(), &window, &display, out)
        }
        Command::Partitions { config } => {
            let (adapter, _) = open_data(&config)?;
            for date in adapter.list_partitions()? {
                writeln!(out, "{}", format_day(date))?;
            }
            Ok(())
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, CycError> {
    FileConfigAdapter::from_file(path)
}

fn open_data(path: &Path) -> Result<(PartitionedCsvAdapter, DisplayConfig), CycError> {
    let config = load_config(path)?;
    validate_data_config(&config)?;
    Ok((
        PartitionedCsvAdapter::from_config(&config)?,
        build_display_config(&config)?,
    ))
}

pub fn build_display_config(config: &dyn ConfigPort) -> Result<DisplayConfig, CycError> {
    let defaults = DisplayConfig::default();
    let field = match config.get_string("spot", "field") {
        Some(f) => f.parse::<PriceField>().map_err(|e| CycError::ConfigInvalid {
            section: "spot".into(),
            key: "field".into(),
            reason: e.to_string(),
        })?,
        None => defaults.field,
    };
    Ok(DisplayConfig {
        width: config.get_int("display", "width", defaults.width as i64).max(1) as usize,
        precision: config
            .get_int("display", "precision", defaults.precision as i64)
            .max(0) as usize,
        field,
        strict: config.get_bool("spot", "strict", defaults.strict),
    })
}

/// Pairs every symbol with every date, broadcasting whichever side is single.
pub fn broadcast_inputs(
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
) -> (Broadcast<String>, Broadcast<NaiveDate>) {
    if symbols.len() == 1 && dates.len() != 1 {
        return (Broadcast::Scalar(symbols[0].clone()), Broadcast::Series(dates));
    }
    if dates.len() == 1 && symbols.len() != 1 {
        return (Broadcast::Series(symbols), Broadcast::Scalar(dates[0]));
    }
    let (sym_rows, date_rows) = symbols
        .iter()
        .flat_map(|s| dates.iter().map(move |d| (s.clone(), *d)))
        .unzip();
    (Broadcast::Series(sym_rows), Broadcast::Series(date_rows))
}

fn request_rows(
    symbols: &str,
    range: &str,
) -> Result<(Broadcast<String>, Broadcast<NaiveDate>), CycError> {
    let symbols = parse_symbols(symbols)?;
    let range_days = DateRange::parse(range)?;
    // A single explicit day is kept even when the market is closed; its
    // facts are then simply absent.
    let dates = if range_days.start == range_days.end {
        vec![range_days.start]
    } else {
        range_days.trading_days()
    };
    if dates.is_empty() {
        return Err(CycError::invalid_range(range, "no trading days found in range"));
    }
    Ok(broadcast_inputs(symbols, dates))
}

fn run_days(range: &str, out: &mut dyn Write) -> Result<(), CycError> {
    for day in parse_dates(range)? {
        writeln!(out, "{}", format_day(day))?;
    }
    Ok(())
}

fn run_shift(date: &str, offset: i64, out: &mut dyn Write) -> Result<(), CycError> {
    let date = parse_day(date)?;
    let shifted = shift_trading_days(date, offset).ok_or(CycError::DateOutOfRange { date })?;
    writeln!(out, "{}", format_day(shifted))?;
    Ok(())
}

fn run_holidays(year: i32, out: &mut dyn Write) -> Result<(), CycError> {
    for (date, holiday) in holidays(year).iter() {
        writeln!(out, "{}  {}", format_day(date), holiday)?;
    }
    Ok(())
}

pub fn run_spot(
    adapter: &PartitionedCsvAdapter,
    symbols: &str,
    range: &str,
    offset: i64,
    display: &DisplayConfig,
    out: &mut dyn Write,
) -> Result<(), CycError> {
    let (sym_in, date_in) = request_rows(symbols, range)?;
    let requests = align(sym_in.clone(), date_in.clone())?;
    let spots = adjusted_spots(adapter, sym_in, date_in, offset, display.field)?;

    if display.strict {
        if let Some(i) = spots.iter().position(Option::is_none) {
            let (symbol, date) = requests[i].clone();
            return Err(CycError::MissingData { symbol, date });
        }
    }

    let field = display.field.to_string();
    let rows: Vec<Vec<String>> = requests
        .iter()
        .zip(&spots)
        .map(|((s, d), spot)| {
            vec![
                s.clone(),
                format_day(*d),
                offset.to_string(),
                format_value(*spot, display.precision),
            ]
        })
        .collect();
    write!(
        out,
        "{}",
        render_table(&["sym", "date", "offset", &field], &rows, display.width)
    )?;
    Ok(())
}

pub fn run_lookup(
    adapter: &PartitionedCsvAdapter,
    symbols: &str,
    range: &str,
    fields: &str,
    display: &DisplayConfig,
    out: &mut dyn Write,
) -> Result<(), CycError> {
    let fields = fields
        .split(',')
        .map(str::parse::<FactField>)
        .collect::<Result<Vec<_>, _>>()?;
    let (sym_in, date_in) = request_rows(symbols, range)?;
    let looked_up = lookup_fields(adapter, sym_in, date_in, &fields)?;

    let names: Vec<&str> = fields.iter().map(FactField::column).collect();
    let mut headers = vec!["sym", "date"];
    headers.extend(names);
    let rows: Vec<Vec<String>> = looked_up
        .into_iter()
        .map(|row| {
            let mut cells = vec![row.symbol, format_day(row.date)];
            cells.extend(row.values.iter().map(|v| format_value(*v, display.precision)));
            cells
        })
        .collect();
    write!(out, "{}", render_table(&headers, &rows, display.width))?;
    Ok(())
}

pub fn run_load(
    adapter: &PartitionedCsvAdapter,
    range: &str,
    symbol: Option<&str>,
    window: &TimeWindow,
    display: &DisplayConfig,
    out: &mut dyn Write,
) -> Result<(), CycError> {
    let wanted = symbol.map(str::to_uppercase);
    let facts: Vec<_> = adapter
        .load_range_within(range, window)?
        .into_iter()
        .filter(|f| wanted.as_deref().is_none_or(|w| f.symbol == w))
        .collect();
    let intraday = facts.iter().any(|f| f.time.is_some());

    let mut headers = vec!["sym", "date"];
    if intraday {
        headers.push("time");
    }
    headers.extend(FactField::ALL.iter().map(FactField::column));
    let rows: Vec<Vec<String>> = facts
        .iter()
        .map(|f| {
            let mut cells = vec![f.symbol.clone(), format_day(f.date)];
            if intraday {
                cells.push(f.time.map_or_else(|| "null".to_string(), format_time));
            }
            cells.extend(
                FactField::ALL
                    .iter()
                    .map(|&field| format_value(f.field(field), display.precision)),
            );
            cells
        })
        .collect();
    write!(out, "{}", render_table(&headers, &rows, display.width))?;
    Ok(())
}
