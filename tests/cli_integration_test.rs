//! CLI integration tests: INI files and partition directories on disk,
//! driven through `cli::execute`.

mod common;

use common::*;
use cyc::adapters::file_config_adapter::FileConfigAdapter;
use cyc::cli::{self, Command};
use cyc::domain::config_validation::validate_data_config;
use cyc::domain::error::CycError;
use cyc::domain::stock_fact::PriceField;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

const DATASET: &str = "stock_data_day";

fn write_temp_ini(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn ini_for(root: &Path, extra: &str) -> NamedTempFile {
    write_temp_ini(&format!(
        "[data]\npath = {}\ndataset = {DATASET}\n\n[display]\nwidth = 120\nprecision = 2\n{extra}",
        root.display()
    ))
}

fn december_data() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_partition(
        dir.path(),
        DATASET,
        "20241213",
        "sym,open,high,low,close,volume,dividend,split\n\
         TSLA,99,101,98,100,1100,1.0,\n\
         AAPL,200,202,199,201,550,,\n",
    );
    write_partition(
        dir.path(),
        DATASET,
        "20241216",
        "sym,open,high,low,close,volume,dividend,split\n\
         TSLA,49,51,48,50,2400,0.5,2\n\
         AAPL,201,203,200,202,600,,\n",
    );
    dir
}

fn run(command: Command) -> Result<String, CycError> {
    let mut buf = Vec::new();
    cli::execute(command, &mut buf)?;
    Ok(String::from_utf8(buf).unwrap())
}

mod config_loading {
    use super::*;

    #[test]
    fn display_config_from_ini() {
        let data = december_data();
        let ini = ini_for(data.path(), "[spot]\nfield = open\nstrict = yes\n");
        let config = cli::load_config(ini.path()).unwrap();
        validate_data_config(&config).unwrap();

        let display = cli::build_display_config(&config).unwrap();
        assert_eq!(display.width, 120);
        assert_eq!(display.precision, 2);
        assert_eq!(display.field, PriceField::Open);
        assert!(display.strict);
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/cyc.ini")).unwrap_err();
        assert!(matches!(err, CycError::ConfigParse { .. }));
    }

    #[test]
    fn missing_data_path_is_rejected() {
        let config = FileConfigAdapter::from_string("[display]\nwidth = 80\n").unwrap();
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, CycError::ConfigMissing { .. }));
    }

    #[test]
    fn bad_spot_field_is_config_invalid() {
        let config = FileConfigAdapter::from_string("[spot]\nfield = vwap\n").unwrap();
        let err = cli::build_display_config(&config).unwrap_err();
        assert!(matches!(err, CycError::ConfigInvalid { .. }));
    }
}

mod calendar_commands {
    use super::*;

    #[test]
    fn days_skip_good_friday() {
        let text = run(Command::Days {
            range: "20240327-20240402".into(),
        })
        .unwrap();
        assert_eq!(text, "20240327\n20240328\n20240401\n20240402\n");
    }

    #[test]
    fn reversed_range_is_invalid() {
        let err = run(Command::Days {
            range: "20240402-20240327".into(),
        })
        .unwrap_err();
        assert!(matches!(err, CycError::InvalidRange { .. }));
    }

    #[test]
    fn prev_over_long_weekend() {
        let text = run(Command::Prev {
            date: "20240401".into(),
            count: 1,
        })
        .unwrap();
        assert_eq!(text, "20240328\n");
    }

    #[test]
    fn time_prints_nanoseconds() {
        let text = run(Command::Time {
            text: "9:30:00.5".into(),
        })
        .unwrap();
        assert_eq!(text, "34200500000000\n");
    }

    #[test]
    fn bad_time_is_invalid_time() {
        let err = run(Command::Time { text: "9".into() }).unwrap_err();
        assert!(matches!(err, CycError::InvalidTime { .. }));
    }
}

mod data_commands {
    use super::*;

    #[test]
    fn spot_table_for_symbol_list() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        let text = run(Command::Spot {
            config: ini.path().to_path_buf(),
            symbols: "tsla,aapl".into(),
            date: "20241213".into(),
            offset: 1,
            field: None,
            strict: false,
        })
        .unwrap();

        assert!(text.contains("| sym "));
        assert!(text.contains("close"));
        let tsla = text.lines().find(|l| l.contains("TSLA")).unwrap();
        assert!(tsla.contains("20241213"));
        assert!(tsla.contains("100.50"));
        let aapl = text.lines().find(|l| l.contains("AAPL")).unwrap();
        assert!(aapl.contains("202.00"));
    }

    #[test]
    fn spot_prints_null_when_lenient() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        let text = run(Command::Spot {
            config: ini.path().to_path_buf(),
            symbols: "TSLA".into(),
            date: "20241216".into(),
            offset: 1,
            field: None,
            strict: false,
        })
        .unwrap();
        assert!(text.lines().any(|l| l.contains("TSLA") && l.contains("null")));
    }

    #[test]
    fn strict_spot_reports_missing_row() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        let err = run(Command::Spot {
            config: ini.path().to_path_buf(),
            symbols: "TSLA".into(),
            date: "20241216".into(),
            offset: 1,
            field: None,
            strict: true,
        })
        .unwrap_err();
        match err {
            CycError::MissingData { symbol, date: d } => {
                assert_eq!(symbol, "TSLA");
                assert_eq!(d, date(2024, 12, 16));
            }
            other => panic!("expected MissingData, got {other:?}"),
        }
    }

    #[test]
    fn strict_from_config_file() {
        let data = december_data();
        let ini = ini_for(data.path(), "[spot]\nstrict = true\n");
        let err = run(Command::Spot {
            config: ini.path().to_path_buf(),
            symbols: "AAPL".into(),
            date: "20241216".into(),
            offset: 1,
            field: None,
            strict: false,
        })
        .unwrap_err();
        assert!(matches!(err, CycError::MissingData { .. }));
    }

    #[test]
    fn lookup_lists_requested_fields() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        let text = run(Command::Lookup {
            config: ini.path().to_path_buf(),
            symbols: "TSLA".into(),
            date: "20241213-20241216".into(),
            fields: "close,split".into(),
        })
        .unwrap();

        assert!(text.contains("split"));
        let rows: Vec<&str> = text.lines().filter(|l| l.contains("TSLA")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("100.00") && rows[0].contains("null"));
        assert!(rows[1].contains("50.00") && rows[1].contains("2.00"));
    }

    #[test]
    fn lookup_rejects_unknown_field() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        let err = run(Command::Lookup {
            config: ini.path().to_path_buf(),
            symbols: "TSLA".into(),
            date: "20241213".into(),
            fields: "close,vwap".into(),
        })
        .unwrap_err();
        assert!(matches!(err, CycError::InvalidInput { .. }));
    }

    #[test]
    fn load_filters_by_symbol() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        let text = run(Command::Load {
            config: ini.path().to_path_buf(),
            range: "20241213-20241217".into(),
            symbol: Some("aapl".into()),
            time_start: None,
            time_end: None,
        })
        .unwrap();
        assert_eq!(text.lines().filter(|l| l.contains("AAPL")).count(), 2);
        assert!(!text.contains("TSLA"));
    }

    #[test]
    fn load_applies_time_window() {
        let data = TempDir::new().unwrap();
        write_partition(
            data.path(),
            DATASET,
            "20241211",
            "sym,time,price,close\n\
             UBER,09:04:00,61.0,61.0\n\
             UBER,09:05:00,61.2,61.2\n\
             UBER,09:06:00,61.3,61.3\n\
             UBER,09:07:00,61.1,61.1\n\
             UBER,09:08:00,61.4,61.4\n\
             LYFT,09:06:00,14.0,14.0\n",
        );
        let ini = ini_for(data.path(), "");
        let text = run(Command::Load {
            config: ini.path().to_path_buf(),
            range: "20241211".into(),
            symbol: Some("UBER".into()),
            time_start: Some("09:05".into()),
            time_end: Some("09:07".into()),
        })
        .unwrap();

        assert!(text.contains("| time "));
        let rows: Vec<&str> = text.lines().filter(|l| l.contains("UBER")).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].contains("09:05:00") && rows[0].contains("61.20"));
        assert!(rows[2].contains("09:07:00") && rows[2].contains("61.10"));
        assert!(!text.contains("LYFT"));
    }

    #[test]
    fn load_rejects_bad_time_bound() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        let err = run(Command::Load {
            config: ini.path().to_path_buf(),
            range: "20241213".into(),
            symbol: None,
            time_start: Some("9:75".into()),
            time_end: None,
        })
        .unwrap_err();
        assert!(matches!(err, CycError::InvalidTime { .. }));
    }

    #[test]
    fn daily_load_has_no_time_column() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        let text = run(Command::Load {
            config: ini.path().to_path_buf(),
            range: "20241213".into(),
            symbol: None,
            time_start: None,
            time_end: None,
        })
        .unwrap();
        assert!(!text.contains("| time "));
        assert_eq!(text.lines().filter(|l| l.contains("20241213")).count(), 2);
    }

    #[test]
    fn spot_on_a_closed_day_is_null_not_an_error() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        // Saturday 14th December 2024.
        let text = run(Command::Spot {
            config: ini.path().to_path_buf(),
            symbols: "TSLA".into(),
            date: "20241214".into(),
            offset: 0,
            field: None,
            strict: false,
        })
        .unwrap();
        let row = text.lines().find(|l| l.contains("TSLA")).unwrap();
        assert!(row.contains("20241214") && row.contains("null"));
    }

    #[test]
    fn spot_from_a_closed_day_steps_to_the_next_session() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        let text = run(Command::Spot {
            config: ini.path().to_path_buf(),
            symbols: "TSLA".into(),
            date: "20241214".into(),
            offset: 1,
            field: None,
            strict: false,
        })
        .unwrap();
        // Monday's 50 * 2 + 0.5
        let row = text.lines().find(|l| l.contains("TSLA")).unwrap();
        assert!(row.contains("100.50"));
    }

    #[test]
    fn lookup_on_a_holiday_is_null() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        let text = run(Command::Lookup {
            config: ini.path().to_path_buf(),
            symbols: "TSLA,AAPL".into(),
            date: "20241225".into(),
            fields: "close".into(),
        })
        .unwrap();
        let rows: Vec<&str> = text.lines().filter(|l| l.contains("20241225")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.contains("null")));
    }

    #[test]
    fn closed_multi_day_range_is_still_invalid() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        let err = run(Command::Spot {
            config: ini.path().to_path_buf(),
            symbols: "TSLA".into(),
            date: "20241214-20241215".into(),
            offset: 0,
            field: None,
            strict: false,
        })
        .unwrap_err();
        assert!(matches!(err, CycError::InvalidRange { .. }));
    }

    #[test]
    fn huge_offset_is_out_of_range() {
        let data = december_data();
        let ini = ini_for(data.path(), "");
        for offset in [i64::MAX, i64::MIN] {
            let err = run(Command::Spot {
                config: ini.path().to_path_buf(),
                symbols: "TSLA".into(),
                date: "20241213".into(),
                offset,
                field: None,
                strict: false,
            })
            .unwrap_err();
            assert!(matches!(err, CycError::DateOutOfRange { .. }));
        }
    }

    #[test]
    fn partitions_lists_dates_on_disk() {
        let data = december_data();
        write_partition(data.path(), DATASET, "notes", "not a partition\n");
        let ini = ini_for(data.path(), "");
        let text = run(Command::Partitions {
            config: ini.path().to_path_buf(),
        })
        .unwrap();
        assert_eq!(text, "20241213\n20241216\n");
    }

    #[test]
    fn missing_dataset_dir_is_data_source_error() {
        let data = TempDir::new().unwrap();
        let ini = ini_for(data.path(), "");
        let err = run(Command::Partitions {
            config: ini.path().to_path_buf(),
        })
        .unwrap_err();
        assert!(matches!(err, CycError::DataSource { .. }));
    }
}
