use encoding_rs::WINDOWS_1252;
use inmet_processor::models::{StationIdentity, Variable};
use inmet_processor::processors::{ParallelProcessor, RunSummary};
use inmet_processor::readers::SeriesReader;
use inmet_processor::utils::filename::{report_path, series_path, summary_path};
use pretty_assertions::assert_eq;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

const PREAMBLE: &str = "REGIAO:;CO\nUF:;DF\nESTACAO:;BRASILIA\nCODIGO (WMO):;A001\n\
    LATITUDE:;-15,78\nLONGITUDE:;-47,92\nALTITUDE:;1160,96\nDATA DE FUNDACAO:;07/05/00\n";

const BRASILIA: &str = "INMET_CO_DF_A001_BRASILIA_01-01-2023_A_31-12-2023.CSV";
const PORTO_ALEGRE: &str = "INMET_S_RS_A801_PORTO ALEGRE_01-01-2023_A_31-12-2023.CSV";
const UNNAMED: &str = "INMET_notes.csv";

fn latin1_station_file(header: &str, rows: &[&str]) -> Vec<u8> {
    let mut text = String::from(PREAMBLE);
    text.push_str(header);
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    WINDOWS_1252.encode(&text).0.into_owned()
}

/// Two real stations plus a file whose name carries no station identity
fn station_files() -> Vec<(&'static str, Vec<u8>)> {
    let brasilia = latin1_station_file(
        "Data;Hora UTC;PRECIPITAÇÃO TOTAL, HORÁRIO (mm);TEMPERATURA DO AR - BULBO SECO, HORARIA (°C);",
        &[
            "2023/01/01;0000 UTC;0,0;20,5;",
            "2023/01/01;0100 UTC;0,4;-9999;",
            "2023/01/01;0100 UTC;1,0;19,8;",
            "2023/01/01;0300 UTC;;19,0;",
            "2023/01/01;0400 UTC;0,2;18,7;",
            "bad;row;1;2;",
        ],
    );
    let porto_alegre = latin1_station_file(
        "DATA (YYYY-MM-DD);HORA (UTC);PRECIPITAÇÃO TOTAL, HORÁRIO (mm);",
        &["2023-01-01;00:00;1,2;", "2023-01-01;01:00;0;"],
    );
    let unnamed = latin1_station_file("Data;Hora UTC;", &["2023/01/01;0000 UTC;"]);

    vec![
        (BRASILIA, brasilia),
        (PORTO_ALEGRE, porto_alegre),
        (UNNAMED, unnamed),
    ]
}

fn write_year_directory(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    for (name, contents) in station_files() {
        fs::write(dir.join(name), contents).unwrap();
    }
}

fn write_year_zip(path: &Path) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, contents) in station_files() {
        zip.start_file(format!("2023/{}", name), FileOptions::default())
            .unwrap();
        zip.write_all(&contents).unwrap();
    }
    zip.finish().unwrap();
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

const PRECIPITATION_REPORT: &str = "station_code;completeness\nA001;0.60\nA801;1.00\n";
const TEMPERATURE_REPORT: &str = "station_code;completeness\nA001;0.60\n";

#[tokio::test]
async fn test_process_year_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("2023");
    let out_root = temp_dir.path().join("out");
    write_year_directory(&input);

    let outcome = ParallelProcessor::new(2)
        .process_year(&input, 2023, &out_root)
        .await
        .unwrap();

    assert_eq!(
        read(&series_path(&out_root, Variable::TotalPrecipitation, 2023, "A001")),
        "datetime,value\n\
         2023-01-01T00:00:00,0.0\n\
         2023-01-01T01:00:00,0.4\n\
         2023-01-01T04:00:00,0.2\n"
    );
    assert_eq!(
        read(&series_path(&out_root, Variable::AirTemperature, 2023, "A001")),
        "datetime,value\n\
         2023-01-01T00:00:00,20.5\n\
         2023-01-01T03:00:00,19.0\n\
         2023-01-01T04:00:00,18.7\n"
    );
    assert_eq!(
        read(&series_path(&out_root, Variable::TotalPrecipitation, 2023, "A801")),
        "datetime,value\n2023-01-01T00:00:00,1.2\n2023-01-01T01:00:00,0.0\n"
    );
    assert!(!series_path(&out_root, Variable::AirTemperature, 2023, "A801").exists());

    assert_eq!(
        read(&report_path(&out_root, Variable::TotalPrecipitation, 2023)),
        PRECIPITATION_REPORT
    );
    assert_eq!(
        read(&report_path(&out_root, Variable::AirTemperature, 2023)),
        TEMPERATURE_REPORT
    );
    assert_eq!(outcome.written_reports.len(), 2);

    let summary = &outcome.summary;
    assert_eq!(summary.stations_seen, 3);
    assert_eq!(summary.completed_runs, 3);
    assert_eq!(summary.skipped_runs, 2);
    assert_eq!(summary.failed_runs, 0);
    assert_eq!(summary.station_rows_read(), 8);
    assert_eq!(summary.totals.rows_read, 14);
    assert_eq!(summary.totals.retained, 8);
    assert_eq!(summary.totals.row_parse_failures, 2);
    assert_eq!(summary.totals.missing_values, 2);
    assert_eq!(summary.totals.duplicates, 2);
    assert!(summary.failed_reports.is_empty());
}

#[tokio::test]
async fn test_process_year_zip_matches_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let dir_input = temp_dir.path().join("2023");
    let zip_input = temp_dir.path().join("2023.zip");
    let dir_out = temp_dir.path().join("from_dir");
    let zip_out = temp_dir.path().join("from_zip");
    write_year_directory(&dir_input);
    write_year_zip(&zip_input);

    let processor = ParallelProcessor::new(3);
    processor.process_year(&dir_input, 2023, &dir_out).await.unwrap();
    processor.process_year(&zip_input, 2023, &zip_out).await.unwrap();

    for variable in Variable::ALL {
        assert_eq!(
            read(&report_path(&zip_out, variable, 2023)),
            read(&report_path(&dir_out, variable, 2023))
        );
    }
    assert_eq!(
        read(&series_path(&zip_out, Variable::AirTemperature, 2023, "A001")),
        read(&series_path(&dir_out, Variable::AirTemperature, 2023, "A001"))
    );
}

#[tokio::test]
async fn test_run_summary_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("2023");
    let out_root = temp_dir.path().join("out");
    write_year_directory(&input);

    ParallelProcessor::new(1)
        .process_year(&input, 2023, &out_root)
        .await
        .unwrap();

    let summary: RunSummary =
        serde_json::from_str(&read(&summary_path(&out_root, 2023))).unwrap();
    assert_eq!(summary.year, 2023);
    assert_eq!(summary.runs.len(), 5);

    let skipped: Vec<_> = summary
        .runs
        .iter()
        .filter(|r| r.station_code.is_none())
        .map(|r| r.source.as_str())
        .collect();
    assert_eq!(skipped, vec![UNNAMED]);

    let text = summary.generate_summary();
    assert!(text.contains("Runs: 3 completed, 2 skipped, 0 failed"));
}

#[tokio::test]
async fn test_duplicate_station_code_keeps_first_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("2023");
    let out_root = temp_dir.path().join("out");
    write_year_directory(&input);

    // same station re-registered for the second half of the year
    let reregistered = latin1_station_file(
        "Data;Hora UTC;PRECIPITAÇÃO TOTAL, HORÁRIO (mm);TEMPERATURA DO AR - BULBO SECO, HORARIA (°C);",
        &["2023/07/01;0000 UTC;5,0;10,0;", "2023/07/01;0500 UTC;6,0;11,0;"],
    );
    fs::write(
        input.join("INMET_CO_DF_A001_BRASILIA_01-07-2023_A_31-12-2023.CSV"),
        reregistered,
    )
    .unwrap();

    let outcome = ParallelProcessor::new(4)
        .process_year(&input, 2023, &out_root)
        .await
        .unwrap();

    assert_eq!(
        read(&series_path(&out_root, Variable::TotalPrecipitation, 2023, "A001")),
        "datetime,value\n\
         2023-01-01T00:00:00,0.0\n\
         2023-01-01T01:00:00,0.4\n\
         2023-01-01T04:00:00,0.2\n"
    );
    assert_eq!(
        read(&report_path(&out_root, Variable::TotalPrecipitation, 2023)),
        PRECIPITATION_REPORT
    );
    assert_eq!(
        read(&report_path(&out_root, Variable::AirTemperature, 2023)),
        TEMPERATURE_REPORT
    );

    let summary = &outcome.summary;
    assert_eq!(summary.stations_seen, 4);
    assert_eq!(summary.skipped_runs, 3);
    assert!(summary.failed_reports.is_empty());
    assert!(outcome.reports.values().all(|report| report.is_ok()));
}

#[test]
fn test_rebuild_reports_from_series() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("2023");
    let out_root = temp_dir.path().join("out");
    write_year_directory(&input);

    let processor = ParallelProcessor::new(2);
    let files: Vec<_> = station_files()
        .into_iter()
        .map(|(name, _)| input.join(name))
        .collect();
    processor.process_stations(&files, 2023, &out_root).unwrap();

    for variable in Variable::ALL {
        fs::remove_file(report_path(&out_root, variable, 2023)).unwrap();
    }

    let outcome = processor.rebuild_reports(2023, &out_root).unwrap();

    assert_eq!(outcome.written_reports.len(), 2);
    assert_eq!(
        read(&report_path(&out_root, Variable::TotalPrecipitation, 2023)),
        PRECIPITATION_REPORT
    );
    assert_eq!(
        read(&report_path(&out_root, Variable::AirTemperature, 2023)),
        TEMPERATURE_REPORT
    );

    let series = SeriesReader::read_series(&series_path(
        &out_root,
        Variable::TotalPrecipitation,
        2023,
        "A801",
    ))
    .unwrap();
    assert_eq!(series.len(), 2);
}

#[test]
fn test_station_identity_from_inmet_filename() {
    let station = StationIdentity::from_filename(PORTO_ALEGRE).unwrap();

    assert_eq!(station.region, "S");
    assert_eq!(station.state, "RS");
    assert_eq!(station.code, "A801");
    assert_eq!(station.city, "PORTO ALEGRE");
}
