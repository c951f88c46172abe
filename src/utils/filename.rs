use crate::models::Variable;
use crate::utils::constants::{PROCESSED_DIR, STATIONS_DIR};
use std::path::{Path, PathBuf};

/// `<out_root>/inmet_stations/processed/<variable>/<year>`
pub fn series_dir(out_root: &Path, variable: Variable, year: i32) -> PathBuf {
    out_root
        .join(STATIONS_DIR)
        .join(PROCESSED_DIR)
        .join(variable.dir_name())
        .join(year.to_string())
}

/// `<out_root>/inmet_stations/processed/<variable>/<year>/<code>.csv`
pub fn series_path(out_root: &Path, variable: Variable, year: i32, station_code: &str) -> PathBuf {
    series_dir(out_root, variable, year).join(format!("{}.csv", station_code))
}

/// `<out_root>/<variable>_<year>_completeness.csv`
pub fn report_path(out_root: &Path, variable: Variable, year: i32) -> PathBuf {
    out_root.join(format!("{}_{}_completeness.csv", variable.dir_name(), year))
}

/// `<out_root>/inmet_stations/<year>_run_summary.json`
pub fn summary_path(out_root: &Path, year: i32) -> PathBuf {
    out_root
        .join(STATIONS_DIR)
        .join(format!("{}_run_summary.json", year))
}

/// Year encoded in an archive name such as `2023.zip` or a directory `2023`
pub fn year_from_archive_name(path: &Path) -> Option<i32> {
    let stem = path.file_stem()?.to_str()?;
    if stem.len() == 4 && stem.bytes().all(|b| b.is_ascii_digit()) {
        stem.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_path_layout() {
        let path = series_path(Path::new("out"), Variable::TotalPrecipitation, 2023, "A001");
        assert_eq!(
            path,
            PathBuf::from("out/inmet_stations/processed/total_precipitation/2023/A001.csv")
        );
    }

    #[test]
    fn test_report_path_layout() {
        let path = report_path(Path::new("out"), Variable::AirTemperature, 2024);
        assert_eq!(path, PathBuf::from("out/2m_air_temperature_2024_completeness.csv"));
    }

    #[test]
    fn test_year_from_archive_name() {
        assert_eq!(year_from_archive_name(Path::new("/data/2023.zip")), Some(2023));
        assert_eq!(year_from_archive_name(Path::new("/data/2019")), Some(2019));
        assert_eq!(year_from_archive_name(Path::new("/data/latest.zip")), None);
    }
}
