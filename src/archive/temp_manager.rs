use crate::error::{ProcessingError, Result};
use crate::utils::constants::{STATION_FILE_EXTENSION, STATION_FILE_PREFIX};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

/// Owns a temporary directory holding station files extracted from a yearly
/// archive. The directory is removed when the manager is dropped.
pub struct TempFileManager {
    temp_dir: TempDir,
    extracted_files: Vec<PathBuf>,
}

impl TempFileManager {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().map_err(|e| {
            ProcessingError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create temporary directory: {}", e),
            ))
        })?;

        Ok(Self {
            temp_dir,
            extracted_files: Vec::new(),
        })
    }

    pub fn temp_dir_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn extracted_files(&self) -> &[PathBuf] {
        &self.extracted_files
    }

    /// Extract every station CSV in the archive, flattening any folder
    /// structure inside the zip. Returns the extracted paths.
    pub fn extract_station_files(&mut self, zip_path: &Path) -> Result<Vec<PathBuf>> {
        let file = File::open(zip_path)?;
        let mut archive = ZipArchive::new(file)?;
        let mut extracted_paths = Vec::new();

        for i in 0..archive.len() {
            let mut zip_file = archive.by_index(i)?;
            if zip_file.is_dir() {
                continue;
            }

            // only the final component is trusted; entry paths may contain `..`
            let Some(file_name) = Path::new(zip_file.name())
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
            else {
                continue;
            };

            if !is_station_file_name(&file_name) {
                continue;
            }

            let dest_path = self.temp_dir.path().join(&file_name);
            let mut writer = BufWriter::new(File::create(&dest_path)?);
            std::io::copy(&mut zip_file, &mut writer)?;
            writer.flush()?;

            debug!("Extracted {} from {}", file_name, zip_path.display());
            self.extracted_files.push(dest_path.clone());
            extracted_paths.push(dest_path);
        }

        Ok(extracted_paths)
    }
}

/// `INMET_*.csv`, extension compared case-insensitively
pub fn is_station_file_name(file_name: &str) -> bool {
    file_name.starts_with(STATION_FILE_PREFIX)
        && Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(STATION_FILE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn build_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(contents).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_only_station_files() -> Result<()> {
        let source_dir = TempDir::new()?;
        let zip_path = source_dir.path().join("2023.zip");
        build_zip(
            &zip_path,
            &[
                ("2023/INMET_CO_DF_A001_BRASILIA_01-01-2023_A_31-12-2023.CSV", b"a"),
                ("2023/readme.txt", b"b"),
                ("INMET_S_RS_A801_PORTO ALEGRE_01-01-2023_A_31-12-2023.csv", b"c"),
            ],
        );

        let mut manager = TempFileManager::new()?;
        let mut files = manager.extract_station_files(&zip_path)?;
        files.sort();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.starts_with(manager.temp_dir_path())));
        assert_eq!(std::fs::read(&files[0])?, b"a");
        assert_eq!(manager.extracted_files().len(), 2);
        Ok(())
    }

    #[test]
    fn test_station_file_name() {
        assert!(is_station_file_name("INMET_N_AM_A101_MANAUS_01-01-2020_A_31-12-2020.CSV"));
        assert!(is_station_file_name("INMET_N_AM_A101_MANAUS_01-01-2020_A_31-12-2020.csv"));
        assert!(!is_station_file_name("stations.csv"));
        assert!(!is_station_file_name("INMET_notes.txt"));
    }
}
