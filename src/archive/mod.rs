pub mod temp_manager;

pub use temp_manager::{is_station_file_name, TempFileManager};

use crate::error::{ProcessingError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Station files for one year, either from a directory in place or
/// extracted from a zip archive into a temporary directory
pub enum YearArchive {
    Directory(PathBuf),
    Extracted {
        source: PathBuf,
        manager: TempFileManager,
    },
}

impl YearArchive {
    pub fn open(input: &Path) -> Result<Self> {
        if input.is_dir() {
            return Ok(YearArchive::Directory(input.to_path_buf()));
        }

        let is_zip = input
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
        if !input.is_file() || !is_zip {
            return Err(ProcessingError::InvalidFormat(format!(
                "Expected a .zip archive or a directory of station files: {}",
                input.display()
            )));
        }

        let mut manager = TempFileManager::new()?;
        let extracted = manager.extract_station_files(input)?;
        info!(
            "Extracted {} station files from {}",
            extracted.len(),
            input.display()
        );

        Ok(YearArchive::Extracted {
            source: input.to_path_buf(),
            manager,
        })
    }

    pub fn source(&self) -> &Path {
        match self {
            YearArchive::Directory(dir) => dir,
            YearArchive::Extracted { source, .. } => source,
        }
    }

    /// Station files sorted by name
    pub fn station_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = match self {
            YearArchive::Directory(dir) => discover_station_files(dir)?,
            YearArchive::Extracted { manager, .. } => manager.extracted_files().to_vec(),
        };
        files.sort();
        Ok(files)
    }
}

fn discover_station_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_station = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_station_file_name);
        if path.is_file() && is_station {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_discovery() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("INMET_SE_SP_A771_SAO PAULO_01-01-2023_A_31-12-2023.CSV"),
            "",
        )?;
        fs::write(
            dir.path().join("INMET_CO_DF_A001_BRASILIA_01-01-2023_A_31-12-2023.CSV"),
            "",
        )?;
        fs::write(dir.path().join("notes.txt"), "")?;

        let archive = YearArchive::open(dir.path())?;
        let files = archive.station_files()?;

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("INMET_CO_DF_A001_BRASILIA_01-01-2023_A_31-12-2023.CSV"));
        assert_eq!(archive.source(), dir.path());
        Ok(())
    }

    #[test]
    fn test_rejects_non_archive_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("2023.tar");
        fs::write(&path, "")?;

        assert!(YearArchive::open(&path).is_err());
        Ok(())
    }
}
