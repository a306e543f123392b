use std::{
    io::{BufReader, BufWriter, Write},
    path::PathBuf,
};

use tracing::debug;

use crate::{error::MatrixError, travel_time_matrix::TravelTimeMatrix};

/// Persists a built matrix to disk so `--calculateTM` need not be re-run
/// for the same problem base name.
pub struct FileCache {
    directory: PathBuf,
}

impl FileCache {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn path_for(&self, base_name: &str) -> PathBuf {
        self.directory.join(format!("{base_name}.dmatrix-time.json"))
    }

    pub fn store(&self, base_name: &str, matrix: &TravelTimeMatrix) -> Result<(), MatrixError> {
        let path = self.path_for(base_name);
        let file = std::fs::File::create(&path).map_err(|source| MatrixError::Cache {
            path: path.display().to_string(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, matrix)?;
        writer.flush().map_err(|source| MatrixError::Cache {
            path: path.display().to_string(),
            source,
        })?;
        debug!(%base_name, "cached travel-time matrix");
        Ok(())
    }

    pub fn load(&self, base_name: &str) -> Result<Option<TravelTimeMatrix>, MatrixError> {
        let path = self.path_for(base_name);
        if !path.is_file() {
            return Ok(None);
        }
        let file = std::fs::File::open(&path).map_err(|source| MatrixError::Cache {
            path: path.display().to_string(),
            source,
        })?;
        let matrix = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let matrix = TravelTimeMatrix::from_constant(3, 42.0);

        assert!(cache.load("trial1").unwrap().is_none());
        cache.store("trial1", &matrix).unwrap();

        let loaded = cache.load("trial1").unwrap().unwrap();
        assert_eq!(loaded.travel_time(0, 1), 42.0);
    }
}
