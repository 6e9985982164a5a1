//! Local fallback copy of the last successfully fetched timeline batch.

use super::RawItem;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub trait SnapshotStore: Send + Sync {
    fn save(&self, batch: &[RawItem]) -> Result<()>;

    /// The last saved batch, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<RawItem>>>;
}

pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshot {
    fn save(&self, batch: &[RawItem]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let file = File::create(&self.path)
            .with_context(|| format!("writing snapshot {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, batch)?;
        writer.flush()?;
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<RawItem>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading snapshot {}", self.path.display()))
            }
        };

        let batch = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("decoding snapshot {}", self.path.display()))?;
        Ok(Some(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, text: &str) -> RawItem {
        RawItem {
            id,
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = FileSnapshot::new(dir.path().join("timeline.json"));
        assert!(snapshot.load().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_parent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = FileSnapshot::new(dir.path().join("nested/cache/timeline.json"));

        snapshot.save(&[item(1, "first")]).unwrap();
        snapshot.save(&[item(2, "second"), item(3, "third")]).unwrap();

        let loaded = snapshot.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, 2);
        assert_eq!(loaded[1].body(), "third");
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timeline.json");
        fs::write(&path, "{not json").unwrap();
        assert!(FileSnapshot::new(path).load().is_err());
    }
}
