//! Backing file for the toy collection.
//!
//! The whole collection lives in one JSON array. Every flush rewrites it by
//! writing a sibling temp file, syncing it, and renaming it over the target,
//! so a crash mid-write leaves either the old or the new file, never a mix.

use crate::error::{Result, StoreError};
use crate::types::Toy;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Handle to the on-disk copy of the collection.
#[derive(Clone, Debug)]
pub struct DataFile {
    path: PathBuf,
    pretty: bool,
}

impl DataFile {
    /// Handle for `path`. `pretty` indents the written JSON.
    pub fn new(path: impl AsRef<Path>, pretty: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty,
        }
    }

    /// Location of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read the collection. Returns `None` if the file does not exist.
    ///
    /// A file that exists but does not parse, or that breaks id uniqueness,
    /// is an error.
    pub fn load(&self) -> Result<Option<Vec<Toy>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let toys: Vec<Toy> = serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Deserialization(format!("{}: {}", self.path.display(), e))
        })?;

        verify_ids(&toys)?;
        Ok(Some(toys))
    }

    /// Atomically replace the file with `toys`. Returns the bytes written.
    pub fn write(&self, toys: &[Toy]) -> Result<usize> {
        let encoded = self.encode(toys)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        let result = self.write_and_rename(&temp_path, &encoded);
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result?;

        Ok(encoded.len())
    }

    fn write_and_rename(&self, temp_path: &Path, encoded: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        file.write_all(encoded)?;
        file.sync_all()?;
        drop(file);

        fs::rename(temp_path, &self.path)?;

        // The data is already in place; a failed directory sync only
        // weakens durability of the rename.
        if let Err(e) = sync_parent(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to sync data directory");
        }

        Ok(())
    }

    fn encode(&self, toys: &[Toy]) -> Result<Vec<u8>> {
        if !self.pretty {
            return serde_json::to_vec(toys).map_err(|e| StoreError::Serialization(e.to_string()));
        }

        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        toys.serialize(&mut ser)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(out)
    }
}

/// Fsync the directory holding `path` so a rename into it survives a crash.
fn sync_parent(path: &Path) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(dir)?.sync_all()
}

/// Check toy ids are unique, and message ids unique within each toy.
fn verify_ids(toys: &[Toy]) -> Result<()> {
    let mut seen = HashSet::with_capacity(toys.len());
    for toy in toys {
        if !seen.insert(&toy.id) {
            return Err(StoreError::Corruption(format!("duplicate toy id {}", toy.id)));
        }

        let mut msg_ids = HashSet::with_capacity(toy.messages.len());
        for msg in &toy.messages {
            if !msg_ids.insert(&msg.id) {
                return Err(StoreError::Corruption(format!(
                    "duplicate message id {} on toy {}",
                    msg.id, toy.id
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, MessageId, Timestamp, ToyId, UserRef};
    use tempfile::TempDir;

    fn toy(id: &str) -> Toy {
        Toy {
            id: ToyId::from(id),
            name: format!("toy {}", id),
            price: 1.0,
            in_stock: true,
            labels: vec![],
            created_at: Timestamp(1),
            owner: None,
            messages: vec![],
        }
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = TempDir::new().unwrap();
        let file = DataFile::new(dir.path().join("toy.json"), true);
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let file = DataFile::new(dir.path().join("data").join("toy.json"), true);

        let toys = vec![toy("a"), toy("b")];
        let written = file.write(&toys).unwrap();
        assert!(written > 0);

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded, toys);
        assert!(!file.temp_path().exists());
    }

    #[test]
    fn test_sync_parent_reports_missing_directory() {
        let dir = TempDir::new().unwrap();
        assert!(sync_parent(&dir.path().join("toy.json")).is_ok());
        assert!(sync_parent(&dir.path().join("gone").join("toy.json")).is_err());
        assert!(sync_parent(Path::new("toy.json")).is_ok());
    }

    #[test]
    fn test_pretty_output_uses_four_spaces() {
        let dir = TempDir::new().unwrap();
        let file = DataFile::new(dir.path().join("toy.json"), true);
        file.write(&[toy("a")]).unwrap();

        let text = fs::read_to_string(file.path()).unwrap();
        assert!(text.contains("\n    {"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("toy.json");
        fs::write(&path, b"[{\"_id\": ").unwrap();

        let file = DataFile::new(&path, true);
        assert!(matches!(file.load(), Err(StoreError::Deserialization(_))));
    }

    #[test]
    fn test_duplicate_toy_ids_rejected() {
        let dir = TempDir::new().unwrap();
        let file = DataFile::new(dir.path().join("toy.json"), false);
        file.write(&[toy("a"), toy("a")]).unwrap();

        assert!(matches!(file.load(), Err(StoreError::Corruption(_))));
    }

    #[test]
    fn test_duplicate_message_ids_rejected() {
        let dir = TempDir::new().unwrap();
        let file = DataFile::new(dir.path().join("toy.json"), false);

        let msg = Message {
            id: MessageId::from("m"),
            txt: "hi".into(),
            by: UserRef::new("u"),
            created_at: Timestamp(2),
        };
        let mut t = toy("a");
        t.messages = vec![msg.clone(), msg];
        file.write(&[t]).unwrap();

        assert!(matches!(file.load(), Err(StoreError::Corruption(_))));
    }

    #[test]
    fn test_same_message_id_on_different_toys_is_fine() {
        let dir = TempDir::new().unwrap();
        let file = DataFile::new(dir.path().join("toy.json"), false);

        let msg = Message {
            id: MessageId::from("m"),
            txt: "hi".into(),
            by: UserRef::new("u"),
            created_at: Timestamp(2),
        };
        let mut a = toy("a");
        a.messages.push(msg.clone());
        let mut b = toy("b");
        b.messages.push(msg);
        file.write(&[a, b]).unwrap();

        assert_eq!(file.load().unwrap().unwrap().len(), 2);
    }
}
