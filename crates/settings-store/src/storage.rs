//! Storage facility for the settings document.

use std::{
    io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{Error, Result, SettingsDocument};

/// Where the settings document lives.
///
/// `read` returns `Ok(None)` when nothing has been stored yet; that is the
/// first-run case, not an error.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Read the stored document, if any.
    async fn read(&self) -> Result<Option<SettingsDocument>>;

    /// Replace the stored document.
    async fn write(&self, doc: &SettingsDocument) -> Result<()>;

    /// Short description for logs (usually the file path).
    fn describe(&self) -> String;
}

/// On-disk layout: the document lives under a single `"settings"` key.
#[derive(Deserialize)]
struct FileLayout {
    /// The document, absent in an otherwise empty store file.
    #[serde(default)]
    settings: Option<SettingsDocument>,
}

/// Borrowing counterpart of [`FileLayout`] for writes.
#[derive(Serialize)]
struct FileLayoutRef<'a> {
    /// The document being written.
    settings: &'a SettingsDocument,
}

/// Decode a settings file body.
fn decode(body: &str, path: Option<&Path>) -> Result<Option<SettingsDocument>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let layout: FileLayout = serde_json::from_str(body).map_err(|e| Error::Parse {
        path: path.map(Path::to_path_buf),
        message: e.to_string(),
    })?;
    Ok(layout.settings)
}

/// Encode a document into a settings file body.
fn encode(doc: &SettingsDocument) -> Result<String> {
    serde_json::to_string_pretty(&FileLayoutRef { settings: doc }).map_err(|e| Error::Encode {
        message: e.to_string(),
    })
}

/// JSON file storage.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a crash mid-write never leaves a truncated document.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    /// Target settings file.
    path: PathBuf,
}

impl JsonFileStorage {
    /// Storage backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a write error for this file.
    fn write_err(&self, e: &io::Error) -> Error {
        Error::Write {
            path: Some(self.path.clone()),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStorage for JsonFileStorage {
    async fn read(&self) -> Result<Option<SettingsDocument>> {
        match fs::read_to_string(&self.path).await {
            Ok(body) => decode(&body, Some(&self.path)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Read {
                path: Some(self.path.clone()),
                message: e.to_string(),
            }),
        }
    }

    async fn write(&self, doc: &SettingsDocument) -> Result<()> {
        let body = encode(doc)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_err(&e))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, body)
            .await
            .map_err(|e| self.write_err(&e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.write_err(&e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory storage holding the encoded file body.
///
/// Used by tests and by callers that do not want anything on disk. Reads and
/// writes can be made to fail on demand.
#[derive(Default)]
pub struct MemoryStorage {
    /// Encoded file body, `None` until first write.
    body: Mutex<Option<String>>,
    /// When set, `read` fails.
    fail_read: AtomicBool,
    /// When set, `write` fails.
    fail_write: AtomicBool,
    /// Number of successful writes.
    writes: AtomicUsize,
}

impl MemoryStorage {
    /// Empty storage (first-run state).
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a raw file body.
    pub fn with_body(body: impl Into<String>) -> Self {
        let s = Self::new();
        *s.body.lock() = Some(body.into());
        s
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn set_fail_read(&self, fail: bool) {
        self.fail_read.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_write(&self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The raw stored body, if any.
    pub fn body(&self) -> Option<String> {
        self.body.lock().clone()
    }

    /// Decode the stored document, if any.
    pub fn stored(&self) -> Option<SettingsDocument> {
        self.body()
            .and_then(|b| decode(&b, None).ok().flatten())
    }
}

#[async_trait]
impl DocumentStorage for MemoryStorage {
    async fn read(&self) -> Result<Option<SettingsDocument>> {
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(Error::Read {
                path: None,
                message: "memory storage read failure".into(),
            });
        }
        let body = self.body.lock().clone();
        match body {
            Some(b) => decode(&b, None),
            None => Ok(None),
        }
    }

    async fn write(&self, doc: &SettingsDocument) -> Result<()> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(Error::Write {
                path: None,
                message: "memory storage write failure".into(),
            });
        }
        let body = encode(doc)?;
        *self.body.lock() = Some(body);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write as write_file;

    use super::*;

    #[test]
    fn decode_missing_key_is_first_run() {
        assert!(decode("{}", None).expect("decode").is_none());
        assert!(decode("   ", None).expect("decode").is_none());
    }

    #[test]
    fn decode_garbage_is_parse_error() {
        let err = decode("{not json", Some(Path::new("/x/settings.json"))).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("/x/settings.json"));
    }

    #[test]
    fn encode_wraps_under_settings_key() {
        let body = encode(&SettingsDocument::default()).expect("encode");
        let v: serde_json::Value = serde_json::from_str(&body).expect("json");
        assert!(v.get(crate::SETTINGS_KEY).is_some());
    }

    #[tokio::test]
    async fn file_storage_roundtrip_and_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");
        let storage = JsonFileStorage::new(&path);

        assert!(storage.read().await.expect("read missing").is_none());

        let mut doc = SettingsDocument::default();
        doc.selected_backend = "youdao".into();
        storage.write(&doc).await.expect("write");
        assert!(path.exists());

        let back = storage.read().await.expect("read").expect("some doc");
        assert_eq!(back, doc);
    }

    #[tokio::test]
    async fn file_storage_reports_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        write_file(&path, "[1, 2").expect("seed");
        let err = JsonFileStorage::new(&path).read().await.unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[tokio::test]
    async fn memory_storage_failures() {
        let storage = MemoryStorage::new();
        storage.set_fail_write(true);
        assert!(storage.write(&SettingsDocument::default()).await.is_err());
        assert_eq!(storage.writes(), 0);
        storage.set_fail_write(false);
        storage
            .write(&SettingsDocument::default())
            .await
            .expect("write");
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.stored(), Some(SettingsDocument::default()));

        storage.set_fail_read(true);
        assert!(storage.read().await.is_err());
    }
}
