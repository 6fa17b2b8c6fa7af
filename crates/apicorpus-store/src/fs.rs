//! Local filesystem store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use apicorpus_core::config::LayoutConfig;
use apicorpus_core::determinism::canonical_json::to_canonical_pretty;
use apicorpus_core::document::CanonicalDocument;
use apicorpus_core::identity::{ApiPath, SEPARATOR};
use apicorpus_core::{CorpusError, CorpusResult};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub layout: LayoutConfig,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            layout: LayoutConfig::default(),
        }
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }
}

/// A persisted document found by [`Store::list_all`].
#[derive(Debug, Clone)]
pub struct StoredDocument {
    /// Store-relative location, always `/`-separated.
    pub location: String,
    /// Identity implied by the location.
    pub path: ApiPath,
    pub document: CanonicalDocument,
}

/// A stored file the listing could not turn into a [`StoredDocument`].
#[derive(Debug, thiserror::Error)]
#[error("{location}: {error}")]
pub struct ListingError {
    /// Store-relative location of the offending entry.
    pub location: String,
    #[source]
    pub error: CorpusError,
}

impl ListingError {
    pub fn is_fatal(&self) -> bool {
        self.error.is_fatal()
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    cfg: StoreConfig,
}

impl Store {
    /// Open a store rooted at `cfg.root`, creating the directory if needed.
    pub fn open(cfg: StoreConfig) -> CorpusResult<Self> {
        fs::create_dir_all(&cfg.root)?;
        Ok(Self { cfg })
    }

    pub fn root(&self) -> &Path {
        &self.cfg.root
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.cfg.layout
    }

    /// Absolute path for a store-relative location.
    pub fn resolve(&self, location: &str) -> CorpusResult<PathBuf> {
        let mut out = self.cfg.root.clone();
        for seg in location.split(SEPARATOR) {
            if seg.is_empty() || seg == "." || seg == ".." || seg.contains('\\') {
                return Err(CorpusError::invalid_argument(format!("bad store location: {location:?}")));
            }
            out.push(seg);
        }
        Ok(out)
    }

    pub fn spec_location(&self, path: &ApiPath) -> String {
        path.to_location(&self.cfg.layout.spec_file)
    }

    pub fn fixup_location(&self, path: &ApiPath) -> String {
        path.to_location(&self.cfg.layout.fixup_file)
    }

    /// Patch file location for one identity prefix (`["acme"]`, `["acme", "v1"]`, ...).
    pub fn patch_location(&self, prefix: &[&str]) -> String {
        apicorpus_core::identity::path_to_location(prefix, &self.cfg.layout.patch_file)
    }

    /// Read and parse the JSON document at `location`. A missing file is `Ok(None)`.
    pub fn load(&self, location: &str) -> CorpusResult<Option<Value>> {
        let path = self.resolve(location)?;
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| CorpusError::serialization(format!("{location}: {e}")))?;
        Ok(Some(value))
    }

    /// Write `value` as canonical pretty JSON, creating parent directories.
    pub fn save(&self, location: &str, value: &Value) -> CorpusResult<()> {
        let path = self.resolve(location)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = to_canonical_pretty(value)?;
        fs::write(&path, &bytes)?;
        debug!(location, size = %ByteSize(bytes.len() as u64), "saved");
        Ok(())
    }

    /// Delete the file at `location`. Returns whether something was removed.
    pub fn remove(&self, location: &str) -> CorpusResult<bool> {
        let path = self.resolve(location)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(location, "removed");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self, location: &str) -> CorpusResult<bool> {
        Ok(self.resolve(location)?.is_file())
    }

    /// Persist a canonical document under its identity. Returns the location.
    pub fn save_document(&self, path: &ApiPath, body: &Value) -> CorpusResult<String> {
        let location = self.spec_location(path);
        self.save(&location, body)?;
        Ok(location)
    }

    /// Enumerate every stored document in location order.
    ///
    /// The scan is lazy and each call starts a fresh walk.
    pub fn list_all(&self) -> Listing<'_> {
        let walker = WalkDir::new(&self.cfg.root)
            .min_depth(3)
            .max_depth(4)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Listing { store: self, walker }
    }
}

/// Iterator returned by [`Store::list_all`].
pub struct Listing<'a> {
    store: &'a Store,
    walker: walkdir::IntoIter,
}

impl Listing<'_> {
    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.store.cfg.root).ok()?;
        let segments: Vec<String> = rel.iter().map(|s| s.to_string_lossy().into_owned()).collect();
        Some(segments.join("/"))
    }

    fn read_entry(&self, entry: &walkdir::DirEntry) -> Result<StoredDocument, ListingError> {
        let location = self.relative(entry.path()).ok_or_else(|| ListingError {
            location: entry.path().display().to_string(),
            error: CorpusError::invariant("entry escaped the store root"),
        })?;
        let fail = |error: CorpusError| ListingError {
            location: location.clone(),
            error,
        };

        let dirs: Vec<&str> = location.split(SEPARATOR).collect();
        let dirs = &dirs[..dirs.len() - 1];
        let path = ApiPath::from_segments(dirs).map_err(|e| fail(CorpusError::identity(e.to_string())))?;

        let body = match self.store.load(&location) {
            Ok(Some(body)) => body,
            Ok(None) => return Err(fail(CorpusError::invariant("vanished during scan"))),
            Err(e) => return Err(fail(e)),
        };
        let document = CanonicalDocument::new(body).map_err(fail)?;
        Ok(StoredDocument { location, path, document })
    }
}

impl Iterator for Listing<'_> {
    type Item = Result<StoredDocument, ListingError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(e) => e,
                Err(e) => {
                    let location = e
                        .path()
                        .and_then(|p| self.relative(p))
                        .unwrap_or_default();
                    return Some(Err(ListingError {
                        location,
                        error: CorpusError::Io(io::Error::from(e)),
                    }));
                }
            };
            if !entry.file_type().is_file() || entry.file_name() != self.store.cfg.layout.spec_file.as_str() {
                continue;
            }
            return Some(self.read_entry(&entry));
        }
    }
}
