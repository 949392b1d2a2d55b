use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::cache::entry::SeenEntry;
use crate::posting::Posting;
use crate::types::identifiers::PostingId;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error on seen-cache {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Seen-cache {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted, append-only set of posting identities already processed.
///
/// Entries keep discovery order. There is no eviction: the file grows with
/// every new posting ever recorded.
///
/// Single-writer. Nothing here locks; the orchestrator owns the only `&mut`.
#[derive(Debug)]
pub struct SeenCache {
    path: PathBuf,
    entries: Vec<SeenEntry>,
    index: HashSet<PostingId>,
}

impl SeenCache {
    /// Reads persisted state. A missing file is a first run and yields an
    /// empty cache; an unreadable or malformed file is an error, never a
    /// silent reset.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no seen-cache yet, starting empty");
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        let entries: Vec<SeenEntry> = match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(source) => return Err(CacheError::Corrupt { path, source }),
        };

        debug!(path = %path.display(), entries = entries.len(), "loaded seen-cache");
        Ok(Self::from_entries(path, entries))
    }

    /// An empty cache that will be persisted to `path` on [`SeenCache::save`].
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::from_entries(path.into(), Vec::new())
    }

    fn from_entries(path: PathBuf, entries: Vec<SeenEntry>) -> Self {
        let index = entries.iter().map(|e| e.hash.clone()).collect();
        Self {
            path,
            entries,
            index,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[SeenEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &PostingId) -> bool {
        self.index.contains(id)
    }

    pub fn is_new(&self, posting: &Posting) -> bool {
        !self.contains(&posting.id())
    }

    /// Appends an entry stamped with the current time if the posting is new.
    /// Returns whether anything was appended.
    pub fn record(&mut self, posting: &Posting) -> bool {
        self.record_at(posting, Utc::now())
    }

    pub fn record_at(&mut self, posting: &Posting, first_seen: DateTime<Utc>) -> bool {
        let id = posting.id();
        if !self.index.insert(id.clone()) {
            return false;
        }

        self.entries.push(SeenEntry {
            hash: id,
            first_seen,
            title: posting.title.clone(),
        });
        true
    }

    /// Overwrites the persisted file with the full entry sequence.
    ///
    /// Writes a sibling temp file first and renames it into place, so a crash
    /// mid-write leaves the previous state intact.
    pub fn save(&self) -> Result<(), CacheError> {
        let io_err = |source: std::io::Error| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let f = fs::File::create(&temp_path).map_err(io_err)?;
        let mut writer = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut writer, &self.entries)?;
        writer.flush().map_err(io_err)?;
        writer.get_ref().sync_all().map_err(io_err)?;
        drop(writer);

        fs::rename(&temp_path, &self.path).map_err(io_err)?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "saved seen-cache");
        Ok(())
    }
}
