#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Score persistence adapters implementing [`ScoreStore`].
//!
//! [`JsonFileStore`] keeps one JSON object of integer values per player
//! profile and rewrites it atomically on every save. [`MemoryStore`] keeps
//! values in process for ephemeral runs.

mod atomic_io;

use std::{
    collections::BTreeMap,
    convert::Infallible,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};
use zombie_io_core::ScoreStore;

const APP_DIR_NAME: &str = "zombie-io";
const PROFILE_SUFFIX: &str = ".scores.json";

/// Errors raised while opening or writing a score file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform exposes no per-user data directory.
    #[error("no user data directory available on this platform")]
    NoDataDir,
    /// The profile name cannot be used as a file name.
    #[error("invalid profile name {0:?}")]
    InvalidProfile(String),
    /// Reading or writing the score file failed.
    #[error("score file {path} could not be accessed")]
    Io {
        /// Path of the score file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The score file exists but does not hold a JSON object of integers.
    #[error("score file {path} is malformed")]
    Malformed {
        /// Path of the score file.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The values could not be encoded.
    #[error("scores could not be encoded")]
    Encode(#[source] serde_json::Error),
}

/// Default directory holding profile score files.
pub fn default_save_dir() -> Result<PathBuf, StorageError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(StorageError::NoDataDir)
}

/// Score store backed by `<dir>/<profile>.scores.json`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonFileStore {
    /// Opens the score file of `profile` inside `dir`.
    pub fn for_profile(dir: &Path, profile: &str) -> Result<Self, StorageError> {
        if profile.is_empty()
            || profile.starts_with('.')
            || profile.contains(['/', '\\'])
        {
            return Err(StorageError::InvalidProfile(profile.to_owned()));
        }
        Self::open(dir.join(format!("{profile}{PROFILE_SUFFIX}")))
    }

    /// Opens the score file at `path`; a missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| StorageError::Malformed {
                path: path.clone(),
                source,
            })?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no score file yet, starting fresh");
                BTreeMap::new()
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        Ok(Self { path, values })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(&self.values).map_err(StorageError::Encode)?;
        atomic_io::write_text_atomic(&self.path, &text).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "scores saved");
        Ok(())
    }
}

impl ScoreStore for JsonFileStore {
    type Error = StorageError;

    fn load(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn save(&mut self, key: &str, value: i64) -> Result<(), Self::Error> {
        let _ = self.values.insert(key.to_owned(), value);
        self.flush()
    }
}

/// Score store that lives only as long as the process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, i64>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the store with `key` preset to `value`.
    #[must_use]
    pub fn with_value(mut self, key: &str, value: i64) -> Self {
        let _ = self.values.insert(key.to_owned(), value);
        self
    }
}

impl ScoreStore for MemoryStore {
    type Error = Infallible;

    fn load(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn save(&mut self, key: &str, value: i64) -> Result<(), Self::Error> {
        let _ = self.values.insert(key.to_owned(), value);
        Ok(())
    }
}
