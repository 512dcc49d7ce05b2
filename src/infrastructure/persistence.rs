use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// Named slices of persisted state. Each partition is written as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    User,
    Workout,
    Program,
}

impl Partition {
    pub fn key(&self) -> &'static str {
        match self {
            Partition::User => "user",
            Partition::Workout => "workout",
            Partition::Program => "program",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to access {partition} storage: {source}")]
    Io {
        partition: Partition,
        #[source]
        source: io::Error,
    },
    #[error("Stored {partition} data is unreadable: {source}")]
    Corrupt {
        partition: Partition,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize {partition} data: {source}")]
    Serialize {
        partition: Partition,
        #[source]
        source: serde_json::Error,
    },
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Key-value storage of JSON documents, one per partition.
pub trait KeyValueStore {
    fn read(&self, partition: Partition) -> PersistenceResult<Option<String>>;
    fn write(&self, partition: Partition, contents: &str) -> PersistenceResult<()>;
    fn remove(&self, partition: Partition) -> PersistenceResult<()>;
}

/// Loads and decodes a partition. `None` means nothing has been stored yet.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, partition: Partition) -> PersistenceResult<Option<T>> {
    match store.read(partition)? {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| PersistenceError::Corrupt { partition, source }),
        None => Ok(None),
    }
}

pub fn save<T: Serialize>(store: &dyn KeyValueStore, partition: Partition, value: &T) -> PersistenceResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|source| PersistenceError::Serialize { partition, source })?;
    store.write(partition, &json)
}

/// Stores each partition as `<dir>/<partition>.json`.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// reader sees either the previous or the new document.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, partition: Partition) -> PathBuf {
        self.dir.join(format!("{}.json", partition.key()))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, partition: Partition) -> PersistenceResult<Option<String>> {
        match fs::read_to_string(self.path_for(partition)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io { partition, source }),
        }
    }

    fn write(&self, partition: Partition, contents: &str) -> PersistenceResult<()> {
        let io_err = |source| PersistenceError::Io { partition, source };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let target = self.path_for(partition);
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(io_err)?;
        fs::rename(&tmp, &target).map_err(io_err)?;
        tracing::trace!(partition = %partition, bytes = contents.len(), "partition written");
        Ok(())
    }

    fn remove(&self, partition: Partition) -> PersistenceResult<()> {
        match fs::remove_file(self.path_for(partition)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Io { partition, source }),
        }
    }
}

/// In-process store. Clones share the same contents, so a second handle can
/// stand in for a reloaded process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<Partition, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, partition: Partition) -> PersistenceResult<Option<String>> {
        Ok(self.entries.borrow().get(&partition).cloned())
    }

    fn write(&self, partition: Partition, contents: &str) -> PersistenceResult<()> {
        self.entries.borrow_mut().insert(partition, contents.to_string());
        Ok(())
    }

    fn remove(&self, partition: Partition) -> PersistenceResult<()> {
        self.entries.borrow_mut().remove(&partition);
        Ok(())
    }
}
