use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use tracing::{debug, instrument};

use crate::{ReelguardError, Result};

/// Durable key-value slot holding the encoded snapshot.
pub trait StateStore: Send + Sync {
    /// Read the stored snapshot, `None` if nothing was saved yet.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored snapshot.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be written.
    fn save(&self, contents: &str) -> Result<()>;

    /// Remove the stored snapshot.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be modified.
    fn clear(&self) -> Result<()>;

    /// Human-readable location, used by the CLI.
    fn location(&self) -> String;
}

/// JSON file on disk, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No persisted player state found");
                Ok(None)
            }
            Err(e) => Err(ReelguardError::io_at(e, &self.path)),
        }
    }

    fn save(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ReelguardError::io_at(e, parent))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents).map_err(|e| ReelguardError::io_at(e, &tmp_path))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| ReelguardError::io_at(e, &self.path))?;

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ReelguardError::io_at(e, &self.path)),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process store used when persistence is disabled and in tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    contents: Mutex<Option<String>>,
    saves: AtomicUsize,
}

impl MemoryStateStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `contents`
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of saves performed so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, contents: &str) -> Result<()> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_string());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
