use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::{TalusError, TalusResult};

/// File extensions the directory store treats as raster buffers.
const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Named, file-like buffer collection exchanged between pipeline stages.
///
/// Stages never touch the filesystem directly; they list, read, and write
/// named byte buffers through this seam. Decoding happens at the stage
/// boundary, not in the store.
pub trait BufferStore {
    /// List buffer names in ascending order.
    fn list(&self) -> TalusResult<Vec<String>>;

    /// Read the raw bytes of a named buffer.
    fn read(&self, name: &str) -> TalusResult<Vec<u8>>;

    /// Persist raw bytes under a name, replacing any existing buffer.
    fn write(&mut self, name: &str, bytes: &[u8]) -> TalusResult<()>;
}

/// Directory-backed [`BufferStore`].
///
/// `list` returns only plain files with a known raster extension, sorted.
/// Read failures surface as [`TalusError::UnreadableBuffer`] so batch runners
/// can skip the item; write failures are catastrophic and propagate.
#[derive(Clone, Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open an existing directory for reading.
    pub fn open(root: impl Into<PathBuf>) -> TalusResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(TalusError::validation(format!(
                "'{}' is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Create the directory (and parents) if needed and open it for output.
    pub fn create(root: impl Into<PathBuf>) -> TalusResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create output dir '{}'", root.display()))?;
        Ok(Self { root })
    }

    /// Root directory backing this store.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BufferStore for DirStore {
    fn list(&self) -> TalusResult<Vec<String>> {
        let rd = std::fs::read_dir(&self.root)
            .with_context(|| format!("list dir '{}'", self.root.display()))?;

        let mut names = Vec::new();
        for entry in rd {
            let entry = entry.with_context(|| format!("list dir '{}'", self.root.display()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            if !RASTER_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> TalusResult<Vec<u8>> {
        std::fs::read(self.root.join(name)).map_err(|e| TalusError::unreadable(name, e))
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> TalusResult<()> {
        let path = self.root.join(name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("write buffer '{}'", path.display()))?;
        Ok(())
    }
}

/// In-memory [`BufferStore`] for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    buffers: BTreeMap<String, Vec<u8>>,
}

impl MemStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a buffer with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.buffers.contains_key(name)
    }

    /// Number of buffers held.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the store holds no buffers.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl BufferStore for MemStore {
    fn list(&self) -> TalusResult<Vec<String>> {
        Ok(self.buffers.keys().cloned().collect())
    }

    fn read(&self, name: &str) -> TalusResult<Vec<u8>> {
        self.buffers
            .get(name)
            .cloned()
            .ok_or_else(|| TalusError::unreadable(name, "no such buffer"))
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> TalusResult<()> {
        self.buffers.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
