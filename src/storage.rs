//! Resource store abstraction for point datasets.
//!
//! A store maps a resource key (e.g. `"child0"` or `"d2013"`) to the raw
//! encoded bytes of a point dataset. Decoding happens in the loader.

use crate::error::Result;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Trait for point-resource backends
///
/// A missing resource is `Ok(None)`, not an error; I/O failures are errors.
pub trait ResourceStore {
    /// Fetch the encoded bytes stored under `key`
    fn fetch(&self, key: &str) -> Result<Option<Bytes>>;

    /// Check if a resource exists
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.fetch(key)?.is_some())
    }

    /// All resource keys, sorted
    fn keys(&self) -> Result<Vec<String>>;
}

impl<S: ResourceStore + ?Sized> ResourceStore for Box<S> {
    fn fetch(&self, key: &str) -> Result<Option<Bytes>> {
        (**self).fetch(key)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        (**self).contains(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

/// In-memory resource store using BTreeMap
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: BTreeMap<String, Bytes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a resource
    pub fn insert(&mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Option<Bytes> {
        self.data.insert(key.into(), data.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(key, data);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Bytes> {
        self.data.remove(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ResourceStore for MemoryStore {
    fn fetch(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.data.get(key).cloned())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.data.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.data.keys().cloned().collect())
    }
}

/// Resource store backed by a directory of files.
///
/// A key resolves to the first existing file among `<key>`, `<key>.json`
/// and, with the `geojson` feature, `<key>.geojson`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    #[cfg(feature = "geojson")]
    const EXTENSIONS: &'static [&'static str] = &["", "json", "geojson"];
    #[cfg(not(feature = "geojson"))]
    const EXTENSIONS: &'static [&'static str] = &["", "json"];

    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Option<PathBuf> {
        // Keys are bare names; anything that could walk out of the root is not a resource.
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return None;
        }

        Self::EXTENSIONS.iter().find_map(|ext| {
            let path = if ext.is_empty() {
                self.root.join(key)
            } else {
                self.root.join(format!("{}.{}", key, ext))
            };
            path.is_file().then_some(path)
        })
    }
}

impl ResourceStore for DirectoryStore {
    fn fetch(&self, key: &str) -> Result<Option<Bytes>> {
        match self.resolve(key) {
            Some(path) => {
                log::debug!("Reading resource '{}' from {}", key, path.display());
                Ok(Some(Bytes::from(std::fs::read(path)?)))
            }
            None => Ok(None),
        }
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.resolve(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
            if !ext.is_empty() && !Self::EXTENSIONS.contains(&ext) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}
