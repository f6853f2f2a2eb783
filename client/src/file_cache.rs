use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

use tracing::info;

/// Names of the media files the client already has on disk.
///
/// Rebuilt from the directory listing at startup, then only grows as files
/// are fetched.
#[derive(Debug)]
pub struct LocalFileCache {
    dir: PathBuf,
    names: HashSet<String>,
}

impl LocalFileCache {
    pub fn load(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let mut names = HashSet::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() { continue }
            if let Ok(name) = entry.file_name().into_string() {
                names.insert(name);
            }
        }

        info!("Local cache has {} files in {:?}", names.len(), &dir);
        Ok(LocalFileCache { dir, names })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: String) -> bool {
        self.names.insert(name)
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
