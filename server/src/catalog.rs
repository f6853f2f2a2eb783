//! Media files the server offers to its clients.
//! Listed once at startup and never refreshed while the process runs.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, debug};

const MEDIA_EXTENSIONS: [&str; 8] = ["wav", "mp3", "ogg", "flac", "m4a", "aac", "aif", "aiff"];

#[derive(Debug, Clone)]
pub struct Catalog {
    dir: PathBuf,
    files: Vec<String>,
}

impl Catalog {
    pub fn load(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        let files = list_local_media(&dir)?;
        info!("Catalog of {} media files loaded from {:?}", files.len(), &dir);
        Ok(Catalog { dir, files })
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f == name)
    }

    // resolve a catalog name to its on disk path, None if not offered
    pub fn path_of(&self, name: &str) -> Option<PathBuf> {
        if self.contains(name) {
            Some(self.dir.join(name))
        } else {
            None
        }
    }
}

pub fn list_local_media(dir: &Path) -> io::Result<Vec<String>> {
    let mut files = vec![];

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() { continue }

        let Ok(name) = entry.file_name().into_string() else {
            debug!("skipping non utf8 file name {:?}", entry.file_name());
            continue
        };

        if is_media(&name) {
            files.push(name);
        }
    }

    files.sort();
    Ok(files)
}

fn is_media(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MEDIA_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lists_media_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mp3", "a.wav", "notes.txt", "C.FLAC"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.wav")).unwrap();

        let catalog = Catalog::load(dir.path()).unwrap();
        assert_eq!(catalog.files(), &["C.FLAC", "a.wav", "b.mp3"]);
    }

    #[test]
    fn path_of_only_resolves_catalog_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.wav"), b"x").unwrap();
        fs::write(dir.path().join("secret.txt"), b"x").unwrap();

        let catalog = Catalog::load(dir.path()).unwrap();
        assert_eq!(catalog.path_of("a.wav"), Some(dir.path().join("a.wav")));
        assert_eq!(catalog.path_of("secret.txt"), None);
        assert_eq!(catalog.path_of("../a.wav"), None);
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Catalog::load(dir.path().join("nope")).is_err());
    }
}
