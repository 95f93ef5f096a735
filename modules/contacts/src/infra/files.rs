//! Filesystem store for uploaded contact files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Every upload is stored under this fixed name, overwriting the previous
/// one; the ingestion worker removes it once processed.
pub const UPLOAD_FILE_NAME: &str = "contact_list.json";

/// Directory holding uploaded contact files.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet (0755 on unix).
    pub fn ensure_dir(&self) -> Result<()> {
        if self.dir.exists() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("cannot create upload dir {}", self.dir.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.dir, std::fs::Permissions::from_mode(0o755))
                .with_context(|| format!("cannot set permissions on {}", self.dir.display()))?;
        }

        Ok(())
    }

    /// Persist uploaded bytes under the fixed upload name, returning the
    /// stored path.
    pub async fn store(&self, bytes: &[u8]) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.dir.join(UPLOAD_FILE_NAME);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(path)
    }

    /// JSON files currently sitting in the directory, oldest first.
    pub fn json_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<(std::time::SystemTime, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("cannot read upload dir {}", self.dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_json = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("json"))
                .unwrap_or(false);
            if !is_json {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            files.push((modified, path));
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files.into_iter().map(|(_, p)| p).collect())
    }

    /// Remove a processed file; missing files are not an error.
    pub fn remove(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("cannot remove {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn store_creates_dir_and_overwrites() {
        let tmp = tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("contacts"));
        assert!(!store.dir().exists());

        let first = store.store(b"[]").await.unwrap();
        assert!(store.dir().exists());
        assert!(first.ends_with(UPLOAD_FILE_NAME));

        let second = store.store(b"[{}]").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second).unwrap(), b"[{}]");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn created_dir_has_standard_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("contacts"));
        store.ensure_dir().unwrap();

        let mode = std::fs::metadata(store.dir()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[tokio::test]
    async fn json_files_lists_only_json() {
        let tmp = tempdir().unwrap();
        let store = UploadStore::new(tmp.path());

        std::fs::write(tmp.path().join("a.json"), b"[]").unwrap();
        std::fs::write(tmp.path().join("b.txt"), b"nope").unwrap();

        let files = store.json_files().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.json"));

        store.remove(&files[0]).unwrap();
        assert!(store.json_files().unwrap().is_empty());
        // removing again is fine
        store.remove(&files[0]).unwrap();
    }
}
