use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem storage rooted at a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn full_path(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }

    pub fn remove_file(&self, path: &str) -> Result<()> {
        match fs::remove_file(self.full_path(path)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.full_path(path))?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // readers never see a partially written file
        let mut tmp_name = full_path.clone().into_os_string();
        tmp_name.push(".part");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, data)?;
        if let Err(e) = fs::rename(&tmp_path, &full_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        self.full_path(path).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        assert!(!storage.exists("nested/fires.csv").await);
        storage.write_file("nested/fires.csv", b"year\n2023").await.unwrap();

        assert!(storage.exists("nested/fires.csv").await);
        assert_eq!(storage.read_file("nested/fires.csv").await.unwrap(), b"year\n2023");
    }

    #[tokio::test]
    async fn test_write_replaces_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_file("fires.zip", b"old").await.unwrap();
        storage.write_file("fires.zip", b"new archive").await.unwrap();

        assert_eq!(storage.read_file("fires.zip").await.unwrap(), b"new archive");
        assert!(!temp_dir.path().join("fires.zip.part").exists());

        storage.remove_file("fires.zip").unwrap();
        assert!(!storage.exists("fires.zip").await);
        storage.remove_file("fires.zip").unwrap();
    }
}
