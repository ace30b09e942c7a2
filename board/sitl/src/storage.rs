//! Directory-backed storage sink

use std::io;
use std::path::{Path, PathBuf};

use hal::StorageSink;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Stores capture artifacts as files in one directory
#[derive(Debug, Clone)]
pub struct FsStorage {
    dir: PathBuf,
}

impl FsStorage {
    /// Use `dir`, creating it when missing
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// CSV files in the directory with their sizes, sorted by name
    pub async fn list(&self) -> io::Result<Vec<(String, u64)>> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".csv") {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                files.push((name, metadata.len()));
            }
        }
        files.sort();
        Ok(files)
    }

    pub async fn read_to_string(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.path_of(name)).await
    }
}

impl StorageSink for FsStorage {
    type File = File;
    type Error = io::Error;

    async fn create(&mut self, name: &str) -> io::Result<File> {
        File::create(self.path_of(name)).await
    }

    async fn write(&mut self, file: &mut File, bytes: &[u8]) -> io::Result<()> {
        file.write_all(bytes).await?;
        file.flush().await
    }

    async fn close(&mut self, file: File) -> io::Result<()> {
        file.sync_all().await
    }
}
