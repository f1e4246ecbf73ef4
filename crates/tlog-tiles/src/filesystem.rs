//! File system based tile storage

use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::fs;
use tracing::trace;

use crate::layout::{TileId, CHECKPOINT_PATH};
use crate::{Error, Result, TileFetcher};

/// A tiled log stored in a local directory
///
/// The directory mirrors the HTTP layout of the log:
///
/// ```text
/// log_dir/
/// ├── checkpoint
/// └── tile/
///     ├── 0/
///     │   ├── 000
///     │   └── 001.p/44
///     └── 1/
///         └── 000.p/1
/// ```
#[derive(Debug, Clone)]
pub struct FileSystemTiles {
    /// Root of the log
    root: PathBuf,
}

impl FileSystemTiles {
    /// Read tiles from the given directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a slash-separated log path below the root
    fn resolve(&self, relative: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(relative.split('/'));
        path
    }

    async fn read(&self, relative: &str) -> Result<Vec<u8>> {
        let path = self.resolve(relative);
        trace!(path = %path.display(), "reading");
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(path.display().to_string()))
            }
            Err(e) => Err(Error::Io(format!("{}: {}", path.display(), e))),
        }
    }

    async fn write(&self, relative: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await?;
        Ok(())
    }

    /// Store a tile, creating directories as needed
    pub async fn store_tile(&self, tile: TileId, data: &[u8]) -> Result<()> {
        if data.len() != tile.byte_len() {
            return Err(Error::InvalidTile(format!(
                "{} must be {} bytes, got {}",
                tile,
                tile.byte_len(),
                data.len()
            )));
        }
        self.write(&tile.path(), data).await
    }

    /// Store the signed checkpoint
    pub async fn store_checkpoint(&self, checkpoint: &[u8]) -> Result<()> {
        self.write(CHECKPOINT_PATH, checkpoint).await
    }
}

impl TileFetcher for FileSystemTiles {
    fn read_checkpoint(
        &self,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<u8>>> + Send + '_>> {
        Box::pin(async move { self.read(CHECKPOINT_PATH).await })
    }

    fn read_tile(
        &self,
        tile: TileId,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<u8>>> + Send + '_>> {
        Box::pin(async move { self.read(&tile.path()).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_and_read() {
        let dir = TempDir::new().unwrap();
        let tiles = FileSystemTiles::new(dir.path());

        let tile = TileId {
            level: 0,
            index: 1234067,
            width: 2,
        };
        tiles.store_tile(tile, &[7u8; 64]).await.unwrap();
        tiles.store_checkpoint(b"note\n").await.unwrap();

        assert!(dir.path().join("tile/0/x001/x234/067.p/2").is_file());
        assert_eq!(tiles.read_tile(tile).await.unwrap(), vec![7u8; 64]);
        assert_eq!(tiles.read_checkpoint().await.unwrap(), b"note\n");
    }

    #[tokio::test]
    async fn test_missing_files() {
        let dir = TempDir::new().unwrap();
        let tiles = FileSystemTiles::new(dir.path());
        assert!(matches!(
            tiles.read_checkpoint().await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            tiles.read_tile(TileId::full(0, 0)).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_wrong_tile_size() {
        let dir = TempDir::new().unwrap();
        let tiles = FileSystemTiles::new(dir.path());
        assert!(matches!(
            tiles.store_tile(TileId::full(0, 0), &[0u8; 32]).await,
            Err(Error::InvalidTile(_))
        ));
    }
}
