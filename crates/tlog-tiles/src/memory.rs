//! In-memory tiled log

use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use tlog_merkle::{hash_children, tree_root};
use tlog_types::Sha256Hash;

use crate::layout::{level_width, TileId, CHECKPOINT_PATH, TILE_HEIGHT, TILE_WIDTH};
use crate::{Error, Result, TileFetcher};

/// A log held entirely in memory
///
/// Built from leaf hashes, it serves exactly the tiles a tiled log of that
/// size would publish: every full tile plus the partial rightmost tile of
/// each level. Useful for tests and for writing fixture logs to disk.
///
/// # Example
///
/// ```
/// use tlog_merkle::hash_leaf;
/// use tlog_tiles::InMemoryTiles;
///
/// let leaves = (0u8..10).map(|i| hash_leaf(&[i])).collect();
/// let log = InMemoryTiles::from_leaf_hashes(leaves);
/// assert_eq!(log.size(), 10);
/// assert_eq!(log.tiles().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTiles {
    /// Complete node hashes per tree level, leaves first
    levels: Vec<Vec<Sha256Hash>>,
    checkpoint: Option<Vec<u8>>,
    fetches: AtomicUsize,
}

impl InMemoryTiles {
    /// Build the tree over the given leaf hashes
    pub fn from_leaf_hashes(leaves: Vec<Sha256Hash>) -> Self {
        let mut levels = vec![leaves];
        while let Some(below) = levels.last().filter(|level| level.len() > 1) {
            let above = below
                .chunks_exact(2)
                .map(|pair| hash_children(&pair[0], &pair[1]))
                .collect();
            levels.push(above);
        }
        Self {
            levels,
            checkpoint: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Serve this signed checkpoint
    pub fn with_checkpoint(mut self, checkpoint: impl Into<Vec<u8>>) -> Self {
        self.checkpoint = Some(checkpoint.into());
        self
    }

    /// Number of leaves
    pub fn size(&self) -> u64 {
        self.levels.first().map_or(0, |leaves| leaves.len() as u64)
    }

    /// Root hash of the whole tree
    pub fn root_hash(&self) -> Sha256Hash {
        tree_root(self.levels.first().map_or(&[][..], |leaves| leaves.as_slice()))
    }

    /// Number of tile reads served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Every tile the log publishes at its current size, with contents
    pub fn tiles(&self) -> Vec<(TileId, Vec<u8>)> {
        let size = self.size();
        let mut tiles = Vec::new();
        for level in 0..=u8::MAX {
            let nodes = level_width(size, level);
            if nodes == 0 {
                break;
            }
            let full = nodes / TILE_WIDTH as u64;
            for index in 0..full {
                let tile = TileId::full(level, index);
                if let Some(bytes) = self.tile_bytes(tile) {
                    tiles.push((tile, bytes));
                }
            }
            let rest = (nodes % TILE_WIDTH as u64) as u32;
            if rest > 0 {
                let tile = TileId {
                    level,
                    index: full,
                    width: rest,
                };
                if let Some(bytes) = self.tile_bytes(tile) {
                    tiles.push((tile, bytes));
                }
            }
        }
        tiles
    }

    /// Contents of a tile, if the log publishes it at this exact width
    fn tile_bytes(&self, tile: TileId) -> Option<Vec<u8>> {
        if tile.width == 0 || tile.width > TILE_WIDTH {
            return None;
        }
        if TileId::containing(tile.level, tile.index * TILE_WIDTH as u64, self.size()) != tile {
            return None;
        }
        let hashes = self
            .levels
            .get(tile.level as usize * TILE_HEIGHT as usize)?;
        let start = usize::try_from(tile.index).ok()? * TILE_WIDTH as usize;
        let end = start + tile.width as usize;
        let slice = hashes.get(start..end)?;
        Some(slice.iter().flat_map(|h| h.as_slice().iter().copied()).collect())
    }
}

impl TileFetcher for InMemoryTiles {
    fn read_checkpoint(
        &self,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<u8>>> + Send + '_>> {
        Box::pin(async move {
            self.checkpoint
                .clone()
                .ok_or_else(|| Error::NotFound(CHECKPOINT_PATH.to_string()))
        })
    }

    fn read_tile(
        &self,
        tile: TileId,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<u8>>> + Send + '_>> {
        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            self.tile_bytes(tile)
                .ok_or_else(|| Error::NotFound(tile.path()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlog_merkle::hash_leaf;

    fn log(size: u64) -> InMemoryTiles {
        InMemoryTiles::from_leaf_hashes((0..size).map(|i| hash_leaf(&i.to_be_bytes())).collect())
    }

    #[test]
    fn test_root_hash_matches_tree_root() {
        let log = log(13);
        let leaves: Vec<Sha256Hash> = (0..13u64).map(|i| hash_leaf(&i.to_be_bytes())).collect();
        assert_eq!(log.root_hash(), tree_root(&leaves));
    }

    #[test]
    fn test_published_tiles() {
        let log = log(300);
        let ids: Vec<TileId> = log.tiles().into_iter().map(|(id, _)| id).collect();
        assert_eq!(
            ids,
            vec![
                TileId::full(0, 0),
                TileId {
                    level: 0,
                    index: 1,
                    width: 44
                },
                TileId {
                    level: 1,
                    index: 0,
                    width: 1
                },
            ]
        );
        for (id, bytes) in log.tiles() {
            assert_eq!(bytes.len(), id.byte_len());
        }
    }

    #[test]
    fn test_level_one_tile_holds_subtree_roots() {
        let log = log(300);
        let leaves: Vec<Sha256Hash> = (0..256u64).map(|i| hash_leaf(&i.to_be_bytes())).collect();
        let (_, bytes) = log.tiles().pop().unwrap();
        assert_eq!(bytes, tree_root(&leaves).as_slice());
    }

    #[tokio::test]
    async fn test_serves_only_published_widths() {
        let log = log(300);
        assert!(log.read_tile(TileId::full(0, 0)).await.is_ok());
        assert!(log
            .read_tile(TileId {
                level: 0,
                index: 0,
                width: 10
            })
            .await
            .is_err());
        assert!(log.read_tile(TileId::full(0, 1)).await.is_err());
        assert_eq!(log.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_checkpoint() {
        assert!(matches!(
            log(1).read_checkpoint().await,
            Err(Error::NotFound(_))
        ));
        let log = log(1).with_checkpoint(b"note".to_vec());
        assert_eq!(log.read_checkpoint().await.unwrap(), b"note");
    }

    #[test]
    fn test_empty_log() {
        let log = InMemoryTiles::from_leaf_hashes(vec![]);
        assert_eq!(log.size(), 0);
        assert!(log.tiles().is_empty());
    }
}
