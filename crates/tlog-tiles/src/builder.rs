//! Inclusion proofs assembled from tiles

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tlog_merkle::{combine_subtrees, hash_children, inclusion_path};
use tlog_types::Sha256Hash;
use tokio::sync::RwLock;
use tracing::debug;

use crate::layout::{TileId, TileSpan};
use crate::{Error, Result, TileFetcher};

/// Tile fetches in flight at once unless configured otherwise
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Builds inclusion proofs for a fixed tree size
///
/// Every audit path entry is the hash of a leaf range, which splits into
/// perfect subtrees. Each subtree hash is read from one tile (folding the
/// in-tile hashes when the subtree sits between tile levels), so a proof
/// needs at most a handful of tiles. Tiles are memoized per builder, which
/// makes repeated proofs against the same tree cheap.
pub struct ProofBuilder<F> {
    size: u64,
    fetcher: F,
    concurrency: usize,
    tiles: RwLock<HashMap<TileId, Arc<Vec<Sha256Hash>>>>,
}

impl<F: TileFetcher> ProofBuilder<F> {
    /// Build proofs against a tree of `size` leaves
    pub fn new(size: u64, fetcher: F) -> Self {
        Self {
            size,
            fetcher,
            concurrency: DEFAULT_CONCURRENCY,
            tiles: RwLock::new(HashMap::new()),
        }
    }

    /// Limit the number of concurrent tile fetches (at least one)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Audit path for leaf `index`, ordered from the leaf up to the root
    pub async fn inclusion_proof(&self, index: u64) -> Result<Vec<Sha256Hash>> {
        if index >= self.size {
            return Err(Error::IndexOutOfRange {
                index,
                size: self.size,
            });
        }

        let ranges = inclusion_path(index, self.size)?;
        let spans = ranges
            .iter()
            .map(|range| {
                range
                    .subtrees()
                    .into_iter()
                    .map(|subtree| TileSpan::for_subtree(subtree, self.size))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let needed: BTreeSet<TileId> = spans.iter().flatten().map(|span| span.tile).collect();
        self.fetch_tiles(needed).await?;

        let tiles = self.tiles.read().await;
        let mut proof = Vec::with_capacity(spans.len());
        for parts in &spans {
            let hashes = parts
                .iter()
                .map(|span| {
                    let tile = tiles.get(&span.tile).ok_or_else(|| {
                        Error::InvalidTile(format!("{} was not loaded", span.tile))
                    })?;
                    Ok(fold_span(&tile[span.offset..span.offset + span.count]))
                })
                .collect::<Result<Vec<_>>>()?;
            let hash = combine_subtrees(&hashes)
                .ok_or_else(|| Error::InvalidTile("empty audit path range".to_string()))?;
            proof.push(hash);
        }

        debug!(index, size = self.size, hashes = proof.len(), "built inclusion proof");
        Ok(proof)
    }

    /// Fetch the tiles not already memoized, bounded by the concurrency limit
    async fn fetch_tiles(&self, needed: BTreeSet<TileId>) -> Result<()> {
        let missing: Vec<TileId> = {
            let tiles = self.tiles.read().await;
            needed
                .into_iter()
                .filter(|tile| !tiles.contains_key(tile))
                .collect()
        };
        if missing.is_empty() {
            return Ok(());
        }
        debug!(count = missing.len(), "fetching tiles");

        let fetched: Vec<(TileId, Vec<Sha256Hash>)> = stream::iter(missing)
            .map(|tile| async move {
                let bytes = self.read_tile(tile).await?;
                Ok::<_, Error>((tile, parse_tile(tile, &bytes)?))
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut tiles = self.tiles.write().await;
        for (tile, hashes) in fetched {
            tiles.insert(tile, Arc::new(hashes));
        }
        Ok(())
    }

    /// Read one tile, falling back to the full tile when a partial tile has
    /// already been replaced by it
    async fn read_tile(&self, tile: TileId) -> Result<Vec<u8>> {
        match self.fetcher.read_tile(tile).await {
            Err(Error::NotFound(path)) if tile.is_partial() => {
                let full = TileId::full(tile.level, tile.index);
                debug!(partial = %path, full = %full, "partial tile missing, reading full tile");
                self.fetcher.read_tile(full).await
            }
            result => result,
        }
    }
}

/// Split tile bytes into hashes, checking the length against the width.
///
/// A longer tile (the full tile read for a partial one) keeps only the first
/// `width` hashes.
fn parse_tile(tile: TileId, bytes: &[u8]) -> Result<Vec<Sha256Hash>> {
    if bytes.len() < tile.byte_len() || bytes.len() % 32 != 0 {
        return Err(Error::InvalidTile(format!(
            "{} has {} bytes, expected {}",
            tile,
            bytes.len(),
            tile.byte_len()
        )));
    }
    bytes[..tile.byte_len()]
        .chunks_exact(32)
        .map(|chunk| Sha256Hash::try_from_slice(chunk).map_err(|e| Error::InvalidTile(e.to_string())))
        .collect()
}

/// Hash a power-of-two run of sibling hashes up to their common root
fn fold_span(hashes: &[Sha256Hash]) -> Sha256Hash {
    let mut level = hashes.to_vec();
    while level.len() > 1 {
        level = level
            .chunks_exact(2)
            .map(|pair| hash_children(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlog_merkle::hash_leaf;

    #[test]
    fn test_fold_span() {
        let leaves: Vec<Sha256Hash> = (0u8..4).map(|i| hash_leaf(&[i])).collect();
        assert_eq!(fold_span(&leaves[..1]), leaves[0]);
        assert_eq!(fold_span(&leaves), tlog_merkle::tree_root(&leaves));
    }

    #[test]
    fn test_parse_tile() {
        let tile = TileId {
            level: 0,
            index: 0,
            width: 2,
        };
        assert_eq!(parse_tile(tile, &[1u8; 64]).unwrap().len(), 2);
        assert!(matches!(
            parse_tile(tile, &[1u8; 63]),
            Err(Error::InvalidTile(_))
        ));
        assert!(matches!(
            parse_tile(tile, &[1u8; 65]),
            Err(Error::InvalidTile(_))
        ));
    }

    #[test]
    fn test_parse_tile_truncates_full_tile() {
        let tile = TileId {
            level: 0,
            index: 0,
            width: 2,
        };
        let mut bytes = vec![1u8; 64];
        bytes.extend_from_slice(&[2u8; 32 * 254]);
        let hashes = parse_tile(tile, &bytes).unwrap();
        assert_eq!(hashes, vec![Sha256Hash::from_bytes([1u8; 32]); 2]);
    }
}
