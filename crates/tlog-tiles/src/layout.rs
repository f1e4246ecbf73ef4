//! Tile addressing per https://c2sp.org/tlog-tiles
//!
//! A tile at level `L` holds up to 256 consecutive hashes of tree level
//! `8 * L`. Full tiles are immutable; the rightmost tile of a level may be
//! partial and is then addressed with its width.
//!
//! ```text
//! checkpoint
//! tile/0/x001/x234/067
//! tile/0/x001/x234/068.p/13
//! tile/1/004
//! ```

use crate::error::{Error, Result};
use std::fmt;
use tlog_merkle::Subtree;

/// Tree levels covered by one tile level
pub const TILE_HEIGHT: u32 = 8;

/// Hashes in a full tile
pub const TILE_WIDTH: u32 = 1 << TILE_HEIGHT;

/// Path of the latest checkpoint relative to the log root
pub const CHECKPOINT_PATH: &str = "checkpoint";

const HASH_SIZE: usize = 32;

/// Identifies one tile as stored by the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId {
    /// Tile level; the tile holds hashes of tree level `level * 8`
    pub level: u8,
    /// Position among the tiles of this level
    pub index: u64,
    /// Number of hashes, 256 for a full tile
    pub width: u32,
}

impl TileId {
    pub fn full(level: u8, index: u64) -> Self {
        Self {
            level,
            index,
            width: TILE_WIDTH,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.width < TILE_WIDTH
    }

    /// Expected byte length of the tile contents
    pub fn byte_len(&self) -> usize {
        self.width as usize * HASH_SIZE
    }

    /// Path of the tile relative to the log root
    pub fn path(&self) -> String {
        let mut path = format!("tile/{}/{}", self.level, index_path(self.index));
        if self.is_partial() {
            path.push_str(&format!(".p/{}", self.width));
        }
        path
    }

    /// The tile of a tree with `tree_size` leaves holding the hash at
    /// `(level * 8, node_index)`
    pub fn containing(level: u8, node_index: u64, tree_size: u64) -> Self {
        let nodes = level_width(tree_size, level);
        let index = node_index / TILE_WIDTH as u64;
        let width = if index < nodes / TILE_WIDTH as u64 {
            TILE_WIDTH
        } else {
            (nodes % TILE_WIDTH as u64) as u32
        };
        Self {
            level,
            index,
            width,
        }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where the hashes for one perfect subtree live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    pub tile: TileId,
    /// First hash within the tile
    pub offset: usize,
    /// Number of consecutive hashes, always a power of two
    pub count: usize,
}

impl TileSpan {
    /// Locate the tile hashes that fold into `subtree` in a tree of
    /// `tree_size` leaves.
    ///
    /// The subtree at tree level `l` is covered by `2^(l % 8)` hashes of the
    /// tile at level `l / 8`; folding them pairwise yields the subtree hash.
    pub fn for_subtree(subtree: Subtree, tree_size: u64) -> Result<Self> {
        if subtree.end() > tree_size {
            return Err(Error::IndexOutOfRange {
                index: subtree.end() - 1,
                size: tree_size,
            });
        }
        let level = (subtree.level / TILE_HEIGHT) as u8;
        let shift = subtree.level % TILE_HEIGHT;
        let base = subtree.index << shift;
        let span = TileSpan {
            tile: TileId::containing(level, base, tree_size),
            offset: (base % TILE_WIDTH as u64) as usize,
            count: 1 << shift,
        };
        if span.offset + span.count > span.tile.width as usize {
            return Err(Error::InvalidTile(format!(
                "subtree at level {} index {} is not covered by {}",
                subtree.level, subtree.index, span.tile
            )));
        }
        Ok(span)
    }
}

/// Number of complete hashes at tree level `level * 8`
pub(crate) fn level_width(tree_size: u64, level: u8) -> u64 {
    let shift = level as u32 * TILE_HEIGHT;
    if shift >= 64 {
        0
    } else {
        tree_size >> shift
    }
}

/// Encode a tile index as 3-digit path elements, all but the last
/// prefixed with `x`
fn index_path(mut index: u64) -> String {
    let mut parts = vec![format!("{:03}", index % 1000)];
    index /= 1000;
    while index > 0 {
        parts.push(format!("x{:03}", index % 1000));
        index /= 1000;
    }
    parts.reverse();
    parts.join("/")
}
