//! Tiled transparency log access
//!
//! This crate reads a log published in the https://c2sp.org/tlog-tiles
//! layout and builds RFC 6962 inclusion proofs from its tiles without
//! downloading the whole tree. Storage is pluggable through [`TileFetcher`]:
//!
//! - [`FileSystemTiles`]: a log mirrored into a local directory
//! - [`HttpTiles`]: a log served over HTTP(S)
//! - [`InMemoryTiles`]: a log computed in memory from leaf hashes
//!
//! # Example
//!
//! ```no_run
//! use tlog_tiles::{FileSystemTiles, ProofBuilder, TileFetcher};
//!
//! # async fn example() -> Result<(), tlog_tiles::Error> {
//! let tiles = FileSystemTiles::new("/srv/log");
//! let proof = ProofBuilder::new(1000, tiles)
//!     .with_concurrency(4)
//!     .inclusion_proof(41)
//!     .await?;
//! println!("{} hashes", proof.len());
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod filesystem;
mod http;
pub mod layout;
mod memory;

pub use builder::{ProofBuilder, DEFAULT_CONCURRENCY};
pub use error::{Error, Result};
pub use filesystem::FileSystemTiles;
pub use http::HttpTiles;
pub use layout::{TileId, TileSpan, CHECKPOINT_PATH, TILE_HEIGHT, TILE_WIDTH};
pub use memory::InMemoryTiles;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Read access to a tiled log
///
/// Implementations return raw bytes; validation against the tile width
/// happens in the [`ProofBuilder`]. Errors are not retried here.
pub trait TileFetcher: Send + Sync {
    /// Fetch the latest signed checkpoint
    fn read_checkpoint(&self) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>>;

    /// Fetch the contents of one tile
    fn read_tile(&self, tile: TileId) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>>;
}

impl<T: TileFetcher + ?Sized> TileFetcher for Arc<T> {
    fn read_checkpoint(&self) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>> {
        (**self).read_checkpoint()
    }

    fn read_tile(&self, tile: TileId) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>> {
        (**self).read_tile(tile)
    }
}

impl TileFetcher for Box<dyn TileFetcher> {
    fn read_checkpoint(&self) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>> {
        (**self).read_checkpoint()
    }

    fn read_tile(&self, tile: TileId) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>> {
        (**self).read_tile(tile)
    }
}

impl<T: TileFetcher + ?Sized> TileFetcher for &T {
    fn read_checkpoint(&self) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>> {
        (**self).read_checkpoint()
    }

    fn read_tile(&self, tile: TileId) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>> {
        (**self).read_tile(tile)
    }
}
