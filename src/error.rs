//! Error taxonomy for the forest/tree engine.
//!
//! One enum, one `Result` alias, mirroring the error module shape used
//! throughout the retrieval corpus (a flat `thiserror::Error` enum with a
//! `#[from]` conversion at each layer boundary).

use thiserror::Error;

/// Unified error type for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An entry handed to the forest/tree layer was not exactly 32 bytes.
    #[error("entry must be exactly 32 bytes, got {0}")]
    InvalidEntryLength(usize),

    /// A blob opened as a `Tree` has a length that is not `(2^h - 1) * 32`
    /// for any integer `h >= 1`.
    #[error("blob length {0} is not a valid tree blob length")]
    InvalidBlobLength(usize),

    /// `Tree::merge` was asked to merge two trees of differing height.
    #[error("cannot merge trees of differing height ({left} != {right})")]
    HeightMismatch { left: u8, right: u8 },

    /// A `Forest` was constructed from a tuple whose heights are not
    /// strictly decreasing.
    #[error("forest tree heights are not strictly decreasing")]
    NonCanonicalForest,

    /// An index passed to `Tree::slot` or `Tree::leaf` was out of bounds.
    #[error("slot index {index} out of bounds (tree has {len} slots)")]
    SlotOutOfBounds { index: usize, len: usize },

    /// Any IO or integrity failure surfaced by a `BlobStore` implementation.
    #[error("blob store error: {0}")]
    BlobStore(String),

    /// Wraps `std::io::Error` from filesystem-backed stores.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "rocksdb-store")]
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
