//! A transparency log built from a forest of immutable, sort-ordered
//! perfect binary Merkle trees.
//!
//! Entries are appended one at a time ([`Forest::add`]); the forest never
//! rewrites a tree once built, only merges whole trees of equal height
//! (carry-style, like a binary counter). Callers get back inclusion proofs
//! ([`proof::InclusionProof`]) and exclusion proofs
//! ([`proof::ExclusionProof`]) that verify independently of this crate,
//! against nothing more than a 32-byte forest root.
//!
//! Persistence is out of scope for the core types: [`tree::Tree`] and
//! [`forest::Forest`] are plain values over an in-memory blob, and
//! [`store::BlobStore`] is the seam for handing those blobs to disk, object
//! storage, or anything else.

pub mod error;
pub mod forest;
pub mod hash;
pub mod proof;
pub mod store;
pub mod tree;
pub mod wire;

pub use error::{Error, Result};
pub use forest::Forest;
pub use hash::Hash;
pub use proof::{ExclusionProof, InclusionProof, StrictWitnesses, Witness};
pub use store::{BlobStore, MemoryBlobStore, RandomAccessReader};
pub use tree::{Side, Tree};
pub use wire::WireError;

#[cfg(feature = "rocksdb-store")]
pub use store::RocksDbBlobStore;
