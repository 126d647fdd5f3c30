//! Abstract content-addressed blob storage.
//!
//! `spec.md` §6 treats tree and forest persistence as outside the engine's
//! concern: a tree is just a blob, addressed however the caller likes, and
//! the engine only needs `put`/`open`/`delete` plus random-access reads over
//! whatever comes back. [`MemoryBlobStore`] is always available; a
//! `rocksdb`-backed implementation is gated behind the `rocksdb-store`
//! feature, grounded on `bintree/src/hubt_rocksdb.rs`'s column-family usage
//! (simplified here to a single default column family, since content-
//! addressed put/open/delete needs no transactions).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

/// Random access into an opened blob, independent of how it is backed.
pub trait RandomAccessReader: Send + Sync {
    /// Read `buf.len()` bytes starting at byte offset `offset`.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Total size of the blob, in bytes.
    fn size(&self) -> Result<u64>;

    /// Read the whole blob into memory. Default implementation built on
    /// [`RandomAccessReader::read_at`]; backends may override for a faster
    /// path (e.g. a single contiguous `get`).
    fn read_all(&self) -> Result<Vec<u8>> {
        let len = self.size()? as usize;
        let mut buf = vec![0u8; len];
        self.read_at(0, &mut buf)?;
        Ok(buf)
    }
}

/// Content-addressed blob storage: write bytes under a key, open them back
/// for random access, or delete them. Implementations need not support
/// overwriting an existing key, since tree and forest blobs are immutable
/// once written (`spec.md` §5).
pub trait BlobStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any prior value for that key.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Open the blob stored under `key` for random access.
    fn open(&self, key: &str) -> Result<Arc<dyn RandomAccessReader>>;

    /// Remove the blob stored under `key`, if present. Not an error if the
    /// key is absent.
    fn delete(&self, key: &str) -> Result<()>;
}

/// A blob store backed by an in-process `HashMap`. Always compiled; useful
/// for tests and for callers who persist trees/forests elsewhere and only
/// need this crate's in-memory working set.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl MemoryBlobStore {
    pub fn new() -> MemoryBlobStore {
        MemoryBlobStore {
            blobs: Mutex::new(HashMap::new()),
        }
    }
}

struct MemoryReader {
    bytes: Arc<[u8]>,
}

impl RandomAccessReader for MemoryReader {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let offset = offset as usize;
        let end = offset
            .checked_add(buf.len())
            .ok_or_else(|| Error::BlobStore("read range overflows usize".into()))?;
        if end > self.bytes.len() {
            return Err(Error::BlobStore(format!(
                "read range {offset}..{end} exceeds blob length {}",
                self.bytes.len()
            )));
        }
        buf.copy_from_slice(&self.bytes[offset..end]);
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        Ok(self.bytes.len() as u64)
    }

    fn read_all(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.to_vec())
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| Error::BlobStore("memory store lock poisoned".into()))?;
        blobs.insert(key.to_string(), Arc::from(bytes));
        Ok(())
    }

    fn open(&self, key: &str) -> Result<Arc<dyn RandomAccessReader>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| Error::BlobStore("memory store lock poisoned".into()))?;
        let bytes = blobs
            .get(key)
            .cloned()
            .ok_or_else(|| Error::BlobStore(format!("no such key: {key}")))?;
        Ok(Arc::new(MemoryReader { bytes }))
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| Error::BlobStore("memory store lock poisoned".into()))?;
        blobs.remove(key);
        Ok(())
    }
}

/// Write a tree's blob to `store` under `key`.
pub fn put_tree(store: &dyn BlobStore, key: &str, tree: &crate::tree::Tree) -> Result<()> {
    store.put(key, tree.blob_bytes())
}

/// Read a tree's blob back from `store` and reconstruct it.
#[tracing::instrument(level = "debug", skip(store))]
pub fn load_tree(store: &dyn BlobStore, key: &str) -> Result<crate::tree::Tree> {
    let reader = store.open(key)?;
    let bytes = reader.read_all()?;
    crate::tree::Tree::from_blob(bytes)
}

#[cfg(feature = "rocksdb-store")]
mod rocksdb_store {
    use super::*;
    use rocksdb::{Options, DB};
    use std::path::Path;

    /// A blob store backed by a RocksDB database at a filesystem path, for
    /// callers who want the engine to own persistence directly rather than
    /// plugging in their own store.
    pub struct RocksDbBlobStore {
        db: DB,
    }

    impl RocksDbBlobStore {
        pub fn open(path: impl AsRef<Path>) -> Result<RocksDbBlobStore> {
            let mut opts = Options::default();
            opts.create_if_missing(true);
            let db = DB::open(&opts, path)?;
            Ok(RocksDbBlobStore { db })
        }
    }

    struct RocksDbReader {
        bytes: Arc<[u8]>,
    }

    impl RandomAccessReader for RocksDbReader {
        fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
            let offset = offset as usize;
            let end = offset
                .checked_add(buf.len())
                .ok_or_else(|| Error::BlobStore("read range overflows usize".into()))?;
            if end > self.bytes.len() {
                return Err(Error::BlobStore(format!(
                    "read range {offset}..{end} exceeds blob length {}",
                    self.bytes.len()
                )));
            }
            buf.copy_from_slice(&self.bytes[offset..end]);
            Ok(())
        }

        fn size(&self) -> Result<u64> {
            Ok(self.bytes.len() as u64)
        }

        fn read_all(&self) -> Result<Vec<u8>> {
            Ok(self.bytes.to_vec())
        }
    }

    impl BlobStore for RocksDbBlobStore {
        fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
            self.db.put(key.as_bytes(), bytes)?;
            Ok(())
        }

        fn open(&self, key: &str) -> Result<Arc<dyn RandomAccessReader>> {
            let bytes = self
                .db
                .get(key.as_bytes())?
                .ok_or_else(|| Error::BlobStore(format!("no such key: {key}")))?;
            Ok(Arc::new(RocksDbReader {
                bytes: Arc::from(bytes.into_boxed_slice()),
            }))
        }

        fn delete(&self, key: &str) -> Result<()> {
            self.db.delete(key.as_bytes())?;
            Ok(())
        }
    }
}

#[cfg(feature = "rocksdb-store")]
pub use rocksdb_store::RocksDbBlobStore;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Tree;

    #[test]
    fn put_open_roundtrips_bytes() {
        let store = MemoryBlobStore::new();
        store.put("k", b"hello world").unwrap();
        let reader = store.open("k").unwrap();
        assert_eq!(reader.size().unwrap(), 11);
        assert_eq!(reader.read_all().unwrap(), b"hello world");
    }

    #[test]
    fn read_at_respects_offset_and_length() {
        let store = MemoryBlobStore::new();
        store.put("k", b"0123456789").unwrap();
        let reader = store.open("k").unwrap();
        let mut buf = [0u8; 4];
        reader.read_at(3, &mut buf).unwrap();
        assert_eq!(&buf, b"3456");
    }

    #[test]
    fn read_at_out_of_range_errors() {
        let store = MemoryBlobStore::new();
        store.put("k", b"short").unwrap();
        let reader = store.open("k").unwrap();
        let mut buf = [0u8; 10];
        assert!(reader.read_at(0, &mut buf).is_err());
    }

    #[test]
    fn open_missing_key_errors() {
        let store = MemoryBlobStore::new();
        assert!(store.open("missing").is_err());
    }

    #[test]
    fn delete_then_open_errors() {
        let store = MemoryBlobStore::new();
        store.put("k", b"data").unwrap();
        store.delete("k").unwrap();
        assert!(store.open("k").is_err());
    }

    #[test]
    fn delete_missing_key_is_not_an_error() {
        let store = MemoryBlobStore::new();
        assert!(store.delete("nope").is_ok());
    }

    #[test]
    fn put_and_load_tree_round_trips() {
        let store = MemoryBlobStore::new();
        let a = Tree::singleton([1u8; 32]);
        let b = Tree::singleton([2u8; 32]);
        let merged = a.merge(&b).unwrap();

        put_tree(&store, "tree-0", &merged).unwrap();
        let reloaded = load_tree(&store, "tree-0").unwrap();
        assert_eq!(reloaded, merged);
    }
}
