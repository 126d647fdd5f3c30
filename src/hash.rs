//! Domain-separated 32-byte hash primitive for leaves, internal nodes and
//! forest roots.
//!
//! Three distinct tagged domains, fixed and never reused across call sites:
//! `LEAF:`, `NODE:`, `FOREST:` (plus the `EMPTY:` sentinel for a forest with
//! no trees). The tags keep a leaf hash from ever colliding with an
//! internal-node hash or a forest root, even if an attacker controls the
//! bytes on both sides.

use sha2::{Digest, Sha256};

/// A 32-byte hash, tree leaf, or tree/forest root.
pub type Hash = [u8; 32];

const TAG_LEAF: &[u8] = b"LEAF:";
const TAG_NODE: &[u8] = b"NODE:";
const TAG_FOREST: &[u8] = b"FOREST:";
const TAG_EMPTY: &[u8] = b"EMPTY:";

/// `H_leaf(x) = H("LEAF:" || x)`.
///
/// Not applied at storage time: the raw entry bytes are what is written to
/// a tree's leaf slot. This function exists for callers who want a leaf
/// commitment independent of on-disk layout, and is not used internally by
/// `Tree`/`Forest`.
pub fn hash_leaf(entry: &[u8; 32]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(TAG_LEAF);
    hasher.update(entry);
    hasher.finalize().into()
}

/// `H_node(l, r) = H("NODE:" || l || r)`.
#[inline]
pub fn hash_node(left: &[u8; 32], right: &[u8; 32]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(TAG_NODE);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// `H_forest(roots...) = H("FOREST:" || r1 || ... || rk)`.
///
/// The empty forest (`roots` empty) uses the distinct `EMPTY:` sentinel tag
/// instead, so an empty log's root is never confused with a non-empty
/// forest whose hash happens to start the same way.
pub fn hash_forest<'a>(roots: impl IntoIterator<Item = &'a Hash>) -> Hash {
    let mut hasher = Sha256::new();
    let mut any = false;
    hasher.update(TAG_FOREST);
    for root in roots {
        hasher.update(root);
        any = true;
    }
    if !any {
        let mut empty_hasher = Sha256::new();
        empty_hasher.update(TAG_EMPTY);
        return empty_hasher.finalize().into();
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_forest_uses_distinct_sentinel() {
        let empty_root = hash_forest(std::iter::empty());
        let mut hasher = Sha256::new();
        hasher.update(TAG_EMPTY);
        let expected: Hash = hasher.finalize().into();
        assert_eq!(empty_root, expected);
    }

    #[test]
    fn domains_are_distinct() {
        let x = [0u8; 32];
        let leaf = hash_leaf(&x);
        let node = hash_node(&x, &x);
        assert_ne!(leaf, node);
    }

    #[test]
    fn node_hash_is_order_sensitive() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_ne!(hash_node(&a, &b), hash_node(&b, &a));
    }

    #[test]
    fn forest_hash_matches_reference_construction() {
        let r1 = [1u8; 32];
        let r2 = [2u8; 32];
        let got = hash_forest([&r1, &r2]);
        let mut hasher = Sha256::new();
        hasher.update(TAG_FOREST);
        hasher.update(r1);
        hasher.update(r2);
        let want: Hash = hasher.finalize().into();
        assert_eq!(got, want);
    }
}
