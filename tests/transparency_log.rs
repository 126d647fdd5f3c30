//! End-to-end tests driving the public API the way an external caller
//! would: build a forest, persist its trees, reload them, and check
//! inclusion/exclusion proofs against the reloaded state.

use xforest::{store, BlobStore, Forest, MemoryBlobStore};

fn entry(v: u64) -> [u8; 32] {
    let mut h = [0u8; 32];
    h[24..].copy_from_slice(&v.to_be_bytes());
    h
}

#[test]
fn append_only_log_grows_and_preserves_old_roots() {
    let mut forest = Forest::empty();
    let mut roots = Vec::new();
    for v in 0..16u64 {
        forest = forest.add(&entry(v)).unwrap();
        roots.push(forest.root());
    }
    // every snapshot's root is distinct: no two prefixes of an append-only
    // log collide.
    let mut dedup = roots.clone();
    dedup.sort();
    dedup.dedup();
    assert_eq!(dedup.len(), roots.len());
}

#[test]
fn forest_tree_count_matches_binary_popcount_of_cardinality() {
    let mut forest = Forest::empty();
    for v in 0..37u64 {
        forest = forest.add(&entry(v)).unwrap();
        let expected_trees = forest.cardinality().count_ones() as usize;
        assert_eq!(forest.trees().len(), expected_trees);
    }
}

#[test]
fn large_log_inclusion_proofs_all_verify() {
    let mut forest = Forest::empty();
    let mut entries: Vec<[u8; 32]> = (0..1000u64).map(entry).collect();
    // insertion order must not matter downstream, but `add` takes entries
    // one at a time in whatever order the caller supplies
    entries.sort();
    for e in &entries {
        forest = forest.add(e).unwrap();
    }

    for v in [0u64, 100, 500, 999] {
        let proof = forest.prove_inclusion(&entry(v)).unwrap();
        assert!(proof.verify(&forest.root()));
    }
}

#[test]
fn large_log_exclusion_proofs_all_verify() {
    let mut forest = Forest::empty();
    for v in (0u64..1000).step_by(2) {
        forest = forest.add(&entry(v)).unwrap();
    }

    for v in [1u64, 101, 501, 999] {
        let proof = forest.prove_exclusion(&entry(v)).unwrap();
        assert!(proof.verify(&forest.root()));
    }
}

#[test]
fn trees_persist_and_reload_through_a_blob_store() {
    let mut forest = Forest::empty();
    for v in 0..13u64 {
        forest = forest.add(&entry(v)).unwrap();
    }

    let blob_store = MemoryBlobStore::new();
    for (i, tree) in forest.trees().iter().enumerate() {
        store::put_tree(&blob_store, &format!("tree-{i}"), tree).unwrap();
    }

    let reloaded_trees: Vec<_> = (0..forest.trees().len())
        .map(|i| store::load_tree(&blob_store, &format!("tree-{i}")).unwrap())
        .collect();
    let reloaded = Forest::from_trees(reloaded_trees).unwrap();

    assert_eq!(reloaded.root(), forest.root());
    assert_eq!(reloaded.cardinality(), forest.cardinality());

    let proof = reloaded.prove_inclusion(&entry(7)).unwrap();
    assert!(proof.verify(&forest.root()));
}

#[test]
fn deleting_a_persisted_tree_makes_it_unloadable() {
    let forest = Forest::empty().add(&entry(1)).unwrap();
    let blob_store = MemoryBlobStore::new();
    store::put_tree(&blob_store, "only", &forest.trees()[0]).unwrap();
    blob_store.delete("only").unwrap();
    assert!(store::load_tree(&blob_store, "only").is_err());
}

#[test]
fn exclusion_proof_unavailable_for_a_present_entry() {
    let forest = Forest::empty()
        .add(&entry(10))
        .unwrap()
        .add(&entry(20))
        .unwrap();
    assert!(forest.prove_exclusion(&entry(10)).is_none());
}

#[test]
fn strict_exclusion_proofs_survive_many_carries() {
    let mut forest = Forest::empty();
    for v in 0..64u64 {
        forest = forest.add(&entry(v * 3)).unwrap(); // 0, 3, 6, ... gaps everywhere
    }
    for target in [1u64, 50, 100, 190] {
        let proof = forest.prove_exclusion_strict(&entry(target)).unwrap();
        assert!(proof.verify_strict(&forest.root()));
    }
}
