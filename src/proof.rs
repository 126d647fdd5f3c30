//! Inclusion and exclusion proofs over a [`Forest`].
//!
//! An inclusion proof is a single-tree proof (`spec.md` §4.2's `find_left`
//! path) plus the other trees' roots needed to recompute the forest root.
//! An exclusion proof brackets a target between a predecessor and successor
//! inclusion proof. Grounded on `original_source/exclusion_tlog.py`'s
//! `InclusionProof`/`ExclusionProof` dataclasses and their `verify` methods.

use rayon::prelude::*;

use crate::forest::Forest;
use crate::hash::{hash_forest, Hash};
use crate::tree::{Side, Tree};

/// Proof that `entry` is one of the leaves of the forest that produced
/// `forest_root` (via [`InclusionProof::verify`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionProof {
    pub entry: Hash,
    /// Index, within the forest's tallest-to-shortest tree order, of the
    /// tree the proof was drawn from.
    pub tree_index: usize,
    /// Bottom-up `(side, sibling)` path from `entry` to its tree's root.
    pub proof_path: Vec<(Side, Hash)>,
    /// The forest's other tree roots, in forest order, with `tree_index`'s
    /// slot omitted (a verifier reinserts the recomputed root there).
    pub other_tree_roots: Vec<Hash>,
}

impl InclusionProof {
    /// Recompute the claimed tree root from `entry` and `proof_path`, splice
    /// it back into `other_tree_roots` at `tree_index`, and check the
    /// resulting forest root against `expected_forest_root`.
    pub fn verify(&self, expected_forest_root: &Hash) -> bool {
        if self.tree_index > self.other_tree_roots.len() {
            return false;
        }
        let recomputed_tree_root = Tree::recompute_root(&self.entry, &self.proof_path);
        let mut roots = self.other_tree_roots.clone();
        roots.insert(self.tree_index, recomputed_tree_root);
        hash_forest(roots.iter()) == *expected_forest_root
    }
}

/// One tree's predecessor or successor candidate, together with the
/// inclusion proof that it is indeed present. Used only in "strict"
/// exclusion proofs (see [`ExclusionProof::verify_strict`]).
pub type Witness = (Hash, InclusionProof);

/// Extra per-tree bracketing data bundled only when an exclusion proof is
/// built in strict mode, so a verifier can confirm `predecessor`/
/// `successor` really are the global max/min without trusting the forest
/// out of band (`spec.md` §9: "implementers choosing the stricter variant
/// MUST declare it as part of the proof-format version").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictWitnesses {
    pub per_tree_predecessors: Vec<Option<Witness>>,
    pub per_tree_successors: Vec<Option<Witness>>,
}

/// Proof that `target` is absent from the forest that produced
/// `forest_root`: a bracketing pair of inclusion proofs for the global
/// predecessor and successor values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionProof {
    pub target: Hash,
    pub predecessor: Option<Hash>,
    pub predecessor_proof: Option<InclusionProof>,
    pub successor: Option<Hash>,
    pub successor_proof: Option<InclusionProof>,
    pub forest_root: Hash,
    pub strict_witnesses: Option<StrictWitnesses>,
}

impl ExclusionProof {
    /// Baseline soundness check (`spec.md` §4.4): both bundled inclusion
    /// proofs verify against `forest_root`, `predecessor < target <
    /// successor`, and `forest_root` matches what the caller expects.
    /// Never raises on malformed input, returns `false` instead.
    pub fn verify(&self, expected_forest_root: &Hash) -> bool {
        if self.forest_root != *expected_forest_root {
            return false;
        }
        if !Self::verify_side(&self.predecessor, &self.predecessor_proof, expected_forest_root, |v| {
            *v < self.target
        }) {
            return false;
        }
        if !Self::verify_side(&self.successor, &self.successor_proof, expected_forest_root, |v| {
            *v > self.target
        }) {
            return false;
        }
        true
    }

    fn verify_side(
        value: &Option<Hash>,
        proof: &Option<InclusionProof>,
        expected_forest_root: &Hash,
        ordering_holds: impl Fn(&Hash) -> bool,
    ) -> bool {
        match (value, proof) {
            (None, None) => true,
            (Some(v), Some(p)) => {
                if p.entry != *v {
                    return false;
                }
                if !ordering_holds(v) {
                    return false;
                }
                p.verify(expected_forest_root)
            }
            _ => false, // value present without its proof, or vice versa
        }
    }

    /// Stricter soundness check: in addition to [`ExclusionProof::verify`],
    /// confirm every per-tree predecessor/successor candidate is itself a
    /// valid inclusion proof and that none exceeds (respectively, undercuts)
    /// the declared global predecessor/successor. Requires the proof to
    /// have been built with `Forest::prove_exclusion_strict`.
    pub fn verify_strict(&self, expected_forest_root: &Hash) -> bool {
        if !self.verify(expected_forest_root) {
            return false;
        }
        let Some(witnesses) = &self.strict_witnesses else {
            return false;
        };

        for witness in witnesses.per_tree_predecessors.iter().flatten() {
            let (value, proof) = witness;
            if proof.entry != *value || !proof.verify(expected_forest_root) {
                return false;
            }
            if *value >= self.target {
                return false;
            }
            match &self.predecessor {
                Some(p) if value <= p => {}
                _ => return false,
            }
        }

        for witness in witnesses.per_tree_successors.iter().flatten() {
            let (value, proof) = witness;
            if proof.entry != *value || !proof.verify(expected_forest_root) {
                return false;
            }
            if *value <= self.target {
                return false;
            }
            match &self.successor {
                Some(s) if value >= s => {}
                _ => return false,
            }
        }

        true
    }
}

impl Forest {
    /// Produce an inclusion proof for `entry`, scanning trees
    /// tallest-to-shortest and stopping at the first match (multiset
    /// semantics: `spec.md` §4.4). Returns `None` if `entry` is absent.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn prove_inclusion(&self, entry: &Hash) -> Option<InclusionProof> {
        let (tree_index, _) = self.locate(entry)?;
        let tree = &self.trees()[tree_index];
        let (leaf, proof_path) = tree.find_left(entry);
        debug_assert_eq!(&leaf, entry, "locate() must agree with find_left()");

        let other_tree_roots = self
            .trees()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != tree_index)
            .map(|(_, t)| t.root())
            .collect();

        Some(InclusionProof {
            entry: *entry,
            tree_index,
            proof_path,
            other_tree_roots,
        })
    }

    /// Produce a baseline exclusion proof for `target`: the global
    /// predecessor and successor values (each the max/min across every
    /// tree's per-tree predecessor/successor), bundled with their
    /// inclusion proofs. Returns `None` if `target` is present (an absence
    /// proof cannot be constructed for a member, `spec.md` §7
    /// `AlreadyPresent`).
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn prove_exclusion(&self, target: &Hash) -> Option<ExclusionProof> {
        self.prove_exclusion_inner(target, false)
    }

    /// As [`Forest::prove_exclusion`], but also bundles every tree's
    /// individual predecessor/successor candidate (with its own inclusion
    /// proof), letting [`ExclusionProof::verify_strict`] confirm the global
    /// bracket without trusting the forest out of band.
    pub fn prove_exclusion_strict(&self, target: &Hash) -> Option<ExclusionProof> {
        self.prove_exclusion_inner(target, true)
    }

    fn prove_exclusion_inner(&self, target: &Hash, strict: bool) -> Option<ExclusionProof> {
        if self.locate(target).is_some() {
            return None;
        }

        let mut best_predecessor: Option<Hash> = None;
        let mut best_successor: Option<Hash> = None;
        let mut per_tree_predecessors = Vec::with_capacity(self.trees().len());
        let mut per_tree_successors = Vec::with_capacity(self.trees().len());

        for tree in self.trees() {
            let pred = tree.predecessor_index(target).map(|i| {
                tree.leaf(i).expect("predecessor_index returns an in-bounds index")
            });
            let succ = tree.successor_index(target).map(|i| {
                tree.leaf(i).expect("successor_index returns an in-bounds index")
            });

            if let Some(p) = pred {
                if best_predecessor.map_or(true, |bp| p > bp) {
                    best_predecessor = Some(p);
                }
            }
            if let Some(s) = succ {
                if best_successor.map_or(true, |bs| s < bs) {
                    best_successor = Some(s);
                }
            }

            if strict {
                per_tree_predecessors.push(pred.and_then(|p| self.prove_inclusion(&p).map(|pf| (p, pf))));
                per_tree_successors.push(succ.and_then(|s| self.prove_inclusion(&s).map(|pf| (s, pf))));
            }
        }

        let predecessor_proof = best_predecessor.and_then(|p| self.prove_inclusion(&p));
        let successor_proof = best_successor.and_then(|s| self.prove_inclusion(&s));

        Some(ExclusionProof {
            target: *target,
            predecessor: best_predecessor,
            predecessor_proof,
            successor: best_successor,
            successor_proof,
            forest_root: self.root(),
            strict_witnesses: strict.then_some(StrictWitnesses {
                per_tree_predecessors,
                per_tree_successors,
            }),
        })
    }
}

/// Verify many independent inclusion proofs against the same expected root,
/// in parallel. Purely a throughput convenience over calling
/// [`InclusionProof::verify`] in a loop; verification of one proof never
/// depends on another, so this is embarrassingly parallel (grounded on the
/// teacher's `rayon`-based batch path, `hubt_rocksdb.rs::batch_update`'s
/// `into_par_iter()` over independent per-entry work).
pub fn verify_inclusion_batch(proofs: &[InclusionProof], expected_forest_root: &Hash) -> Vec<bool> {
    proofs.par_iter().map(|p| p.verify(expected_forest_root)).collect()
}

/// Verify many independent exclusion proofs against the same expected root,
/// in parallel.
pub fn verify_exclusion_batch(proofs: &[ExclusionProof], expected_forest_root: &Hash) -> Vec<bool> {
    proofs.par_iter().map(|p| p.verify(expected_forest_root)).collect()
}
