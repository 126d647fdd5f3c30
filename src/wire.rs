//! Varint-prefixed binary wire format for proofs (`spec.md` §6).
//!
//! A small dependency-free codec in the style of the teacher's sibling crate
//! `vecpak` (LEB128-style varints ahead of every variable-length field),
//! rather than pulling in `serde`+`bincode` for a shape this fixed: every
//! field is either a 32-byte hash, a `u8` side tag, an `Option` presence
//! byte, or a varint-prefixed vector of one of those. Encoding is not part
//! of the spec's normative interop surface ("implementer must fix one");
//! this is that one fixed choice.

use crate::hash::Hash;
use crate::proof::{ExclusionProof, InclusionProof};
use crate::tree::Side;

/// Errors decoding a wire-format proof. Distinct from [`crate::Error`]:
/// these are framing failures (truncated input, bad tags), not forest/tree
/// errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    #[error("unexpected end of input")]
    Eof,
    #[error("varint is wider than 64 bits")]
    VarintTooWide,
    #[error("invalid side tag byte {0}")]
    InvalidSide(u8),
    #[error("invalid option tag byte {0}")]
    InvalidOptionTag(u8),
    #[error("trailing bytes after a complete proof")]
    TrailingBytes,
}

type WireResult<T> = std::result::Result<T, WireError>;

fn encode_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

fn decode_varint(input: &[u8], pos: &mut usize) -> WireResult<u64> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    loop {
        let byte = *input.get(*pos).ok_or(WireError::Eof)?;
        *pos += 1;
        if shift >= 64 {
            return Err(WireError::VarintTooWide);
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

fn encode_hash(out: &mut Vec<u8>, hash: &Hash) {
    out.extend_from_slice(hash);
}

fn decode_hash(input: &[u8], pos: &mut usize) -> WireResult<Hash> {
    let end = pos.checked_add(32).ok_or(WireError::Eof)?;
    let slice = input.get(*pos..end).ok_or(WireError::Eof)?;
    let mut hash = [0u8; 32];
    hash.copy_from_slice(slice);
    *pos = end;
    Ok(hash)
}

fn encode_side(out: &mut Vec<u8>, side: Side) {
    out.push(match side {
        Side::Left => 0,
        Side::Right => 1,
    });
}

fn decode_side(input: &[u8], pos: &mut usize) -> WireResult<Side> {
    let tag = *input.get(*pos).ok_or(WireError::Eof)?;
    *pos += 1;
    match tag {
        0 => Ok(Side::Left),
        1 => Ok(Side::Right),
        other => Err(WireError::InvalidSide(other)),
    }
}

fn encode_option_hash(out: &mut Vec<u8>, value: &Option<Hash>) {
    match value {
        None => out.push(0),
        Some(h) => {
            out.push(1);
            encode_hash(out, h);
        }
    }
}

fn decode_option_hash(input: &[u8], pos: &mut usize) -> WireResult<Option<Hash>> {
    let tag = *input.get(*pos).ok_or(WireError::Eof)?;
    *pos += 1;
    match tag {
        0 => Ok(None),
        1 => Ok(Some(decode_hash(input, pos)?)),
        other => Err(WireError::InvalidOptionTag(other)),
    }
}

/// Encode an inclusion proof: `entry`, `tree_index`, the bottom-up proof
/// path, and the forest's other tree roots, every vector varint-length-
/// prefixed per `spec.md` §6.
pub fn encode_inclusion_proof(proof: &InclusionProof) -> Vec<u8> {
    let mut out = Vec::new();
    encode_inclusion_proof_into(proof, &mut out);
    out
}

fn encode_inclusion_proof_into(proof: &InclusionProof, out: &mut Vec<u8>) {
    encode_hash(out, &proof.entry);
    encode_varint(out, proof.tree_index as u64);
    encode_varint(out, proof.proof_path.len() as u64);
    for (side, hash) in &proof.proof_path {
        encode_side(out, *side);
        encode_hash(out, hash);
    }
    encode_varint(out, proof.other_tree_roots.len() as u64);
    for root in &proof.other_tree_roots {
        encode_hash(out, root);
    }
}

/// Decode an inclusion proof previously written by
/// [`encode_inclusion_proof`]. Rejects trailing bytes: a wire buffer holds
/// exactly one proof.
pub fn decode_inclusion_proof(input: &[u8]) -> WireResult<InclusionProof> {
    let mut pos = 0;
    let proof = decode_inclusion_proof_at(input, &mut pos)?;
    if pos != input.len() {
        return Err(WireError::TrailingBytes);
    }
    Ok(proof)
}

fn decode_inclusion_proof_at(input: &[u8], pos: &mut usize) -> WireResult<InclusionProof> {
    let entry = decode_hash(input, pos)?;
    let tree_index = decode_varint(input, pos)? as usize;
    let path_len = decode_varint(input, pos)?;
    let mut proof_path = Vec::with_capacity(path_len as usize);
    for _ in 0..path_len {
        let side = decode_side(input, pos)?;
        let hash = decode_hash(input, pos)?;
        proof_path.push((side, hash));
    }
    let other_len = decode_varint(input, pos)?;
    let mut other_tree_roots = Vec::with_capacity(other_len as usize);
    for _ in 0..other_len {
        other_tree_roots.push(decode_hash(input, pos)?);
    }
    Ok(InclusionProof {
        entry,
        tree_index,
        proof_path,
        other_tree_roots,
    })
}

/// Encode an exclusion proof: `target`, optional predecessor value + proof,
/// optional successor value + proof, and the forest root, per `spec.md` §6.
/// Strict-mode witnesses are not part of the normative wire shape and are
/// not encoded; a decoded proof always has `strict_witnesses: None`, so a
/// decoded strict proof only supports [`ExclusionProof::verify`], not
/// `verify_strict`.
pub fn encode_exclusion_proof(proof: &ExclusionProof) -> Vec<u8> {
    let mut out = Vec::new();
    encode_hash(&mut out, &proof.target);
    encode_option_hash(&mut out, &proof.predecessor);
    encode_option_inclusion_proof(&mut out, &proof.predecessor_proof);
    encode_option_hash(&mut out, &proof.successor);
    encode_option_inclusion_proof(&mut out, &proof.successor_proof);
    encode_hash(&mut out, &proof.forest_root);
    out
}

fn encode_option_inclusion_proof(out: &mut Vec<u8>, proof: &Option<InclusionProof>) {
    match proof {
        None => out.push(0),
        Some(p) => {
            out.push(1);
            encode_inclusion_proof_into(p, out);
        }
    }
}

fn decode_option_inclusion_proof(
    input: &[u8],
    pos: &mut usize,
) -> WireResult<Option<InclusionProof>> {
    let tag = *input.get(*pos).ok_or(WireError::Eof)?;
    *pos += 1;
    match tag {
        0 => Ok(None),
        1 => Ok(Some(decode_inclusion_proof_at(input, pos)?)),
        other => Err(WireError::InvalidOptionTag(other)),
    }
}

/// Decode an exclusion proof previously written by [`encode_exclusion_proof`].
pub fn decode_exclusion_proof(input: &[u8]) -> WireResult<ExclusionProof> {
    let mut pos = 0;
    let target = decode_hash(input, &mut pos)?;
    let predecessor = decode_option_hash(input, &mut pos)?;
    let predecessor_proof = decode_option_inclusion_proof(input, &mut pos)?;
    let successor = decode_option_hash(input, &mut pos)?;
    let successor_proof = decode_option_inclusion_proof(input, &mut pos)?;
    let forest_root = decode_hash(input, &mut pos)?;
    if pos != input.len() {
        return Err(WireError::TrailingBytes);
    }
    Ok(ExclusionProof {
        target,
        predecessor,
        predecessor_proof,
        successor,
        successor_proof,
        forest_root,
        strict_witnesses: None,
    })
}
