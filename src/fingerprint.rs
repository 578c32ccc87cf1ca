//! Fingerprint derivation.
//!
//! `fp` locates an element in the cuckoo filter; `fp2` is an independent
//! identifier used only during retrieval. Both are deterministic,
//! domain-separated hashes of the input string: a length-prefixed domain
//! tag feeds a SHA3 extendable-output function, so every derived value
//! (fingerprints, bucket indices) comes from one hash primitive with
//! distinct domains rather than several unrelated hash functions.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

use crate::config::FP_BITS;

pub const FP_BYTES: usize = FP_BITS / 8;

/// All-zero fingerprint, reserved as the cuckoo filter's empty-slot
/// marker. `fp`/`fp2` never produce this value.
pub const EMPTY_FP: [u8; FP_BYTES] = [0u8; FP_BYTES];

/// Fixed non-zero sentinel a hash output is remapped to on the
/// astronomically unlikely event it comes out all-zero.
const ZERO_REMAP_SENTINEL: [u8; FP_BYTES] = {
    let mut bytes = [0u8; FP_BYTES];
    bytes[FP_BYTES - 1] = 1;
    bytes
};

fn domain_hash(domain: &'static str, input: &[u8], out: &mut [u8]) {
    let mut hasher = Shake256::default();
    Update::update(&mut hasher, &(domain.len() as u32).to_be_bytes());
    Update::update(&mut hasher, domain.as_bytes());
    Update::update(&mut hasher, &(input.len() as u64).to_be_bytes());
    Update::update(&mut hasher, input);
    let mut reader = hasher.finalize_xof();
    reader.read(out);
}

fn non_zero(mut bytes: [u8; FP_BYTES]) -> [u8; FP_BYTES] {
    if bytes == EMPTY_FP {
        bytes = ZERO_REMAP_SENTINEL;
    }
    bytes
}

/// `fp(w)`: locates `w`'s candidate buckets and is the value stored in
/// the filter.
pub fn fp(w: &[u8]) -> [u8; FP_BYTES] {
    let mut out = [0u8; FP_BYTES];
    domain_hash("pcr/fp/v1", w, &mut out);
    non_zero(out)
}

/// `fp2(w)`: a second, independent identifier used only during
/// retrieval. Distinct hash domain from `fp` guarantees `fp2 != fp`.
pub fn fp2(w: &[u8]) -> [u8; FP_BYTES] {
    let mut out = [0u8; FP_BYTES];
    domain_hash("pcr/fp2/v1", w, &mut out);
    non_zero(out)
}

/// `H1(w) mod L`: the first candidate bucket index.
pub fn h1(w: &[u8], l: usize) -> usize {
    let mut out = [0u8; 8];
    domain_hash("pcr/h1/v1", w, &mut out);
    (u64::from_be_bytes(out) as usize) % l
}

/// `H2(fp(w)) mod L`: combined with `i1` via XOR to give the second
/// candidate bucket index.
pub fn h2(fp_bytes: &[u8], l: usize) -> usize {
    let mut out = [0u8; 8];
    domain_hash("pcr/h2/v1", fp_bytes, &mut out);
    (u64::from_be_bytes(out) as usize) % l
}

/// Both candidate bucket indices for `w`, given filter width `l`.
pub fn candidate_buckets(w: &[u8], l: usize) -> (usize, usize, [u8; FP_BYTES]) {
    let fingerprint = fp(w);
    let i1 = h1(w, l);
    let i2 = i1 ^ h2(&fingerprint, l);
    (i1, i2, fingerprint)
}

/// The alternate bucket index for an already-placed fingerprint, used
/// during eviction: `e_i XOR H2(e)`.
pub fn alternate_bucket(current: usize, fingerprint: &[u8], l: usize) -> usize {
    current ^ h2(fingerprint, l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fp_and_fp2_differ_and_never_empty() {
        let w = b"Simba";
        let a = fp(w);
        let b = fp2(w);
        assert_ne!(a, b);
        assert_ne!(a, EMPTY_FP);
        assert_ne!(b, EMPTY_FP);
    }

    #[test]
    fn fp_is_deterministic() {
        let w = b"Simba42";
        assert_eq!(fp(w), fp(w));
        assert_eq!(fp2(w), fp2(w));
    }

    #[test]
    fn bucket_indices_are_in_range() {
        let l = 64;
        let (i1, i2, _) = candidate_buckets(b"Nala", l);
        assert!(i1 < l);
        assert!(i2 < l);
    }

    #[test]
    fn alternate_bucket_is_involutive() {
        let l = 32;
        let fingerprint = fp(b"whatever");
        let i1 = h1(b"whatever", l);
        let i2 = alternate_bucket(i1, &fingerprint, l);
        let back = alternate_bucket(i2, &fingerprint, l);
        assert_eq!(back, i1);
    }
}
