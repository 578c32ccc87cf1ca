//! Protocol orchestration: query generation, response generation, and
//! response retrieval, built on the ElGamal layer of `elgamal.rs` and the
//! bounded worker pool of `worker.rs`.
//!
//! Two design choices worth calling out (see DESIGN.md for the
//! rationale): the response's `Z`/`Z'` vectors are always permuted
//! identically before being returned, hiding which slot index actually
//! matched; and retrieval uses a shared "found" flag so work queued
//! behind an already-found result is skipped rather than run to
//! completion regardless of outcome.

use ark_ec::CurveGroup;
use rand::seq::SliceRandom;

use crate::elgamal::{Ciphertext, PublicKey, SecretKey};
use crate::error::Result;
use crate::fingerprint;
use crate::worker::{find_first_bounded, for_each_bounded};

const LOG_TARGET: &str = "pcr::protocol";

/// `(pk, ECF)`: the public key and the encrypted cuckoo filter columns.
#[derive(Clone)]
pub struct QueryMessage<C: CurveGroup> {
    pub pk: PublicKey<C>,
    /// `ecf[i][j]`, `i` in `[0, B)`, `j` in `[0, L)`.
    pub ecf: Vec<Vec<Ciphertext<C>>>,
}

impl<C: CurveGroup> QueryMessage<C> {
    pub fn bucket_size(&self) -> usize {
        self.ecf.len()
    }

    pub fn width(&self) -> usize {
        self.ecf.first().map(Vec::len).unwrap_or(0)
    }
}

/// `(Z, Z')`, each of length `2B`.
#[derive(Clone)]
pub struct ResponseMessage<C: CurveGroup> {
    pub z: Vec<Ciphertext<C>>,
    pub z_prime: Vec<Ciphertext<C>>,
}

/// `ReqQueryGen`: build a cuckoo filter for `set`, encrypt every slot
/// under `pk`.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(set_size = set.len(), workers))]
pub fn query_gen<C, S>(pk: &PublicKey<C>, set: &[S], workers: usize) -> Result<QueryMessage<C>>
where
    C: CurveGroup,
    S: AsRef<[u8]>,
{
    let filter = crate::cuckoo::build_filter(set)?;
    let columns = filter.to_columns();
    let b = columns.len();
    let l = filter.num_buckets();

    tracing::debug!(target: LOG_TARGET, b, l, "encrypting cuckoo filter columns");

    let flat: Vec<[u8; crate::config::FP_BYTES]> =
        columns.into_iter().flat_map(|col| col.into_iter()).collect();

    let encrypted = for_each_bounded(flat, workers, |_idx, slot| pk.encrypt_fingerprint(&slot));

    let mut ecf = Vec::with_capacity(b);
    for i in 0..b {
        ecf.push(encrypted[i * l..(i + 1) * l].to_vec());
    }

    Ok(QueryMessage { pk: pk.clone(), ecf })
}

/// `RespResponseGen`: check `candidate` against every column of `query`
/// at its two candidate buckets, blinding the result.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(workers))]
pub fn response_gen<C: CurveGroup>(
    query: &QueryMessage<C>,
    candidate: &[u8],
    workers: usize,
) -> ResponseMessage<C> {
    let b = query.bucket_size();
    let l = query.width();
    let pk = &query.pk;

    let (i1, i2, fp) = fingerprint::candidate_buckets(candidate, l);
    let fp2 = fingerprint::fp2(candidate);

    let e_inv_fp = pk.encrypt_inv_fingerprint(&fp);
    let e_fp2 = pk.encrypt_fingerprint(&fp2);

    tracing::debug!(target: LOG_TARGET, i1, i2, "checking candidate buckets");

    // Z_raw[i] / Z_raw[i+B]: decrypts to 0 exactly when column i stored fp
    // at bucket i1 / i2 respectively.
    let mut raw_inputs = Vec::with_capacity(2 * b);
    for i in 0..b {
        raw_inputs.push(query.ecf[i][i1]);
    }
    for i in 0..b {
        raw_inputs.push(query.ecf[i][i2]);
    }
    let z_raw = for_each_bounded(raw_inputs, workers, |_idx, slot| pk.add(slot, e_inv_fp));

    // Z must be finalized before Z' is derived from it (strict phase
    // ordering).
    let z: Vec<Ciphertext<C>> =
        for_each_bounded(z_raw, workers, |_idx, slot| pk.scalar_mult_randomizer(slot));

    let z_prime: Vec<Ciphertext<C>> = for_each_bounded(z.clone(), workers, |_idx, slot| {
        pk.add(pk.scalar_mult_randomizer(slot), e_fp2)
    });

    let (z, z_prime) = shuffle_response(z, z_prime);

    ResponseMessage { z, z_prime }
}

/// Apply an identical random permutation to `z` and `z_prime`, hiding
/// which of the `2B` indices actually matched (see DESIGN.md).
fn shuffle_response<C: CurveGroup>(
    z: Vec<Ciphertext<C>>,
    z_prime: Vec<Ciphertext<C>>,
) -> (Vec<Ciphertext<C>>, Vec<Ciphertext<C>>) {
    let mut order: Vec<usize> = (0..z.len()).collect();
    order.shuffle(&mut rand::thread_rng());

    let shuffled_z = order.iter().map(|&i| z[i]).collect();
    let shuffled_z_prime = order.iter().map(|&i| z_prime[i]).collect();
    (shuffled_z, shuffled_z_prime)
}

/// `ReqResponseRetrieve`: two-phase decryption revealing match and, if
/// matched, the plaintext element. Returns `None` for "no match".
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(set_size = set.len(), workers))]
pub fn response_retrieve<C, S>(
    pk: &PublicKey<C>,
    sk: &SecretKey<C>,
    response: &ResponseMessage<C>,
    set: &[S],
    workers: usize,
) -> Option<S>
where
    C: CurveGroup,
    S: AsRef<[u8]> + Clone,
{
    let _ = pk; // kept for API symmetry with the public entry point's signature

    let matched = find_first_bounded(response.z.clone(), workers, |_idx, c| sk.decrypt_zero(*c));

    let Some(p) = matched else {
        tracing::debug!(target: LOG_TARGET, "no matching slot");
        return None;
    };

    let target_ciphertext = response.z_prime[p];
    let fp2s: Vec<[u8; crate::config::FP_BYTES]> =
        set.iter().map(|s| fingerprint::fp2(s.as_ref())).collect();

    let hit = find_first_bounded(fp2s, workers, |_idx, fp2_bytes| {
        sk.decrypt_eq(target_ciphertext, fp2_bytes)
    });

    match hit {
        Some(j) => Some(set[j].clone()),
        None => {
            tracing::warn!(
                target: LOG_TARGET,
                "matching slot but no fp2 hit — fingerprint collision, reporting Negative"
            );
            None
        }
    }
}
