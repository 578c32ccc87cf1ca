//! A two-candidate-bucket cuckoo filter: bounded-retry eviction on
//! insert, and a column-major byte export used to build the encrypted
//! query.

use rand::Rng;

use crate::config::{BUCKET_SIZE, FP_BYTES, MAX_KICKS};
use crate::error::{PcrError, Result};
use crate::fingerprint::{self, EMPTY_FP};

pub type Fingerprint = [u8; FP_BYTES];

/// A grid of `B x L` slots, `B` = `BUCKET_SIZE`, `L` chosen by `new`.
#[derive(Clone, Debug)]
pub struct CuckooFilter {
    buckets: Vec<[Fingerprint; BUCKET_SIZE]>,
}

impl CuckooFilter {
    /// `L` = smallest power of two with `L * B >= ceil(capacity / load_factor)`.
    pub fn new(capacity: usize) -> Self {
        let needed = ((capacity as f64) / crate::config::LOAD_FACTOR).ceil() as usize;
        let needed_buckets = needed.div_ceil(BUCKET_SIZE).max(1);
        let l = needed_buckets.next_power_of_two();
        CuckooFilter {
            buckets: vec![[EMPTY_FP; BUCKET_SIZE]; l],
        }
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Insert `w`, evicting and retrying up to `MAX_KICKS` times on
    /// collision. Returns `false` (rather than erroring directly) so the
    /// caller can attribute the failing element; `protocol::query_gen`
    /// turns that into `PcrError::FilterOverflow`.
    pub fn add(&mut self, w: &[u8]) -> bool {
        let l = self.buckets.len();
        let (i1, _i2, fp) = fingerprint::candidate_buckets(w, l);

        if self.try_place(i1, fp) {
            return true;
        }
        let i2 = fingerprint::alternate_bucket(i1, &fp, l);
        if self.try_place(i2, fp) {
            return true;
        }

        let mut rng = rand::thread_rng();
        let mut evict_bucket = if rng.gen_bool(0.5) { i1 } else { i2 };
        let mut evict_fp = fp;

        for _ in 0..MAX_KICKS {
            let slot = rng.gen_range(0..BUCKET_SIZE);
            std::mem::swap(&mut self.buckets[evict_bucket][slot], &mut evict_fp);
            let next_bucket = fingerprint::alternate_bucket(evict_bucket, &evict_fp, l);
            if self.try_place(next_bucket, evict_fp) {
                return true;
            }
            evict_bucket = next_bucket;
        }
        false
    }

    fn try_place(&mut self, bucket: usize, fp: Fingerprint) -> bool {
        for slot in self.buckets[bucket].iter_mut() {
            if *slot == EMPTY_FP {
                *slot = fp;
                return true;
            }
        }
        false
    }

    /// Transpose the slot matrix into `B` columns of length `L`.
    pub fn to_columns(&self) -> Vec<Vec<Fingerprint>> {
        let l = self.buckets.len();
        let mut columns = vec![vec![EMPTY_FP; l]; BUCKET_SIZE];
        for (j, bucket) in self.buckets.iter().enumerate() {
            for (i, fp) in bucket.iter().enumerate() {
                columns[i][j] = *fp;
            }
        }
        columns
    }
}

/// Build and populate a filter sized for `set`.
pub fn build_filter<S: AsRef<[u8]>>(set: &[S]) -> Result<CuckooFilter> {
    let mut cf = CuckooFilter::new(set.len());
    for (index, element) in set.iter().enumerate() {
        if !cf.add(element.as_ref()) {
            return Err(PcrError::FilterOverflow { index });
        }
    }
    Ok(cf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_element_present_in_a_candidate_bucket() {
        let set = ["Simba", "Simba42", "Simba7", "Simba999"];
        let cf = build_filter(&set).unwrap();
        let l = cf.num_buckets();
        for s in set {
            let (i1, i2, fp) = fingerprint::candidate_buckets(s.as_bytes(), l);
            let present = cf.buckets[i1].contains(&fp) || cf.buckets[i2].contains(&fp);
            assert!(present, "{s} missing from both candidate buckets");
        }
    }

    #[test]
    fn single_element_filter() {
        let set = ["Simba"];
        let cf = build_filter(&set).unwrap();
        assert!(cf.num_buckets() >= 1);
    }

    #[test]
    fn large_set_does_not_overflow() {
        let set: Vec<String> = (0..1025).map(|i| format!("element-{i}")).collect();
        let cf = build_filter(&set).unwrap();
        assert!(cf.num_buckets() * BUCKET_SIZE >= set.len());
    }

    #[test]
    fn to_columns_shape_matches_bucket_size_and_width() {
        let set = ["a", "b", "c"];
        let cf = build_filter(&set).unwrap();
        let columns = cf.to_columns();
        assert_eq!(columns.len(), BUCKET_SIZE);
        for col in &columns {
            assert_eq!(col.len(), cf.num_buckets());
        }
    }

    #[test]
    fn empty_slots_are_the_empty_marker() {
        let set = ["only-one"];
        let cf = build_filter(&set).unwrap();
        let columns = cf.to_columns();
        let total_slots = columns.len() * columns[0].len();
        let empty_slots = columns
            .iter()
            .flatten()
            .filter(|fp| **fp == EMPTY_FP)
            .count();
        assert_eq!(empty_slots, total_slots - 1);
    }
}
