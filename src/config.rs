//! Tunable constants and the security-level selector.
//!
//! `SecurityLevel` names a "curve-id": since a curve is fixed at compile
//! time in idiomatic Rust (generic code is monomorphized, not
//! dynamically dispatched), each level names one concrete arkworks
//! curve. See DESIGN.md for the rationale.

use serde::{Deserialize, Serialize};

use crate::error::{PcrError, Result};

/// Slots per cuckoo bucket (`B`).
pub const BUCKET_SIZE: usize = 4;

/// Bit length of `fp`/`fp2` fingerprints.
pub const FP_BITS: usize = 224;

/// Cuckoo insertion retry cap before an element is declared non-placeable.
pub const MAX_KICKS: usize = 500;

/// Target fill ratio used when sizing the filter.
pub const LOAD_FACTOR: f64 = 0.95;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// Backed by the Edwards curve over the BLS12-381 scalar field.
    L224,
    /// Backed by BN254's G1 group.
    L256,
    /// Backed by BLS12-381's G1 group.
    L384,
    /// Backed by Grumpkin (whose scalar field is BLS12-381's base field).
    L512,
}

impl SecurityLevel {
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            224 => Ok(SecurityLevel::L224),
            256 => Ok(SecurityLevel::L256),
            384 => Ok(SecurityLevel::L384),
            512 => Ok(SecurityLevel::L512),
            other => Err(PcrError::config(format!(
                "unsupported security_level {other}; expected one of 224, 256, 384, 512"
            ))),
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            SecurityLevel::L224 => 224,
            SecurityLevel::L256 => 256,
            SecurityLevel::L384 => 384,
            SecurityLevel::L512 => 512,
        }
    }

    pub fn curve_id(self) -> &'static str {
        match self {
            SecurityLevel::L224 => "ed-on-bls12-381",
            SecurityLevel::L256 => "bn254-g1",
            SecurityLevel::L384 => "bls12-381-g1",
            SecurityLevel::L512 => "grumpkin",
        }
    }
}

impl Default for SecurityLevel {
    fn default() -> Self {
        SecurityLevel::L256
    }
}

/// Collects all of a deployment's tunables in one place.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PcrConfig {
    pub security_level: SecurityLevel,
    pub point_compression: bool,
    pub bucket_size: usize,
    pub fingerprint_bits: usize,
    pub max_kicks: usize,
    pub load_factor: f64,
}

impl Default for PcrConfig {
    fn default() -> Self {
        PcrConfig {
            security_level: SecurityLevel::default(),
            point_compression: true,
            bucket_size: BUCKET_SIZE,
            fingerprint_bits: FP_BITS,
            max_kicks: MAX_KICKS,
            load_factor: LOAD_FACTOR,
        }
    }
}
