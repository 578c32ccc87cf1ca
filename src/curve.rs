//! Curve-level helpers shared by the ElGamal and codec layers.
//!
//! The protocol is generic over any `C: CurveGroup`; `SecurityLevel`
//! (see `config`) merely names which concrete arkworks curve a caller
//! picked. Point (de)serialization uses `ark_serialize`'s own compressed
//! / uncompressed modes (the `point_compression` knob), which gives us
//! "decoded point not on curve -> fatal" for free via `Validate::Yes`.

use ark_ec::CurveGroup;
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};

use crate::error::{PcrError, Result};

/// Reduce a big-endian byte string (a fingerprint) to a scalar mod the
/// curve's group order `n`.
pub fn fingerprint_to_scalar<C: CurveGroup>(bytes: &[u8]) -> C::ScalarField {
    C::ScalarField::from_be_bytes_mod_order(bytes)
}

/// Lift an integer scalar onto the curve as `g * m`, used to encode
/// plaintext integers as curve points.
pub fn lift_to_point<C: CurveGroup>(m: C::ScalarField) -> C {
    C::generator() * m
}

pub fn point_to_bytes<C: CurveGroup>(point: &C, compress: bool) -> Result<Vec<u8>> {
    let mode = if compress {
        Compress::Yes
    } else {
        Compress::No
    };
    let mut buf = Vec::with_capacity(point.serialized_size(mode));
    point
        .serialize_with_mode(&mut buf, mode)
        .map_err(|e| PcrError::curve(format!("point serialization failed: {e}")))?;
    Ok(buf)
}

pub fn point_from_bytes<C: CurveGroup>(bytes: &[u8], compress: bool) -> Result<C> {
    let mode = if compress {
        Compress::Yes
    } else {
        Compress::No
    };
    C::deserialize_with_mode(bytes, mode, Validate::Yes)
        .map_err(|e| PcrError::curve(format!("point deserialization failed (off-curve or malformed): {e}")))
}

pub fn scalar_to_bytes<F: PrimeField>(scalar: &F, compress: bool) -> Result<Vec<u8>> {
    let mode = if compress {
        Compress::Yes
    } else {
        Compress::No
    };
    let mut buf = Vec::with_capacity(scalar.serialized_size(mode));
    scalar
        .serialize_with_mode(&mut buf, mode)
        .map_err(|e| PcrError::curve(format!("scalar serialization failed: {e}")))?;
    Ok(buf)
}

pub fn scalar_from_bytes<F: PrimeField>(bytes: &[u8], compress: bool) -> Result<F> {
    let mode = if compress {
        Compress::Yes
    } else {
        Compress::No
    };
    F::deserialize_with_mode(bytes, mode, Validate::Yes)
        .map_err(|e| PcrError::curve(format!("scalar deserialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::PrimeGroup;
    use ark_grumpkin::Projective as Curve;

    #[test]
    fn point_round_trips_compressed_and_uncompressed() {
        let g = Curve::generator();
        let p = g * <Curve as PrimeGroup>::ScalarField::from(7u64);

        for compress in [true, false] {
            let bytes = point_to_bytes(&p, compress).unwrap();
            let back: Curve = point_from_bytes(&bytes, compress).unwrap();
            assert_eq!(p, back);
        }
    }

    #[test]
    fn fingerprint_reduces_mod_order() {
        let fp = [0xffu8; 28];
        let scalar = fingerprint_to_scalar::<Curve>(&fp);
        // Just exercise the reduction; the resulting scalar must be valid
        // field element, i.e. round-trips through bytes.
        let bytes = scalar_to_bytes(&scalar, true).unwrap();
        let back = scalar_from_bytes::<<Curve as PrimeGroup>::ScalarField>(&bytes, true).unwrap();
        assert_eq!(scalar, back);
    }
}
