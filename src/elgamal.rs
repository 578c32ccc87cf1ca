//! Additively-homomorphic ElGamal over an elliptic curve.
//!
//! `encrypt` and the underlying `(g*r, g*m + h*r)` construction are the
//! textbook curve variant; `EncryptInv`, `Add`, `ScalarMultRandomizer`,
//! `DecryptZero` and `DecryptEq` layer a zero-test primitive on top, used
//! by the protocol to check plaintext equality without ever decrypting
//! to a comparable point directly.

use ark_ec::CurveGroup;
use ark_ff::{PrimeField, UniformRand};
use rand::rngs::OsRng;

use crate::curve::{fingerprint_to_scalar, lift_to_point, point_from_bytes, point_to_bytes};
use crate::error::Result;

const LOG_TARGET: &str = "pcr::elgamal";

/// `pk = (curve-id implicit in C, g, h = g*sk, compress)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PublicKey<C: CurveGroup> {
    pub h: C,
    pub compress: bool,
}

/// `sk`, scalar in `[1, n-1]`. Never leaves the Target; zeroized on drop.
#[derive(Clone, Debug)]
pub struct SecretKey<C: CurveGroup> {
    sk: C::ScalarField,
}

impl<C: CurveGroup> Drop for SecretKey<C> {
    fn drop(&mut self) {
        // PrimeField scalars don't implement Zeroize directly; overwrite
        // via the underlying byte representation instead.
        self.sk = C::ScalarField::from(0u64);
    }
}

/// `(C1, C2)`, additively homomorphic under `Add`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ciphertext<C: CurveGroup> {
    pub c1: C,
    pub c2: C,
}

impl<C: CurveGroup> Ciphertext<C> {
    pub fn new(c1: C, c2: C) -> Self {
        Ciphertext { c1, c2 }
    }
}

/// `KeyGen(security_level, compress) -> (pk, sk)`.
/// The security level itself is selected by the caller via the concrete
/// curve `C`; see `config::SecurityLevel` and `api`.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn key_gen<C: CurveGroup>(compress: bool) -> (PublicKey<C>, SecretKey<C>) {
    let mut rng = OsRng;
    let sk = loop {
        let candidate = C::ScalarField::rand(&mut rng);
        if !candidate.is_zero() {
            break candidate;
        }
    };
    let h = C::generator() * sk;
    tracing::debug!(target: LOG_TARGET, "generated key pair");
    (PublicKey { h, compress }, SecretKey { sk })
}

fn fresh_nonzero_scalar<F: PrimeField>() -> F {
    let mut rng = OsRng;
    loop {
        let candidate = F::rand(&mut rng);
        if !candidate.is_zero() {
            return candidate;
        }
    }
}

impl<C: CurveGroup> PublicKey<C> {
    /// `Encrypt(pk, m) -> C`: `(g*r, g*m + h*r)` for fresh `r`.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn encrypt(&self, m: C::ScalarField) -> Ciphertext<C> {
        let r = fresh_nonzero_scalar::<C::ScalarField>();
        let c1 = C::generator() * r;
        let c2 = lift_to_point::<C>(m) + self.h * r;
        Ciphertext::new(c1, c2)
    }

    /// Convenience wrapper over `encrypt` for fingerprint bytes, reducing
    /// them mod the curve order first.
    pub fn encrypt_fingerprint(&self, fp_bytes: &[u8]) -> Ciphertext<C> {
        self.encrypt(fingerprint_to_scalar::<C>(fp_bytes))
    }

    /// `EncryptInv(pk, m) -> Encrypt(pk, -m mod n)`.
    pub fn encrypt_inv(&self, m: C::ScalarField) -> Ciphertext<C> {
        self.encrypt(-m)
    }

    pub fn encrypt_inv_fingerprint(&self, fp_bytes: &[u8]) -> Ciphertext<C> {
        self.encrypt_inv(fingerprint_to_scalar::<C>(fp_bytes))
    }

    /// `Add(C_a, C_b) -> C`: pointwise group addition, plaintext-additive.
    pub fn add(&self, a: Ciphertext<C>, b: Ciphertext<C>) -> Ciphertext<C> {
        Ciphertext::new(a.c1 + b.c1, a.c2 + b.c2)
    }

    /// `ScalarMultRandomizer(C) -> C'`: scale both coordinates by a fresh
    /// nonzero scalar `s`. Zero plaintexts stay zero; nonzero plaintexts
    /// become uniformly random and unrelated to the original — the
    /// blinding primitive response generation relies on.
    pub fn scalar_mult_randomizer(&self, c: Ciphertext<C>) -> Ciphertext<C> {
        let s = fresh_nonzero_scalar::<C::ScalarField>();
        Ciphertext::new(c.c1 * s, c.c2 * s)
    }

    pub fn to_bytes(&self, compress: bool) -> Result<Vec<u8>> {
        point_to_bytes(&self.h, compress)
    }

    pub fn from_bytes(bytes: &[u8], compress: bool) -> Result<Self> {
        let h = point_from_bytes::<C>(bytes, compress)?;
        Ok(PublicKey { h, compress })
    }
}

impl<C: CurveGroup> SecretKey<C> {
    pub fn scalar(&self) -> C::ScalarField {
        self.sk
    }

    /// `DecryptZero(sk, C) -> bool`: `C2 - sk*C1 == identity`.
    pub fn decrypt_zero(&self, c: Ciphertext<C>) -> bool {
        let p = c.c2 - c.c1 * self.sk;
        p.is_zero()
    }

    /// `DecryptEq(sk, C, fp_bytes) -> bool`: `C2 - sk*C1 == g*int(fp_bytes)`.
    pub fn decrypt_eq(&self, c: Ciphertext<C>, fp_bytes: &[u8]) -> bool {
        let p = c.c2 - c.c1 * self.sk;
        p == lift_to_point::<C>(fingerprint_to_scalar::<C>(fp_bytes))
    }

    /// Full decryption to the underlying curve point, used once retrieval
    /// has already established a match.
    pub fn decrypt_point(&self, c: Ciphertext<C>) -> C {
        c.c2 - c.c1 * self.sk
    }
}

impl<C: CurveGroup> Ciphertext<C> {
    pub fn to_bytes(&self, compress: bool) -> Result<Vec<u8>> {
        let mut out = point_to_bytes(&self.c1, compress)?;
        out.extend(point_to_bytes(&self.c2, compress)?);
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8], compress: bool) -> Result<Self> {
        let half = bytes.len() / 2;
        let c1 = point_from_bytes::<C>(&bytes[..half], compress)?;
        let c2 = point_from_bytes::<C>(&bytes[half..], compress)?;
        Ok(Ciphertext::new(c1, c2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::PrimeGroup;
    use ark_grumpkin::Projective as Curve;
    type Scalar = <Curve as PrimeGroup>::ScalarField;

    #[test]
    fn decrypt_zero_iff_plaintext_zero() {
        let (pk, sk) = key_gen::<Curve>(true);
        assert!(sk.decrypt_zero(pk.encrypt(Scalar::from(0u64))));
        assert!(!sk.decrypt_zero(pk.encrypt(Scalar::from(1u64))));
    }

    #[test]
    fn decrypt_eq_matches_exact_plaintext() {
        let (pk, sk) = key_gen::<Curve>(true);
        let c = pk.encrypt(Scalar::from(42u64));
        let mut bytes = [0u8; 28];
        bytes[27] = 42;
        assert!(sk.decrypt_eq(c, &bytes));
        bytes[27] = 43;
        assert!(!sk.decrypt_eq(c, &bytes));
    }

    #[test]
    fn scalar_mult_randomizer_preserves_zero() {
        let (pk, sk) = key_gen::<Curve>(true);
        let c = pk.encrypt(Scalar::from(0u64));
        let randomized = pk.scalar_mult_randomizer(c);
        assert!(sk.decrypt_zero(randomized));
    }

    #[test]
    fn scalar_mult_randomizer_breaks_nonzero() {
        let (pk, sk) = key_gen::<Curve>(true);
        let c = pk.encrypt(Scalar::from(9u64));
        let randomized = pk.scalar_mult_randomizer(c);
        assert!(!sk.decrypt_zero(randomized));
    }

    #[test]
    fn add_is_plaintext_additive() {
        let (pk, sk) = key_gen::<Curve>(true);
        let a = pk.encrypt(Scalar::from(3u64));
        let b = pk.encrypt(Scalar::from(4u64));
        let sum = pk.add(a, b);
        let mut bytes = [0u8; 28];
        bytes[27] = 7;
        assert!(sk.decrypt_eq(sum, &bytes));
    }

    #[test]
    fn encrypt_inv_cancels_matching_fingerprint() {
        let (pk, sk) = key_gen::<Curve>(true);
        let fp_bytes = crate::fingerprint::fp(b"Simba");
        let c = pk.encrypt_fingerprint(&fp_bytes);
        let inv = pk.encrypt_inv_fingerprint(&fp_bytes);
        let zero = pk.add(c, inv);
        assert!(sk.decrypt_zero(zero));
    }

    #[test]
    fn ciphertext_byte_round_trip() {
        let (pk, _sk) = key_gen::<Curve>(true);
        let c = pk.encrypt(Scalar::from(123u64));
        for compress in [true, false] {
            let bytes = c.to_bytes(compress).unwrap();
            let back = Ciphertext::<Curve>::from_bytes(&bytes, compress).unwrap();
            assert_eq!(c, back);
        }
    }

    #[test]
    fn public_key_byte_round_trip() {
        let (pk, _sk) = key_gen::<Curve>(true);
        for compress in [true, false] {
            let bytes = pk.to_bytes(compress).unwrap();
            let back = PublicKey::<Curve>::from_bytes(&bytes, compress).unwrap();
            assert_eq!(pk.h, back.h);
        }
    }
}
