//! Language-neutral entry points, dispatched at runtime over
//! `SecurityLevel` onto one of four concrete curve instantiations.
//!
//! Rust monomorphizes generics at compile time, so a single runtime
//! value can't carry "whichever curve this security level names" the
//! way a dynamically-typed host language can. The idiom for "pick one
//! of a fixed, small set of concrete types at runtime" is a sum type
//! over the monomorphizations. `any_curve!` below generates that sum
//! type once for `PublicKey`/`SecretKey`/`QueryMessage`/
//! `ResponseMessage` instead of writing the four-armed match by hand
//! four times over.

use ark_bls12_381::G1Projective as Bls12_381G1;
use ark_bn254::G1Projective as Bn254G1;
use ark_ed_on_bls12_381::EdwardsProjective as EdOnBls12_381;
use ark_grumpkin::Projective as Grumpkin;

use crate::codec;
use crate::config::SecurityLevel;
use crate::elgamal::{self, PublicKey, SecretKey};
use crate::error::{PcrError, Result};
use crate::protocol::{self, QueryMessage, ResponseMessage};

macro_rules! any_curve {
    ($name:ident, $inner:ident) => {
        pub enum $name {
            L224($inner<EdOnBls12_381>),
            L256($inner<Bn254G1>),
            L384($inner<Bls12_381G1>),
            L512($inner<Grumpkin>),
        }

        impl $name {
            pub fn security_level(&self) -> SecurityLevel {
                match self {
                    $name::L224(_) => SecurityLevel::L224,
                    $name::L256(_) => SecurityLevel::L256,
                    $name::L384(_) => SecurityLevel::L384,
                    $name::L512(_) => SecurityLevel::L512,
                }
            }
        }
    };
}

any_curve!(AnyPublicKey, PublicKey);
any_curve!(AnySecretKey, SecretKey);
any_curve!(AnyQueryMessage, QueryMessage);
any_curve!(AnyResponseMessage, ResponseMessage);

fn level_mismatch(expected: SecurityLevel, found: SecurityLevel) -> PcrError {
    PcrError::config(format!(
        "security level mismatch: expected {:?}, found {:?}",
        expected, found
    ))
}

/// `req_init(security_level, compress) -> (pk, sk)`.
pub fn req_init(level: SecurityLevel, compress: bool) -> (AnyPublicKey, AnySecretKey) {
    match level {
        SecurityLevel::L224 => {
            let (pk, sk) = elgamal::key_gen::<EdOnBls12_381>(compress);
            (AnyPublicKey::L224(pk), AnySecretKey::L224(sk))
        }
        SecurityLevel::L256 => {
            let (pk, sk) = elgamal::key_gen::<Bn254G1>(compress);
            (AnyPublicKey::L256(pk), AnySecretKey::L256(sk))
        }
        SecurityLevel::L384 => {
            let (pk, sk) = elgamal::key_gen::<Bls12_381G1>(compress);
            (AnyPublicKey::L384(pk), AnySecretKey::L384(sk))
        }
        SecurityLevel::L512 => {
            let (pk, sk) = elgamal::key_gen::<Grumpkin>(compress);
            (AnyPublicKey::L512(pk), AnySecretKey::L512(sk))
        }
    }
}

/// `req_query_gen(pk, set, workers) -> QueryMessage`.
pub fn req_query_gen(pk: &AnyPublicKey, set: &[String], workers: usize) -> Result<AnyQueryMessage> {
    match pk {
        AnyPublicKey::L224(pk) => protocol::query_gen(pk, set, workers).map(AnyQueryMessage::L224),
        AnyPublicKey::L256(pk) => protocol::query_gen(pk, set, workers).map(AnyQueryMessage::L256),
        AnyPublicKey::L384(pk) => protocol::query_gen(pk, set, workers).map(AnyQueryMessage::L384),
        AnyPublicKey::L512(pk) => protocol::query_gen(pk, set, workers).map(AnyQueryMessage::L512),
    }
}

/// `resp_response_gen(query, candidate, workers) -> ResponseMessage`.
pub fn resp_response_gen(query: &AnyQueryMessage, candidate: &[u8], workers: usize) -> AnyResponseMessage {
    match query {
        AnyQueryMessage::L224(q) => AnyResponseMessage::L224(protocol::response_gen(q, candidate, workers)),
        AnyQueryMessage::L256(q) => AnyResponseMessage::L256(protocol::response_gen(q, candidate, workers)),
        AnyQueryMessage::L384(q) => AnyResponseMessage::L384(protocol::response_gen(q, candidate, workers)),
        AnyQueryMessage::L512(q) => AnyResponseMessage::L512(protocol::response_gen(q, candidate, workers)),
    }
}

/// Decrypts `resp` against `set` and returns the matched element, if any.
pub fn req_response_retrieve(
    pk: &AnyPublicKey,
    sk: &AnySecretKey,
    resp: &AnyResponseMessage,
    set: &[String],
    workers: usize,
) -> Result<Option<String>> {
    let level = pk.security_level();
    if sk.security_level() != level || resp.security_level() != level {
        return Err(level_mismatch(level, sk.security_level()));
    }
    let result = match (pk, sk, resp) {
        (AnyPublicKey::L224(pk), AnySecretKey::L224(sk), AnyResponseMessage::L224(resp)) => {
            protocol::response_retrieve(pk, sk, resp, set, workers)
        }
        (AnyPublicKey::L256(pk), AnySecretKey::L256(sk), AnyResponseMessage::L256(resp)) => {
            protocol::response_retrieve(pk, sk, resp, set, workers)
        }
        (AnyPublicKey::L384(pk), AnySecretKey::L384(sk), AnyResponseMessage::L384(resp)) => {
            protocol::response_retrieve(pk, sk, resp, set, workers)
        }
        (AnyPublicKey::L512(pk), AnySecretKey::L512(sk), AnyResponseMessage::L512(resp)) => {
            protocol::response_retrieve(pk, sk, resp, set, workers)
        }
        _ => unreachable!("security level match checked above"),
    };
    Ok(result)
}

pub fn encode_query(q: &AnyQueryMessage) -> Result<Vec<u8>> {
    match q {
        AnyQueryMessage::L224(q) => codec::encode_query(q),
        AnyQueryMessage::L256(q) => codec::encode_query(q),
        AnyQueryMessage::L384(q) => codec::encode_query(q),
        AnyQueryMessage::L512(q) => codec::encode_query(q),
    }
}

pub fn decode_query(level: SecurityLevel, bytes: &[u8]) -> Result<AnyQueryMessage> {
    Ok(match level {
        SecurityLevel::L224 => AnyQueryMessage::L224(codec::decode_query(bytes)?),
        SecurityLevel::L256 => AnyQueryMessage::L256(codec::decode_query(bytes)?),
        SecurityLevel::L384 => AnyQueryMessage::L384(codec::decode_query(bytes)?),
        SecurityLevel::L512 => AnyQueryMessage::L512(codec::decode_query(bytes)?),
    })
}

pub fn encode_response(r: &AnyResponseMessage, compress: bool) -> Result<Vec<u8>> {
    match r {
        AnyResponseMessage::L224(r) => codec::encode_response(r, compress),
        AnyResponseMessage::L256(r) => codec::encode_response(r, compress),
        AnyResponseMessage::L384(r) => codec::encode_response(r, compress),
        AnyResponseMessage::L512(r) => codec::encode_response(r, compress),
    }
}

pub fn decode_response(level: SecurityLevel, bytes: &[u8]) -> Result<AnyResponseMessage> {
    Ok(match level {
        SecurityLevel::L224 => AnyResponseMessage::L224(codec::decode_response(bytes)?),
        SecurityLevel::L256 => AnyResponseMessage::L256(codec::decode_response(bytes)?),
        SecurityLevel::L384 => AnyResponseMessage::L384(codec::decode_response(bytes)?),
        SecurityLevel::L512 => AnyResponseMessage::L512(codec::decode_response(bytes)?),
    })
}
