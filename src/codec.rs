//! The transport codec: wire framing for queries and responses.
//!
//! A small fixed-width binary framing built directly on `ark_serialize`'s
//! own compressed/uncompressed point encoding (`curve::point_to_bytes` /
//! `point_from_bytes`), so round-tripping is the identity and a corrupted
//! byte is caught as an off-curve point or a header mismatch — a
//! recoverable `CodecError` — rather than ever panicking.

use ark_ec::CurveGroup;

use crate::curve::{point_from_bytes, point_to_bytes};
use crate::elgamal::{Ciphertext, PublicKey};
use crate::error::{PcrError, Result};
use crate::protocol::{QueryMessage, ResponseMessage};

const VERSION: u8 = 1;

fn read_u8(bytes: &[u8], pos: &mut usize) -> Result<u8> {
    let byte = *bytes
        .get(*pos)
        .ok_or_else(|| PcrError::codec("unexpected end of input reading u8"))?;
    *pos += 1;
    Ok(byte)
}

fn read_u32(bytes: &[u8], pos: &mut usize) -> Result<u32> {
    let slice = bytes
        .get(*pos..*pos + 4)
        .ok_or_else(|| PcrError::codec("unexpected end of input reading u32"))?;
    *pos += 4;
    Ok(u32::from_le_bytes(slice.try_into().unwrap()))
}

fn read_exact<'a>(bytes: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8]> {
    let slice = bytes
        .get(*pos..*pos + len)
        .ok_or_else(|| PcrError::codec("unexpected end of input reading fixed-size field"))?;
    *pos += len;
    Ok(slice)
}

fn ciphertext_bytes<C: CurveGroup>(c: &Ciphertext<C>, compress: bool) -> Result<Vec<u8>> {
    let mut out = point_to_bytes(&c.c1, compress)?;
    out.extend(point_to_bytes(&c.c2, compress)?);
    Ok(out)
}

fn ciphertext_from_bytes<C: CurveGroup>(
    bytes: &[u8],
    point_size: usize,
    compress: bool,
) -> Result<Ciphertext<C>> {
    if bytes.len() != 2 * point_size {
        return Err(PcrError::codec("ciphertext byte length mismatch"));
    }
    let c1 = point_from_bytes::<C>(&bytes[..point_size], compress)?;
    let c2 = point_from_bytes::<C>(&bytes[point_size..], compress)?;
    Ok(Ciphertext::new(c1, c2))
}

/// `EncodeQuery`.
pub fn encode_query<C: CurveGroup>(query: &QueryMessage<C>) -> Result<Vec<u8>> {
    let compress = query.pk.compress;
    let pk_bytes = point_to_bytes(&query.pk.h, compress)?;
    let point_size = pk_bytes.len();
    let b = query.bucket_size();
    let l = query.width();

    let mut out = Vec::new();
    out.push(VERSION);
    out.push(compress as u8);
    out.extend((point_size as u32).to_le_bytes());
    out.extend(&pk_bytes);
    out.extend((b as u32).to_le_bytes());
    out.extend((l as u32).to_le_bytes());
    for column in &query.ecf {
        for ciphertext in column {
            out.extend(ciphertext_bytes(ciphertext, compress)?);
        }
    }
    Ok(out)
}

/// `DecodeQuery`. Malformed input (short reads, off-curve points,
/// header/body length mismatch) yields `CodecError`.
pub fn decode_query<C: CurveGroup>(bytes: &[u8]) -> Result<QueryMessage<C>> {
    let mut pos = 0usize;
    let version = read_u8(bytes, &mut pos)?;
    if version != VERSION {
        return Err(PcrError::codec(format!("unsupported query codec version {version}")));
    }
    let compress = read_u8(bytes, &mut pos)? != 0;
    let point_size = read_u32(bytes, &mut pos)? as usize;
    let pk_bytes = read_exact(bytes, &mut pos, point_size)?;
    let pk = PublicKey::<C>::from_bytes(pk_bytes, compress)?;
    let b = read_u32(bytes, &mut pos)? as usize;
    let l = read_u32(bytes, &mut pos)? as usize;

    let mut ecf = Vec::with_capacity(b);
    for _ in 0..b {
        let mut column = Vec::with_capacity(l);
        for _ in 0..l {
            let raw = read_exact(bytes, &mut pos, 2 * point_size)?;
            column.push(ciphertext_from_bytes::<C>(raw, point_size, compress)?);
        }
        ecf.push(column);
    }
    if pos != bytes.len() {
        return Err(PcrError::codec("trailing bytes after query body"));
    }
    Ok(QueryMessage { pk, ecf })
}

/// `EncodeResponse`. `compress` mirrors the flag the query that produced
/// this response was built with.
pub fn encode_response<C: CurveGroup>(response: &ResponseMessage<C>, compress: bool) -> Result<Vec<u8>> {
    if response.z.len() != response.z_prime.len() {
        return Err(PcrError::codec("Z and Z' length mismatch"));
    }
    let point_size = if let Some(first) = response.z.first() {
        point_to_bytes(&first.c1, compress)?.len()
    } else {
        return Err(PcrError::codec("empty response"));
    };

    let mut out = Vec::new();
    out.push(VERSION);
    out.push(compress as u8);
    out.extend((point_size as u32).to_le_bytes());
    out.extend((response.z.len() as u32).to_le_bytes());
    for c in &response.z {
        out.extend(ciphertext_bytes(c, compress)?);
    }
    for c in &response.z_prime {
        out.extend(ciphertext_bytes(c, compress)?);
    }
    Ok(out)
}

/// `DecodeResponse`.
pub fn decode_response<C: CurveGroup>(bytes: &[u8]) -> Result<ResponseMessage<C>> {
    let mut pos = 0usize;
    let version = read_u8(bytes, &mut pos)?;
    if version != VERSION {
        return Err(PcrError::codec(format!(
            "unsupported response codec version {version}"
        )));
    }
    let compress = read_u8(bytes, &mut pos)? != 0;
    let point_size = read_u32(bytes, &mut pos)? as usize;
    let len = read_u32(bytes, &mut pos)? as usize;

    let mut z = Vec::with_capacity(len);
    for _ in 0..len {
        let raw = read_exact(bytes, &mut pos, 2 * point_size)?;
        z.push(ciphertext_from_bytes::<C>(raw, point_size, compress)?);
    }
    let mut z_prime = Vec::with_capacity(len);
    for _ in 0..len {
        let raw = read_exact(bytes, &mut pos, 2 * point_size)?;
        z_prime.push(ciphertext_from_bytes::<C>(raw, point_size, compress)?);
    }
    if pos != bytes.len() {
        return Err(PcrError::codec("trailing bytes after response body"));
    }
    Ok(ResponseMessage { z, z_prime })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::key_gen;
    use ark_grumpkin::Projective as Curve;

    fn sample_query(compress: bool) -> QueryMessage<Curve> {
        let (pk, _sk) = key_gen::<Curve>(compress);
        crate::protocol::query_gen(&pk, &["Simba", "Simba42", "Simba7"], 2).unwrap()
    }

    #[test]
    fn query_round_trips_compressed_and_uncompressed() {
        for compress in [true, false] {
            let query = sample_query(compress);
            let bytes = encode_query(&query).unwrap();
            let decoded: QueryMessage<Curve> = decode_query(&bytes).unwrap();
            assert_eq!(decoded.bucket_size(), query.bucket_size());
            assert_eq!(decoded.width(), query.width());
            assert_eq!(decoded.pk.h, query.pk.h);
            assert_eq!(decoded.ecf, query.ecf);
        }
    }

    #[test]
    fn response_round_trips() {
        let query = sample_query(true);
        let response = crate::protocol::response_gen(&query, b"Simba", 2);
        let bytes = encode_response(&response, true).unwrap();
        let decoded: ResponseMessage<Curve> = decode_response(&bytes).unwrap();
        assert_eq!(decoded.z, response.z);
        assert_eq!(decoded.z_prime, response.z_prime);
    }

    #[test]
    fn corrupted_byte_yields_codec_error() {
        let query = sample_query(true);
        let mut bytes = encode_query(&query).unwrap();
        assert!(bytes.len() > 17);
        bytes[17] ^= 0xff;
        let decoded: Result<QueryMessage<Curve>> = decode_query(&bytes);
        assert!(decoded.is_err());
    }

    #[test]
    fn truncated_bytes_yield_codec_error() {
        let query = sample_query(true);
        let bytes = encode_query(&query).unwrap();
        let truncated = &bytes[..bytes.len() - 3];
        let decoded: Result<QueryMessage<Curve>> = decode_query(truncated);
        assert!(decoded.is_err());
    }
}
