pub mod api;
pub mod codec;
pub mod config;
pub mod cuckoo;
pub mod curve;
pub mod elgamal;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod protocol;
pub mod worker;

pub use api::{
    decode_query, decode_response, encode_query, encode_response, req_init, req_query_gen,
    req_response_retrieve, resp_response_gen, AnyPublicKey, AnyQueryMessage, AnyResponseMessage,
    AnySecretKey,
};
pub use config::{PcrConfig, SecurityLevel};
pub use error::{PcrError, Result};
