use anyhow::{Context, Result};
use clap::Parser;
use rand::seq::SliceRandom;
use rand::Rng;

use pcr_core::{
    decode_query, decode_response, encode_query, encode_response, req_init, req_query_gen,
    req_response_retrieve, resp_response_gen, PcrConfig, SecurityLevel,
};

const LOG_TARGET: &str = "pcr_demo";

/// Runs one end-to-end private containment retrieval exchange: a Target
/// builds a honeyword set, a Monitor checks a candidate login string
/// against it, and the Target learns only match status.
#[derive(Parser, Debug)]
#[command(author, version, about = "Private containment retrieval demo", long_about = None)]
struct Cli {
    /// 224, 256, 384 or 512
    #[arg(long, default_value_t = 256)]
    key_length: u32,

    /// size of the decoy set (the Target's total set size is this plus one)
    #[arg(long, default_value_t = 1024)]
    num_honeywords: usize,

    /// worker pool size for query/response/retrieval
    #[arg(long, default_value_t = 2)]
    num_threads: usize,

    /// whether curve points are serialized in compressed form
    #[arg(long, default_value_t = true)]
    enable_point_compression: bool,

    /// the string the Monitor checks against the Target's set
    #[arg(long, default_value = "Simba")]
    monitor_input: String,
}

fn main() -> Result<()> {
    pcr_core::logging::init();
    let cli = Cli::parse();

    let security_level = SecurityLevel::from_bits(cli.key_length)
        .context("unsupported --key-length")?;

    let config = PcrConfig {
        security_level,
        point_compression: cli.enable_point_compression,
        ..PcrConfig::default()
    };
    let config_json = serde_json::to_string(&config).context("serializing config for startup log")?;

    tracing::info!(
        target: LOG_TARGET,
        config = %config_json,
        num_honeywords = cli.num_honeywords,
        num_threads = cli.num_threads,
        "starting PCR exchange"
    );

    let mut set = Vec::with_capacity(cli.num_honeywords + 1);
    set.push("Simba".to_string());
    let mut rng = rand::thread_rng();
    for _ in 0..cli.num_honeywords {
        set.push(format!("Simba{}", rng.gen_range(0..9999)));
    }
    set.shuffle(&mut rng);

    let (pk, sk) = req_init(security_level, cli.enable_point_compression);

    let query = req_query_gen(&pk, &set, cli.num_threads)?;
    let query_bytes = encode_query(&query)?;
    let query_prefix = hex::encode(&query_bytes[..query_bytes.len().min(16)]);
    tracing::info!(
        target: LOG_TARGET,
        bytes = query_bytes.len(),
        prefix = %query_prefix,
        "query encoded"
    );

    let received_query = decode_query(security_level, &query_bytes)?;
    let response = resp_response_gen(&received_query, cli.monitor_input.as_bytes(), cli.num_threads);
    let response_bytes = encode_response(&response, cli.enable_point_compression)?;
    tracing::info!(target: LOG_TARGET, bytes = response_bytes.len(), "response encoded");

    let received_response = decode_response(security_level, &response_bytes)?;
    let result = req_response_retrieve(&pk, &sk, &received_response, &set, cli.num_threads)?;

    match result {
        Some(matched) => tracing::info!(target: LOG_TARGET, %matched, "PCR result: positive"),
        None => tracing::info!(target: LOG_TARGET, "PCR result: negative"),
    }

    Ok(())
}
