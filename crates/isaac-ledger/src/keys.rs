//! Storage key builders.
//!
//! Every key is a byte string with a short ASCII prefix followed by
//! fixed-width fields so that lexicographic order over raw bytes matches
//! numeric order over heights and sequence numbers. A trailing UUID
//! disambiguates keys that would otherwise collide (two transactions from
//! the same source landing in the same block, say).

use isaac_types::{Address, Hash, Timestamp};
use uuid::Uuid;

fn join(parts: &[&[u8]]) -> Vec<u8> {
    let mut buf = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            buf.push(b'-');
        }
        buf.extend_from_slice(part);
    }
    buf
}

fn be_height(height: u64) -> [u8; 8] {
    height.to_be_bytes()
}

fn be_seq(seq: u64) -> [u8; 8] {
    seq.to_be_bytes()
}

fn be_nanos(ts: Timestamp) -> [u8; 16] {
    ts.as_nanos().to_be_bytes()
}

/// `ba-<address>` — the account record.
#[must_use]
pub fn account(address: &Address) -> Vec<u8> {
    join(&[b"ba", address.as_bytes()])
}

/// `bac-<created>-<uuid>` — accounts ordered by creation time.
#[must_use]
pub fn account_by_created(created: Timestamp, disambiguator: Uuid) -> Vec<u8> {
    join(&[b"bac", &be_nanos(created), disambiguator.as_bytes()])
}

/// `bt-<hash>` — the `BlockTransaction` record.
#[must_use]
pub fn block_transaction(hash: &Hash) -> Vec<u8> {
    join(&[b"bt", hash.to_string().as_bytes()])
}

/// `bts-<source>-<height>-<seq>-<uuid>` — transactions ordered by source.
#[must_use]
pub fn block_transaction_by_source(
    source: &Address,
    height: u64,
    seq: u64,
    disambiguator: Uuid,
) -> Vec<u8> {
    join(&[
        b"bts",
        source.as_bytes(),
        &be_height(height),
        &be_seq(seq),
        disambiguator.as_bytes(),
    ])
}

/// `btc-<confirmed>-<uuid>` — transactions ordered by confirmation time.
#[must_use]
pub fn block_transaction_by_confirmed(confirmed: Timestamp, disambiguator: Uuid) -> Vec<u8> {
    join(&[b"btc", &be_nanos(confirmed), disambiguator.as_bytes()])
}

/// `bta-<address>-<height>-<seq>-<uuid>` — transactions a given account took
/// part in (as source or as a payable target), ordered by height/sequence.
#[must_use]
pub fn block_transaction_by_account(
    address: &Address,
    height: u64,
    seq: u64,
    disambiguator: Uuid,
) -> Vec<u8> {
    join(&[
        b"bta",
        address.as_bytes(),
        &be_height(height),
        &be_seq(seq),
        disambiguator.as_bytes(),
    ])
}

/// `btb-<block-hash>-<height>-<seq>-<uuid>` — transactions grouped by block.
#[must_use]
pub fn block_transaction_by_block(
    block_hash: &Hash,
    height: u64,
    seq: u64,
    disambiguator: Uuid,
) -> Vec<u8> {
    join(&[
        b"btb",
        block_hash.to_string().as_bytes(),
        &be_height(height),
        &be_seq(seq),
        disambiguator.as_bytes(),
    ])
}

/// `bth-<hash>` — transaction history, written for both successes and
/// failures.
#[must_use]
pub fn transaction_history(hash: &Hash) -> Vec<u8> {
    join(&[b"bth", hash.to_string().as_bytes()])
}

/// `bl-<hash>` — a block keyed by its own hash.
#[must_use]
pub fn block(hash: &Hash) -> Vec<u8> {
    join(&[b"bl", hash.to_string().as_bytes()])
}

/// `blh-<height>` — a block keyed by height, value is the block hash.
#[must_use]
pub fn block_by_height(height: u64) -> Vec<u8> {
    join(&[b"blh", &be_height(height)])
}
