//! ID generation and format checks.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Length of an issue `_id` in hex digits.
pub const ID_LENGTH: usize = 24;

/// Generate a unique issue `_id`.
///
/// Hashes the creation inputs with SHA256 and keeps the first
/// [`ID_LENGTH`] hex digits. The `exists` closure checks for collisions;
/// on a collision the nonce is bumped and the hash recomputed.
pub fn generate_id<F>(
    project: &str,
    title: &str,
    creator: &str,
    created_at: DateTime<Utc>,
    exists: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    let mut nonce = 0u64;
    loop {
        let seed = generate_id_seed(project, title, creator, created_at, nonce);
        let id = compute_id_hash(&seed);
        if !exists(&id) {
            return id;
        }
        nonce += 1;
    }
}

fn generate_id_seed(
    project: &str,
    title: &str,
    creator: &str,
    created_at: DateTime<Utc>,
    nonce: u64,
) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        project,
        title,
        creator,
        created_at.timestamp_nanos_opt().unwrap_or(0),
        nonce
    )
}

fn compute_id_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..ID_LENGTH].to_string()
}

/// Check that `id` has the shape of a store-assigned identifier.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
