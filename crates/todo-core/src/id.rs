//! Short, collision-resistant item identifiers.
//!
//! IDs look like `td-k3x9q2`: a fixed prefix followed by base36 characters
//! taken from a blake3 digest of the wall clock, a process-wide counter and
//! random bytes. The suffix starts at [`MIN_SUFFIX_LEN`] characters and grows
//! only when the caller reports a collision with a live ID.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix shared by every generated ID.
pub const ID_PREFIX: &str = "td-";

/// Suffix length used when there is no collision.
pub const MIN_SUFFIX_LEN: usize = 6;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate an ID for which `is_taken` returns false.
pub fn generate_id(is_taken: impl Fn(&str) -> bool) -> String {
    loop {
        let suffix = base36(&seed_digest());
        for len in MIN_SUFFIX_LEN..=suffix.len() {
            let candidate = format!("{ID_PREFIX}{}", &suffix[..len]);
            if !is_taken(&candidate) {
                return candidate;
            }
        }
        tracing::debug!("exhausted id digest without a free candidate, reseeding");
    }
}

fn seed_digest() -> [u8; 32] {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    let salt: u64 = rand::random();

    let mut hasher = blake3::Hasher::new();
    hasher.update(&nanos.to_le_bytes());
    hasher.update(&count.to_le_bytes());
    hasher.update(&salt.to_le_bytes());
    *hasher.finalize().as_bytes()
}

fn base36(digest: &[u8; 32]) -> String {
    let mut head = [0u8; 16];
    head.copy_from_slice(&digest[..16]);
    let mut n = u128::from_le_bytes(head);

    let mut out = Vec::with_capacity(25);
    while n > 0 {
        out.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    if out.is_empty() {
        out.push(b'0');
    }
    // Only ASCII from ALPHABET is ever pushed.
    out.into_iter().map(char::from).collect()
}
