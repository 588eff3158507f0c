//! Nonce generation for the `nonce_str` field.

use rand::RngExt;
use rand::rng;

/// Length of a generated nonce.
pub const NONCE_LEN: usize = 32;

const NONCE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Returns a fresh 32-character lowercase alphanumeric nonce.
///
/// Draws from the calling thread's generator, so concurrent callers never
/// share generator state.
#[must_use]
pub fn generate_nonce() -> String {
    let mut rng = rng();
    (0..NONCE_LEN)
        .map(|_| char::from(NONCE_ALPHABET[rng.random_range(0..NONCE_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_nonce_length_and_alphabet() {
        for _ in 0..100 {
            let nonce = generate_nonce();
            assert_eq!(nonce.len(), NONCE_LEN);
            assert!(
                nonce
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_consecutive_nonces_differ() {
        assert_ne!(generate_nonce(), generate_nonce());
    }

    #[test]
    fn test_nonces_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..64).map(|_| generate_nonce()).collect::<Vec<_>>()))
            .collect();
        let mut seen = HashSet::new();
        for handle in handles {
            for nonce in handle.join().unwrap() {
                assert!(seen.insert(nonce));
            }
        }
    }
}
