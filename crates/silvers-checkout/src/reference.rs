//! Order reference codes: `ORD-{unix millis}-{9 base36 chars}`.
//!
//! Practically unique per order; there is no collision detection. The
//! conditional header insert turns an accidental collision into
//! [`crate::CheckoutError::AlreadySubmitted`] rather than a duplicate row.

use chrono::{DateTime, Utc};
use rand::Rng;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Generates a reference code stamped with the current time.
#[must_use]
pub fn generate_reference() -> String {
    reference_at(Utc::now(), &mut rand::rng())
}

/// Generates a reference code for `now` using `rng` for the suffix.
pub fn reference_at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect();
    format!("ORD-{}-{suffix}", now.timestamp_millis())
}

/// `true` if `reference` has the shape [`generate_reference`] produces.
#[must_use]
pub fn is_reference(reference: &str) -> bool {
    let mut parts = reference.splitn(3, '-');
    let (Some("ORD"), Some(millis), Some(suffix)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| ALPHABET.contains(&b))
}
