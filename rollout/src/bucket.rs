//! Deterministic bucket assignment for percentage rollouts.
//!
//! An identifier is lowercased, hashed with 32-bit djb2 and reduced modulo
//! [`BUCKET_COUNT`]. A feature is enabled for the identifier when its bucket is
//! strictly below the rollout percentage.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const BUCKET_COUNT: u32 = 100;

const DJB2_SEED: i32 = 5381;

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("percentage must be between 0 and 100, got {0}")]
pub struct PercentageError(pub u8);

/// A rollout threshold in the range [0, 100].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    pub const NONE: Percentage = Percentage(0);
    pub const ALL: Percentage = Percentage(100);

    pub fn new(value: u8) -> Result<Self, PercentageError> {
        if value > 100 {
            return Err(PercentageError(value));
        }
        Ok(Percentage(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Percentage {
    type Error = PercentageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Percentage::new(value)
    }
}

impl From<Percentage> for u8 {
    fn from(percentage: Percentage) -> Self {
        percentage.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub bucket: u8,
    pub enabled: bool,
}

/// djb2 over the lowercased identifier, using wrapping i32 arithmetic.
pub fn hash_identifier(identifier: &str) -> u32 {
    let normalized = identifier.to_lowercase();
    let mut hash = DJB2_SEED;
    for byte in normalized.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as i32);
    }
    hash.unsigned_abs()
}

/// Returns the bucket in [0, 99] an identifier falls into.
pub fn bucket_for(identifier: &str) -> u8 {
    // always < 100, fits in u8
    (hash_identifier(identifier) % BUCKET_COUNT) as u8
}

pub fn evaluate(identifier: &str, threshold: Percentage) -> Evaluation {
    let bucket = bucket_for(identifier);
    Evaluation {
        bucket,
        enabled: bucket < threshold.value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(value: u8) -> Percentage {
        Percentage::new(value).unwrap()
    }

    #[test]
    fn test_deterministic() {
        let first = evaluate("alpha@demo.com", pct(50));
        for _ in 0..10 {
            assert_eq!(evaluate("alpha@demo.com", pct(50)), first);
        }
    }

    #[test]
    fn test_known_buckets() {
        // Pinned so that a change to the hash is caught, not silently reshuffled.
        assert_eq!(bucket_for("alpha@demo.com"), 11);
        assert_eq!(bucket_for("random@demo.com"), 48);
        assert_eq!(bucket_for("testuser"), 64);
        assert_eq!(hash_identifier(""), 5381);
        assert_eq!(bucket_for(""), 81);
    }

    #[test]
    fn test_threshold_boundaries() {
        for id in ["", "a", "alpha@demo.com", "Z", "some-long-identifier-0123456789"] {
            assert!(!evaluate(id, Percentage::NONE).enabled);
            assert!(evaluate(id, Percentage::ALL).enabled);
        }
    }

    #[test]
    fn test_bucket_equal_to_threshold_is_disabled() {
        let bucket = bucket_for("alpha@demo.com");
        assert!(!evaluate("alpha@demo.com", pct(bucket)).enabled);
        assert!(evaluate("alpha@demo.com", pct(bucket + 1)).enabled);
    }

    #[test]
    fn test_case_insensitive() {
        for threshold in [0, 20, 50, 100] {
            assert_eq!(
                evaluate("Alice@Demo.com", pct(threshold)),
                evaluate("alice@demo.com", pct(threshold))
            );
        }
        assert_eq!(bucket_for("ÉLODIE@demo.com"), bucket_for("élodie@demo.com"));
    }

    #[test]
    fn test_bucket_range() {
        for i in 0..1000 {
            let bucket = bucket_for(&format!("user-{i}"));
            assert!(bucket < 100, "bucket {bucket} out of range");
        }
    }

    #[test]
    fn test_distribution() {
        let enabled = (0..100)
            .filter(|i| evaluate(&format!("user{i}@demo.com"), pct(20)).enabled)
            .count();
        assert!((0..=40).contains(&enabled), "{enabled} of 100 enabled");

        let enabled = (0..1000)
            .filter(|i| evaluate(&format!("user{i}@demo.com"), pct(20)).enabled)
            .count();
        assert!((150..=250).contains(&enabled), "{enabled} of 1000 enabled");
    }

    #[test]
    fn test_percentage_bounds() {
        assert_eq!(Percentage::new(100).unwrap(), Percentage::ALL);
        assert_eq!(Percentage::new(101), Err(PercentageError(101)));
        assert!(serde_json::from_str::<Percentage>("101").is_err());
        assert_eq!(serde_json::from_str::<Percentage>("20").unwrap(), pct(20));
    }
}
