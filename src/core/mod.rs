//! Core business logic - framework-agnostic filtering, pagination, analytics,
//! waitlist and verification-code operations.

/// Curated-date statistics
pub mod dates;
/// Record filters for transactions and curated dates
pub mod filter;
/// Page slicing of sorted collections
pub mod pagination;
/// Revenue analytics over transactions
pub mod revenue;
/// E-mail verification codes
pub mod verification;
/// Pre-launch waitlist
pub mod waitlist;

use crate::errors::{Error, Result};

/// Share of `part` in `total` as a whole percentage in `[0, 100]`.
///
/// Returns 0 when `total` is not positive, so empty inputs never produce NaN.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percentage(part: f64, total: f64) -> u32 {
    if total <= 0.0 || !part.is_finite() || !total.is_finite() {
        return 0;
    }
    // Clamped to [0, 100] so the cast is lossless.
    ((part / total) * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Trims and lowercases an e-mail address, rejecting obviously invalid ones.
///
/// # Errors
/// Returns a validation error on the `email` field.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    let valid = email.len() <= 254
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !email.contains(char::is_whitespace)
        });
    if valid {
        Ok(email)
    } else {
        Err(Error::invalid_field("email", "Please provide a valid email address"))
    }
}

/// Rounds to one decimal place.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_percentage_bounds() {
        assert_eq!(percentage(0.0, 0.0), 0);
        assert_eq!(percentage(5.0, 0.0), 0);
        assert_eq!(percentage(1.0, 3.0), 33);
        assert_eq!(percentage(2.0, 3.0), 67);
        assert_eq!(percentage(3.0, 3.0), 100);
        assert_eq!(percentage(4.0, 3.0), 100);
        assert_eq!(percentage(-1.0, 3.0), 0);
        assert_eq!(percentage(f64::NAN, 3.0), 0);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Priya@Example.COM ").ok().as_deref(),
            Some("priya@example.com")
        );
        for bad in ["", "priya", "@example.com", "priya@", "priya@example", "a b@c.com", "a@b@c.com"] {
            assert!(normalize_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(3.66), 3.7);
        assert_eq!(round_to_tenth(4.0), 4.0);
        assert_eq!(round_to_tenth(0.04), 0.0);
    }
}
