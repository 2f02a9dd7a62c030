//! Coupon validity: `<positive integer><d|h|m>` parsing and derived expiry.
//!
//! The validity string is validated once at creation time; expiry is always
//! recomputed from `created_at` on each check, never stored.

use chrono::{Duration, NaiveDateTime};

use crate::entity::coupon;
use crate::error::ApiError;

/// Parses a validity string into a duration. `7d`, `12h` and `30m` are
/// valid; anything else (bad suffix, non-positive or non-numeric magnitude)
/// is a creation-time `BadRequest`.
pub fn parse_validity(validity: &str) -> Result<Duration, ApiError> {
    if validity.is_empty() || !validity.is_ascii() {
        return Err(ApiError::bad_request(format!(
            "Invalid coupon validity: {validity}"
        )));
    }

    let (magnitude, unit) = validity.split_at(validity.len() - 1);
    let value: i64 = magnitude
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid coupon validity: {validity}")))?;

    if value <= 0 {
        return Err(ApiError::bad_request(format!(
            "Coupon validity must be positive: {validity}"
        )));
    }

    match unit {
        "d" => Ok(Duration::days(value)),
        "h" => Ok(Duration::hours(value)),
        "m" => Ok(Duration::minutes(value)),
        _ => Err(ApiError::bad_request(format!(
            "Invalid coupon validity unit: {validity} (expected d, h or m)"
        ))),
    }
}

/// Whether a coupon created at `created_at` with the given validity string
/// is still within its window at `now`. A validity that fails to parse
/// (possible only for pre-validation legacy rows) counts as expired.
pub fn is_valid_at(created_at: NaiveDateTime, validity: &str, now: NaiveDateTime) -> bool {
    match parse_validity(validity) {
        Ok(window) => now <= created_at + window,
        Err(_) => false,
    }
}

/// The derived expiry instant, for display on creation responses.
pub fn expires_at(created_at: NaiveDateTime, validity: &str) -> Result<NaiveDateTime, ApiError> {
    Ok(created_at + parse_validity(validity)?)
}

/// Redemption gate, checked in a fixed order so each rejection is a
/// distinct failure: inactive/expired, already redeemed by this user,
/// exhausted counter. The coupon itself is untouched on rejection.
pub fn check_redemption(
    coupon: &coupon::Model,
    user_id: &str,
    now: NaiveDateTime,
) -> Result<(), ApiError> {
    if !coupon.is_active || !is_valid_at(coupon.created_at, &coupon.validity, now) {
        return Err(ApiError::bad_request("Coupon expired or inactive"));
    }
    if coupon.applied.0.iter().any(|id| id == user_id) {
        return Err(ApiError::bad_request("Coupon already redeemed"));
    }
    if coupon.count <= 0 {
        return Err(ApiError::bad_request("Coupon usage limit reached"));
    }
    Ok(())
}
