//! Identifier families
//!
//! The portal numbers the time slots of one weekday group consecutively,
//! so one discovered identifier is enough to derive the rest of the run.

use crate::error::ReservationError;
use crate::models::FamilyMember;

/// Derive `count` members starting at `sample`'s prefix.
///
/// Only the numeric prefix increments. The sample's category and date are
/// carried as read; a sample fails only when it is empty, has fewer than
/// two separators, or its prefix is not a non-negative integer.
pub fn try_derive_family(
    sample: &str,
    count: usize,
) -> Result<Vec<FamilyMember>, ReservationError> {
    let base: FamilyMember = sample.parse()?;

    (0..count as u64)
        .map(|i| {
            base.offset(i)
                .ok_or_else(|| ReservationError::MalformedIdentifier {
                    value: sample.to_string(),
                    reason: "prefix overflows".to_string(),
                })
        })
        .collect()
}

/// Like [`try_derive_family`], but a malformed sample yields an empty
/// family. Callers treat empty as "group unavailable".
///
/// # Examples
/// ```
/// use court_reserve::core::family::derive_family;
/// let family = derive_family("250100||4||20250803", 2);
/// assert_eq!(family[1].to_string(), "250101||4||20250803");
/// assert!(derive_family("bad||x", 2).is_empty());
/// ```
pub fn derive_family(sample: &str, count: usize) -> Vec<FamilyMember> {
    match try_derive_family(sample, count) {
        Ok(family) => {
            tracing::debug!(
                sample,
                prefixes = ?family.iter().map(|m| m.prefix).collect::<Vec<_>>(),
                "Derived identifier family"
            );
            family
        }
        Err(e) => {
            tracing::warn!("Could not derive family: {}", e);
            Vec::new()
        }
    }
}
