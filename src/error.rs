//! Error types for the reservation run

use thiserror::Error;

use crate::models::WeekdayGroup;

/// Structural misses while locating a checkbox in a discovery response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("invalid table selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("no table found in document")]
    NoTable,

    #[error("row {index} out of range (table has {available} rows)")]
    RowOutOfRange { index: usize, available: usize },

    #[error("cell {index} out of range (row has {available} cells)")]
    CellOutOfRange { index: usize, available: usize },

    #[error("no checkbox input in target cell")]
    NoCheckbox,

    #[error("checkbox has no value attribute")]
    EmptyValue,
}

/// Reservation run errors
///
/// Only `Auth` and `IncompleteDiscovery` abort a run. Everything else is
/// contained to one weekday group, one token, or one notification.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("login failed: {0}")]
    Auth(String),

    #[error("discovery miss: {0}")]
    Discovery(#[from] ExtractError),

    #[error("malformed identifier {value:?}: {reason}")]
    MalformedIdentifier { value: String, reason: String },

    #[error("no usable identifiers for: {}", format_groups(.0))]
    IncompleteDiscovery(Vec<WeekdayGroup>),

    #[error("invalid target month {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("configuration error: {0}")]
    Config(String),
}

fn format_groups(groups: &[WeekdayGroup]) -> String {
    groups
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ReservationError {
    /// Whether this error ends the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ReservationError::Auth(_)
                | ReservationError::IncompleteDiscovery(_)
                | ReservationError::InvalidMonth { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_discovery_display() {
        let err = ReservationError::IncompleteDiscovery(vec![
            WeekdayGroup::Wednesday,
            WeekdayGroup::Saturday,
        ]);
        assert_eq!(
            err.to_string(),
            "no usable identifiers for: Wednesday, Saturday"
        );
    }

    #[test]
    fn test_extract_error_display() {
        let err = ReservationError::from(ExtractError::RowOutOfRange {
            index: 16,
            available: 3,
        });
        assert!(err.to_string().contains("row 16 out of range"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(ReservationError::Auth("missing cookie".to_string()).is_fatal());
        assert!(ReservationError::IncompleteDiscovery(vec![WeekdayGroup::Sunday]).is_fatal());
        assert!(!ReservationError::Notification("timeout".to_string()).is_fatal());
        assert!(!ReservationError::Status {
            status: 500,
            url: "https://example.com".to_string()
        }
        .is_fatal());
    }
}
