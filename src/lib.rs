//! Court Reserve - monthly court reservations for the Jungnang rental portal
//!
//! This library provides:
//! - Calendar arithmetic for weekday anchors and month enumeration
//! - Slot identifier discovery from the portal's AJAX grid
//! - Identifier family derivation and month-long token building
//! - A sequential run orchestrator with pluggable notification sinks
//!
//! # Example
//!
//! ```
//! use court_reserve::core::{build_month, derive_family};
//!
//! let sunday = derive_family("250100||4||20260104", 4);
//! let wednesday = derive_family("300500||6||20260107", 2);
//! let saturday = derive_family("280300||5||20260103", 2);
//!
//! // January 2026: 4 Sundays, 4 Wednesdays, 5 Saturdays
//! let tokens = build_month(2026, 1, &sunday, &wednesday, &saturday);
//! assert_eq!(tokens.len(), 34);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod notify;
pub mod orchestrator;
pub mod portal;

// Re-export commonly used types
pub use config::{Config, Credentials, DiscoveryLayout, PortalConfig};
pub use error::{ExtractError, ReservationError};
pub use models::{
    CategoryCode, CourtIdentifier, FamilyMember, ReservationOutcome, ReservationToken, RunSummary,
    WeekdayGroup,
};
pub use notify::{Dispatcher, Notifier, RunEvent};
pub use orchestrator::{Orchestrator, RunSettings, RunState};
pub use portal::{Portal, PortalClient};
