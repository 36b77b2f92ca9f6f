//! Rental portal access
//!
//! [`Portal`] is the seam between the run orchestration and HTTP. The
//! production implementation is [`PortalClient`], a cookie-persisting
//! reqwest session created once per run.
//!
//! # Example
//!
//! ```no_run
//! use court_reserve::config::{Credentials, PortalConfig};
//! use court_reserve::portal::{extract_checkbox_value, Portal, PortalClient};
//! use court_reserve::WeekdayGroup;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let portal = PortalClient::new(PortalConfig::default())?;
//!     portal.login(&Credentials::default()).await?;
//!
//!     let date = chrono::NaiveDate::from_ymd_opt(2025, 8, 3).unwrap();
//!     let html = portal.discover(date, WeekdayGroup::Sunday).await?;
//!     println!("{}", extract_checkbox_value(&html, 2, 4)?);
//!     Ok(())
//! }
//! ```

mod client;
mod extract;
mod forms;

pub use client::{PortalClient, SESSION_COOKIE};
pub use extract::{extract_checkbox_value, extract_with_policy, TablePolicy};
pub use forms::{
    classify_reservation_response, discovery_form, login_form, reservation_form, ADDED_TO_CART,
    EXCLUDED_ITEMS, RESERVATION_FIELD,
};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::Credentials;
use crate::error::ReservationError;
use crate::models::{ReservationOutcome, ReservationToken, WeekdayGroup};

/// Operations the reservation run needs from the portal
#[async_trait]
pub trait Portal: Send + Sync {
    /// Authenticate the session. Success means a session cookie was issued.
    async fn login(&self, credentials: &Credentials) -> Result<(), ReservationError>;

    /// Fetch the slot grid for `group` on `date`; returns the HTML fragment
    async fn discover(
        &self,
        date: NaiveDate,
        group: WeekdayGroup,
    ) -> Result<String, ReservationError>;

    /// Submit one token to the cart
    async fn reserve(
        &self,
        month: u32,
        token: &ReservationToken,
    ) -> Result<ReservationOutcome, ReservationError>;
}
