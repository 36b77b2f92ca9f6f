//! HTTP session for the rental portal

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::USER_AGENT;
use reqwest::{StatusCode, Url};
use std::sync::Arc;
use std::time::Duration;

use super::forms::{
    classify_reservation_response, discovery_form, login_form, reservation_form, Form,
};
use super::Portal;
use crate::config::{Credentials, PortalConfig};
use crate::error::ReservationError;
use crate::models::{ReservationOutcome, ReservationToken, WeekdayGroup};

/// Endpoint paths relative to the portal origin
const LOGIN_PATH: &str = "/bbs/login_check.php";
const DISCOVERY_PATH: &str = "/page/rent/ajax.rent.od.proc.php";
const CART_PATH: &str = "/page/rent/_inc.cart.list.proc.php";

/// Cookie that marks an authenticated session
pub const SESSION_COOKIE: &str = "PHPSESSID";

/// Characters of an unrecognized cart response kept for diagnosis
const BODY_PREVIEW_CHARS: usize = 200;

/// Cookie-persisting session against the portal
pub struct PortalClient {
    client: reqwest::Client,
    jar: Arc<Jar>,
    origin: Url,
    config: PortalConfig,
}

impl PortalClient {
    /// Create the session. TLS verification follows `config.accept_invalid_certs`.
    pub fn new(config: PortalConfig) -> Result<Self, ReservationError> {
        let origin = Url::parse(&config.base_url).map_err(|e| {
            ReservationError::Config(format!("invalid base URL {:?}: {}", config.base_url, e))
        })?;

        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            jar,
            origin,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Whether the jar holds a session cookie for the portal origin
    pub fn has_session_cookie(&self) -> bool {
        let prefix = format!("{}=", SESSION_COOKIE);
        self.jar
            .cookies(&self.origin)
            .and_then(|header| header.to_str().map(str::to_owned).ok())
            .map(|cookies| cookies.split(';').any(|c| c.trim().starts_with(&prefix)))
            .unwrap_or(false)
    }

    async fn post_form(
        &self,
        path: &str,
        form: &Form,
        user_agent: Option<&str>,
    ) -> Result<(StatusCode, String), ReservationError> {
        let url = self.url(path);
        tracing::debug!(url = %url, fields = ?form.iter().map(|(k, _)| *k).collect::<Vec<_>>(), "POST");

        let mut request = self.client.post(&url).form(form);
        if let Some(agent) = user_agent {
            request = request.header(USER_AGENT, agent);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl Portal for PortalClient {
    async fn login(&self, credentials: &Credentials) -> Result<(), ReservationError> {
        let form = login_form(credentials, &self.config.base_url);
        tracing::info!("Logging in as {:?}", credentials.username);

        let (status, _) = self.post_form(LOGIN_PATH, &form, None).await?;
        if status != StatusCode::OK {
            return Err(ReservationError::Auth(format!(
                "HTTP status {}",
                status.as_u16()
            )));
        }
        if !self.has_session_cookie() {
            return Err(ReservationError::Auth(format!(
                "no {} cookie received",
                SESSION_COOKIE
            )));
        }
        Ok(())
    }

    async fn discover(
        &self,
        date: NaiveDate,
        group: WeekdayGroup,
    ) -> Result<String, ReservationError> {
        let form = discovery_form(date, group);
        tracing::info!(group = %group, %date, "Querying slot grid");

        let (status, body) = self.post_form(DISCOVERY_PATH, &form, None).await?;
        if status != StatusCode::OK {
            return Err(ReservationError::Status {
                status: status.as_u16(),
                url: self.url(DISCOVERY_PATH),
            });
        }
        Ok(body)
    }

    async fn reserve(
        &self,
        month: u32,
        token: &ReservationToken,
    ) -> Result<ReservationOutcome, ReservationError> {
        let form = reservation_form(month, token);
        let (status, body) = self
            .post_form(CART_PATH, &form, Some(self.config.user_agent.as_str()))
            .await?;

        if status != StatusCode::OK {
            return Err(ReservationError::Status {
                status: status.as_u16(),
                url: self.url(CART_PATH),
            });
        }

        let outcome = classify_reservation_response(&body);
        if outcome == ReservationOutcome::Failed {
            let preview: String = body.trim().chars().take(BODY_PREVIEW_CHARS).collect();
            tracing::warn!(token = %token.identifier, "Unrecognized cart response: {}", preview);
        }
        Ok(outcome)
    }
}
