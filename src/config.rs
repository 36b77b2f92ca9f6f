//! Runtime configuration
//!
//! Secrets come from the environment (a `.env` file is loaded first when
//! present). Portal layout assumptions live here as data.

use crate::error::ReservationError;
use crate::models::WeekdayGroup;

/// Default portal origin
pub const DEFAULT_BASE_URL: &str = "https://jnrent2.jungnangimc.or.kr";

/// Browser identity attached to cart submissions
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Portal login credentials
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Telegram bot settings; both values are required
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// HTTP session settings
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub base_url: String,
    /// User agent sent with cart submissions
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// The portal's certificate chain does not verify
    pub accept_invalid_certs: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            accept_invalid_certs: true,
        }
    }
}

/// Grid position (1-based) of the sample checkbox for one weekday group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryTarget {
    pub group: WeekdayGroup,
    pub row: usize,
    pub col: usize,
}

/// Where each group's sample identifier sits in the discovery grid.
///
/// These coordinates describe the portal's rendered layout and are not
/// validated beyond the extracted value parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryLayout {
    pub targets: Vec<DiscoveryTarget>,
}

impl Default for DiscoveryLayout {
    fn default() -> Self {
        Self {
            targets: vec![
                DiscoveryTarget {
                    group: WeekdayGroup::Sunday,
                    row: 2,
                    col: 4,
                },
                DiscoveryTarget {
                    group: WeekdayGroup::Wednesday,
                    row: 16,
                    col: 6,
                },
                DiscoveryTarget {
                    group: WeekdayGroup::Saturday,
                    row: 14,
                    col: 5,
                },
            ],
        }
    }
}

impl DiscoveryLayout {
    pub fn target(&self, group: WeekdayGroup) -> Option<DiscoveryTarget> {
        self.targets.iter().copied().find(|t| t.group == group)
    }
}

/// Process configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub credentials: Credentials,
    pub telegram: Option<TelegramConfig>,
    pub portal: PortalConfig,
}

impl Config {
    /// Load from the process environment, reading `.env` first
    pub fn from_env() -> Result<Self, ReservationError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReservationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let credentials = Credentials {
            username: get("MB_ID").unwrap_or_default(),
            password: get("MB_PASSWORD").unwrap_or_default(),
        };
        if !credentials.is_complete() {
            // Startup continues; login will fail
            tracing::error!("MB_ID or MB_PASSWORD is not set");
        }

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => {
                tracing::info!("Telegram bot token or chat id not set, notifications disabled");
                None
            }
        };

        let mut portal = PortalConfig::default();
        if let Some(base_url) = get("PORTAL_BASE_URL") {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ReservationError::Config(format!(
                    "PORTAL_BASE_URL must be an http(s) URL, got {:?}",
                    base_url
                )));
            }
            portal.base_url = base_url.trim_end_matches('/').to_string();
        }

        Ok(Self {
            credentials,
            telegram,
            portal,
        })
    }
}
