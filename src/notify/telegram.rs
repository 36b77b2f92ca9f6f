//! Telegram Bot API sink

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{Notifier, RunEvent};
use crate::config::TelegramConfig;
use crate::error::ReservationError;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Sends each event as an HTML-formatted chat message
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, ReservationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
            config,
        })
    }

    /// Point at a different Bot API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }

    /// Message body: bold headline followed by the escaped detail
    pub fn render(event: &RunEvent) -> String {
        format!(
            "<b>{}:</b> {}",
            escape_html(event.headline()),
            escape_html(&event.detail())
        )
    }
}

/// Escape the characters Telegram's HTML parse mode reserves
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn notify(&self, event: &RunEvent) -> Result<(), ReservationError> {
        let text = Self::render(event);
        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text: &text,
            parse_mode: "HTML",
        };

        // without_url keeps the bot token out of error messages
        self.client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ReservationError::Notification(e.without_url().to_string()))?;

        tracing::debug!("Telegram message sent: {}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> TelegramNotifier {
        TelegramNotifier::new(TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "42".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            notifier().endpoint(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        assert_eq!(
            notifier().with_api_base("http://localhost:9000/").endpoint(),
            "http://localhost:9000/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html("예약 성공"), "예약 성공");
    }

    #[test]
    fn test_render() {
        let event = RunEvent::LoginFailed {
            reason: "HTTP status <500>".to_string(),
        };
        assert_eq!(
            TelegramNotifier::render(&event),
            "<b>Login failed:</b> HTTP status &lt;500&gt;"
        );
    }

    #[test]
    fn test_payload_shape() {
        let payload = SendMessage {
            chat_id: "42",
            text: "<b>Run finished:</b> 2025-08",
            parse_mode: "HTML",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["chat_id"], "42");
        assert_eq!(json["parse_mode"], "HTML");
    }
}
