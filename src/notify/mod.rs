//! Run events and notification sinks
//!
//! The orchestrator emits [`RunEvent`]s through a [`Dispatcher`], which fans
//! them out to every registered [`Notifier`]. Sink failures are logged and
//! dropped; they never change the run.

mod telegram;

pub use telegram::{escape_html, TelegramNotifier};

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::Level;

use crate::config::Config;
use crate::error::ReservationError;
use crate::models::{FamilyMember, ReservationOutcome, ReservationToken, WeekdayGroup};

/// Something that happened during a reservation run
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Started {
        year: i32,
        month: u32,
    },
    /// Entry guard refused to run
    NotFirstMonday {
        date: NaiveDate,
    },
    LoginSucceeded,
    LoginFailed {
        reason: String,
    },
    FamilyDiscovered {
        group: WeekdayGroup,
        family: Vec<FamilyMember>,
    },
    DiscoveryFailed {
        group: WeekdayGroup,
        reason: String,
    },
    Aborted {
        reason: String,
    },
    /// Month built; submissions start next
    TokensBuilt {
        count: usize,
    },
    ReservationAttempted {
        index: usize,
        total: usize,
        token: ReservationToken,
        outcome: ReservationOutcome,
    },
    ReservationErrored {
        index: usize,
        total: usize,
        token: ReservationToken,
        reason: String,
    },
    SubmissionComplete {
        attempted: usize,
        succeeded: usize,
    },
    Finished {
        year: i32,
        month: u32,
    },
}

impl RunEvent {
    pub fn level(&self) -> Level {
        match self {
            RunEvent::LoginFailed { .. } | RunEvent::Aborted { .. } => Level::ERROR,
            RunEvent::DiscoveryFailed { .. } | RunEvent::ReservationErrored { .. } => Level::WARN,
            RunEvent::ReservationAttempted { outcome, .. } => match outcome {
                ReservationOutcome::Accepted => Level::INFO,
                ReservationOutcome::AcceptedWithExclusion | ReservationOutcome::Failed => {
                    Level::WARN
                }
            },
            _ => Level::INFO,
        }
    }

    /// Short title for the event
    pub fn headline(&self) -> &'static str {
        match self {
            RunEvent::Started { .. } => "Reservation run started",
            RunEvent::NotFirstMonday { .. } => "Run skipped",
            RunEvent::LoginSucceeded => "Login succeeded",
            RunEvent::LoginFailed { .. } => "Login failed",
            RunEvent::FamilyDiscovered { .. } => "Slots discovered",
            RunEvent::DiscoveryFailed { .. } => "Discovery failed",
            RunEvent::Aborted { .. } => "Run aborted",
            RunEvent::TokensBuilt { .. } => "Reservations queued",
            RunEvent::ReservationAttempted { outcome, .. } => match outcome {
                ReservationOutcome::Accepted => "Reserved",
                ReservationOutcome::AcceptedWithExclusion => "Already taken",
                ReservationOutcome::Failed => "Reservation failed",
            },
            RunEvent::ReservationErrored { .. } => "Reservation request failed",
            RunEvent::SubmissionComplete { .. } => "Reservations complete",
            RunEvent::Finished { .. } => "Run finished",
        }
    }

    /// Plain-text detail line
    pub fn detail(&self) -> String {
        match self {
            RunEvent::Started { year, month } | RunEvent::Finished { year, month } => {
                format!("{}-{:02}", year, month)
            }
            RunEvent::NotFirstMonday { date } => {
                format!("{} is not the first Monday of the month", date)
            }
            RunEvent::LoginSucceeded => "session cookie issued".to_string(),
            RunEvent::LoginFailed { reason } | RunEvent::Aborted { reason } => reason.clone(),
            RunEvent::FamilyDiscovered { group, family } => format!(
                "{}: {}",
                group,
                family
                    .iter()
                    .map(|id| id.prefix.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            RunEvent::DiscoveryFailed { group, reason } => format!("{}: {}", group, reason),
            RunEvent::TokensBuilt { count } => format!("{} tokens to submit", count),
            RunEvent::ReservationAttempted {
                index,
                total,
                token,
                ..
            } => format!("[{}/{}] {}", index, total, token.identifier),
            RunEvent::ReservationErrored {
                index,
                total,
                token,
                reason,
            } => format!("[{}/{}] {} - {}", index, total, token.identifier, reason),
            RunEvent::SubmissionComplete {
                attempted,
                succeeded,
            } => format!("{} of {} succeeded", succeeded, attempted),
        }
    }
}

/// A subscriber for run events
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, event: &RunEvent) -> Result<(), ReservationError>;
}

/// Console sink: renders events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, event: &RunEvent) -> Result<(), ReservationError> {
        let (headline, detail) = (event.headline(), event.detail());
        let level = event.level();
        if level == Level::ERROR {
            tracing::error!("{}: {}", headline, detail);
        } else if level == Level::WARN {
            tracing::warn!("{}: {}", headline, detail);
        } else {
            tracing::info!("{}: {}", headline, detail);
        }
        Ok(())
    }
}

/// Fans events out to every registered sink
#[derive(Default)]
pub struct Dispatcher {
    sinks: Vec<Box<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink<N: Notifier + 'static>(mut self, sink: N) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Console logging, plus Telegram when configured
    pub fn from_config(config: &Config) -> Result<Self, ReservationError> {
        let mut dispatcher = Self::new().with_sink(LogNotifier);
        if let Some(telegram) = &config.telegram {
            dispatcher = dispatcher.with_sink(TelegramNotifier::new(telegram.clone())?);
        }
        Ok(dispatcher)
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Deliver to every sink; failures are logged and swallowed
    pub async fn emit(&self, event: RunEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.notify(&event).await {
                tracing::warn!(sink = sink.name(), "Notification dropped: {}", e);
            }
        }
    }
}
