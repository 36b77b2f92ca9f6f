//! Reservation run state machine
//!
//! One run walks `Init → Authenticated → Discovering → Building →
//! Submitting → Done`. A login failure, or any weekday group ending up
//! without identifiers, moves the run to `Failed` before anything is
//! submitted. Submissions are strictly sequential with a fixed pause
//! between them; a failed submission is counted and the run moves on.

use std::time::Duration;

use crate::config::{Credentials, DiscoveryLayout};
use crate::core::calendar::first_day_of_month;
use crate::core::{build_month, first_weekday_of_month, try_derive_family};
use crate::error::ReservationError;
use crate::models::{FamilyMember, RunSummary, WeekdayGroup};
use crate::notify::{Dispatcher, RunEvent};
use crate::portal::{extract_with_policy, Portal, TablePolicy};

/// Pause between consecutive cart submissions
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Authenticated,
    Discovering,
    Building,
    Submitting,
    Done,
    Failed,
}

/// Inputs for one run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub year: i32,
    pub month: u32,
    pub credentials: Credentials,
    pub layout: DiscoveryLayout,
    pub table_policy: TablePolicy,
    pub submit_delay: Duration,
}

impl RunSettings {
    pub fn new(year: i32, month: u32, credentials: Credentials) -> Self {
        Self {
            year,
            month,
            credentials,
            layout: DiscoveryLayout::default(),
            table_policy: TablePolicy::default(),
            submit_delay: DEFAULT_SUBMIT_DELAY,
        }
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }
}

/// Drives one reservation run against a single authenticated session
pub struct Orchestrator<'a, P: Portal + ?Sized> {
    portal: &'a P,
    dispatcher: &'a Dispatcher,
    settings: RunSettings,
    state: RunState,
}

impl<'a, P: Portal + ?Sized> Orchestrator<'a, P> {
    pub fn new(portal: &'a P, dispatcher: &'a Dispatcher, settings: RunSettings) -> Self {
        Self {
            portal,
            dispatcher,
            settings,
            state: RunState::Init,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!("State {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run to completion. `Ok` carries the submission counts; `Err` is
    /// returned only for the fatal cases.
    pub async fn run(&mut self) -> Result<RunSummary, ReservationError> {
        let (year, month) = (self.settings.year, self.settings.month);
        if first_day_of_month(year, month).is_none() {
            self.transition(RunState::Failed);
            return Err(ReservationError::InvalidMonth { year, month });
        }

        self.dispatcher.emit(RunEvent::Started { year, month }).await;

        // Init -> Authenticated
        if let Err(e) = self.portal.login(&self.settings.credentials).await {
            let err = match e {
                ReservationError::Auth(_) => e,
                other => ReservationError::Auth(other.to_string()),
            };
            self.dispatcher
                .emit(RunEvent::LoginFailed {
                    reason: err.to_string(),
                })
                .await;
            self.transition(RunState::Failed);
            self.dispatcher
                .emit(RunEvent::Aborted {
                    reason: "login failed".to_string(),
                })
                .await;
            return Err(err);
        }
        self.transition(RunState::Authenticated);
        self.dispatcher.emit(RunEvent::LoginSucceeded).await;

        // Authenticated -> Discovering: every group is tried independently
        self.transition(RunState::Discovering);
        let mut summary = RunSummary::new(year, month);
        let mut missing = Vec::new();

        for group in WeekdayGroup::ALL {
            match self.discover_family(group).await {
                Ok(family) => {
                    self.dispatcher
                        .emit(RunEvent::FamilyDiscovered {
                            group,
                            family: family.clone(),
                        })
                        .await;
                    summary.families.push((group, family));
                }
                Err(e) => {
                    self.dispatcher
                        .emit(RunEvent::DiscoveryFailed {
                            group,
                            reason: e.to_string(),
                        })
                        .await;
                    missing.push(group);
                }
            }
        }

        // Discovering -> Building, only with data for every group
        self.transition(RunState::Building);
        if !missing.is_empty() {
            return Err(self.abort(ReservationError::IncompleteDiscovery(missing)).await);
        }

        let families = &summary.families;
        let tokens = build_month(
            year,
            month,
            family_of(families, WeekdayGroup::Sunday),
            family_of(families, WeekdayGroup::Wednesday),
            family_of(families, WeekdayGroup::Saturday),
        );
        if tokens.is_empty() {
            let err = ReservationError::IncompleteDiscovery(WeekdayGroup::ALL.to_vec());
            return Err(self.abort(err).await);
        }

        // Building -> Submitting
        let total = tokens.len();
        self.dispatcher
            .emit(RunEvent::TokensBuilt { count: total })
            .await;
        self.transition(RunState::Submitting);
        for (i, token) in tokens.into_iter().enumerate() {
            if i > 0 && !self.settings.submit_delay.is_zero() {
                tokio::time::sleep(self.settings.submit_delay).await;
            }

            let index = i + 1;
            tracing::debug!("[{:2}/{}] Submitting {}", index, total, token.identifier);
            match self.portal.reserve(month, &token).await {
                Ok(outcome) => {
                    summary.record(Some(outcome));
                    self.dispatcher
                        .emit(RunEvent::ReservationAttempted {
                            index,
                            total,
                            token,
                            outcome,
                        })
                        .await;
                }
                Err(e) => {
                    summary.record(None);
                    self.dispatcher
                        .emit(RunEvent::ReservationErrored {
                            index,
                            total,
                            token,
                            reason: e.to_string(),
                        })
                        .await;
                }
            }
        }

        // Submitting -> Done
        self.dispatcher
            .emit(RunEvent::SubmissionComplete {
                attempted: summary.attempted,
                succeeded: summary.succeeded(),
            })
            .await;
        self.transition(RunState::Done);
        self.dispatcher.emit(RunEvent::Finished { year, month }).await;

        Ok(summary)
    }

    /// Discover the sample identifier for one group and expand it
    async fn discover_family(
        &self,
        group: WeekdayGroup,
    ) -> Result<Vec<FamilyMember>, ReservationError> {
        let (year, month) = (self.settings.year, self.settings.month);
        let target = self.settings.layout.target(group).ok_or_else(|| {
            ReservationError::Config(format!("no discovery target for {}", group))
        })?;
        let anchor = first_weekday_of_month(year, month, group.weekday())
            .ok_or(ReservationError::InvalidMonth { year, month })?;

        let html = self.portal.discover(anchor, group).await?;
        let sample = extract_with_policy(&html, &self.settings.table_policy, target.row, target.col)?;
        tracing::info!(
            group = %group,
            row = target.row,
            col = target.col,
            "Extracted sample identifier {}",
            sample
        );

        try_derive_family(&sample, group.slot_count())
    }

    async fn abort(&mut self, err: ReservationError) -> ReservationError {
        self.transition(RunState::Failed);
        self.dispatcher
            .emit(RunEvent::Aborted {
                reason: err.to_string(),
            })
            .await;
        self.dispatcher
            .emit(RunEvent::Finished {
                year: self.settings.year,
                month: self.settings.month,
            })
            .await;
        err
    }
}

fn family_of(
    families: &[(WeekdayGroup, Vec<FamilyMember>)],
    group: WeekdayGroup,
) -> &[FamilyMember] {
    families
        .iter()
        .find(|(g, _)| *g == group)
        .map(|(_, f)| f.as_slice())
        .unwrap_or(&[])
}
