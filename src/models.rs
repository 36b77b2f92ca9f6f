use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReservationError;

/// Separator between the fields of a court identifier
pub const IDENTIFIER_SEPARATOR: &str = "||";

/// Date format embedded in court identifiers
pub const IDENTIFIER_DATE_FORMAT: &str = "%Y%m%d";

/// Weekday groups that get reserved every month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeekdayGroup {
    Sunday,
    Wednesday,
    Saturday,
}

impl WeekdayGroup {
    /// All groups, in discovery order
    pub const ALL: [WeekdayGroup; 3] = [
        WeekdayGroup::Sunday,
        WeekdayGroup::Wednesday,
        WeekdayGroup::Saturday,
    ];

    pub fn weekday(self) -> Weekday {
        match self {
            WeekdayGroup::Sunday => Weekday::Sun,
            WeekdayGroup::Wednesday => Weekday::Wed,
            WeekdayGroup::Saturday => Weekday::Sat,
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Option<Self> {
        match weekday {
            Weekday::Sun => Some(WeekdayGroup::Sunday),
            Weekday::Wed => Some(WeekdayGroup::Wednesday),
            Weekday::Sat => Some(WeekdayGroup::Saturday),
            _ => None,
        }
    }

    /// `week_chk` value sent with the discovery query
    pub fn week_code(self) -> u8 {
        match self {
            WeekdayGroup::Sunday => 0,
            WeekdayGroup::Wednesday => 3,
            WeekdayGroup::Saturday => 6,
        }
    }

    /// Category tag the portal expects inside this group's identifiers
    pub fn category(self) -> CategoryCode {
        match self {
            WeekdayGroup::Sunday => CategoryCode::SUNDAY,
            WeekdayGroup::Wednesday => CategoryCode::WEDNESDAY,
            WeekdayGroup::Saturday => CategoryCode::SATURDAY,
        }
    }

    /// Number of consecutive time slots reserved per occurrence
    pub fn slot_count(self) -> usize {
        match self {
            WeekdayGroup::Sunday => 4,
            WeekdayGroup::Wednesday => 2,
            WeekdayGroup::Saturday => 2,
        }
    }
}

impl fmt::Display for WeekdayGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeekdayGroup::Sunday => "Sunday",
            WeekdayGroup::Wednesday => "Wednesday",
            WeekdayGroup::Saturday => "Saturday",
        };
        f.write_str(name)
    }
}

/// Site-internal schema tag embedded in a court identifier.
///
/// This is not a time of day. It is constant across every slot of a
/// weekday group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryCode(pub u16);

impl CategoryCode {
    pub const SUNDAY: CategoryCode = CategoryCode(4);
    pub const SATURDAY: CategoryCode = CategoryCode(5);
    pub const WEDNESDAY: CategoryCode = CategoryCode(6);
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque slot identifier of the form `<prefix>||<category>||<YYYYMMDD>`
///
/// Kept structured internally and only rendered to the wire format at
/// the submission boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourtIdentifier {
    pub prefix: u64,
    pub category: CategoryCode,
    pub date: NaiveDate,
}

impl CourtIdentifier {
    pub fn new(prefix: u64, category: CategoryCode, date: NaiveDate) -> Self {
        Self {
            prefix,
            category,
            date,
        }
    }

    /// Same category and date, prefix shifted by `offset`
    pub fn offset(&self, offset: u64) -> Option<Self> {
        Some(Self {
            prefix: self.prefix.checked_add(offset)?,
            ..self.clone()
        })
    }

    /// Wire representation sent to the portal
    pub fn wire_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CourtIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.prefix,
            self.category,
            self.date.format(IDENTIFIER_DATE_FORMAT),
            sep = IDENTIFIER_SEPARATOR
        )
    }
}

impl FromStr for CourtIdentifier {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| ReservationError::MalformedIdentifier {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        if s.trim().is_empty() {
            return Err(malformed("empty value"));
        }

        let parts: Vec<&str> = s.trim().splitn(3, IDENTIFIER_SEPARATOR).collect();
        if parts.len() < 3 {
            return Err(malformed("expected two '||' separators"));
        }

        let prefix = parts[0]
            .parse::<u64>()
            .map_err(|_| malformed("prefix is not a non-negative integer"))?;
        let category = parts[1]
            .parse::<u16>()
            .map(CategoryCode)
            .map_err(|_| malformed("category is not an integer"))?;
        let date = NaiveDate::parse_from_str(parts[2], IDENTIFIER_DATE_FORMAT)
            .map_err(|_| malformed("date is not YYYYMMDD"))?;

        Ok(Self::new(prefix, category, date))
    }
}

impl Serialize for CourtIdentifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One member of a discovered family, as read from the portal.
///
/// Only the numeric prefix is interpreted. Category and date are kept
/// verbatim; the month builder replaces both with the group's own values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FamilyMember {
    pub prefix: u64,
    pub category: String,
    pub date: String,
}

impl FamilyMember {
    /// Same tail, prefix shifted by `offset`
    pub fn offset(&self, offset: u64) -> Option<Self> {
        Some(Self {
            prefix: self.prefix.checked_add(offset)?,
            ..self.clone()
        })
    }
}

impl fmt::Display for FamilyMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.prefix,
            self.category,
            self.date,
            sep = IDENTIFIER_SEPARATOR
        )
    }
}

impl FromStr for FamilyMember {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| ReservationError::MalformedIdentifier {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(malformed("empty value"));
        }

        let mut parts = trimmed.splitn(3, IDENTIFIER_SEPARATOR);
        let (Some(prefix), Some(category), Some(date)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed("expected two '||' separators"));
        };

        let prefix = prefix
            .parse::<u64>()
            .map_err(|_| malformed("prefix is not a non-negative integer"))?;

        Ok(Self {
            prefix,
            category: category.to_string(),
            date: date.to_string(),
        })
    }
}

impl Serialize for FamilyMember {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One identifier bound to one calendar occurrence, submitted once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationToken {
    pub identifier: CourtIdentifier,
    pub group: WeekdayGroup,
    /// Slot index within the group's family (0 = earliest)
    pub slot: usize,
}

impl ReservationToken {
    pub fn date(&self) -> NaiveDate {
        self.identifier.date
    }

    pub fn wire_value(&self) -> String {
        self.identifier.wire_value()
    }
}

/// Result of one reservation submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationOutcome {
    /// Added to the cart
    Accepted,
    /// Added, but the portal excluded items already taken by someone else
    AcceptedWithExclusion,
    /// Unrecognized response body
    Failed,
}

impl ReservationOutcome {
    pub fn is_success(self) -> bool {
        matches!(
            self,
            ReservationOutcome::Accepted | ReservationOutcome::AcceptedWithExclusion
        )
    }
}

/// Aggregated counts for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub year: i32,
    pub month: u32,
    /// Discovered families keyed by group
    pub families: Vec<(WeekdayGroup, Vec<FamilyMember>)>,
    pub attempted: usize,
    pub accepted: usize,
    pub accepted_with_exclusion: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            ..Default::default()
        }
    }

    pub fn succeeded(&self) -> usize {
        self.accepted + self.accepted_with_exclusion
    }

    /// Record one submission; `None` means the request itself errored
    pub fn record(&mut self, outcome: Option<ReservationOutcome>) {
        self.attempted += 1;
        match outcome {
            Some(ReservationOutcome::Accepted) => self.accepted += 1,
            Some(ReservationOutcome::AcceptedWithExclusion) => self.accepted_with_exclusion += 1,
            Some(ReservationOutcome::Failed) | None => self.failed += 1,
        }
    }
}
