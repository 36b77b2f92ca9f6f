//! Monthly reservation token builder

use crate::core::calendar::weekday_occurrences;
use crate::models::{CourtIdentifier, FamilyMember, ReservationToken, WeekdayGroup};

/// Build every reservation token for the month.
///
/// For each occurrence of a group's weekday, the first `slot_count`
/// members of that group's family are bound to the date with the group's
/// fixed category code. A family shorter than its slot count contributes
/// no tokens; the other groups are unaffected.
///
/// Output is ordered by date, then by slot index.
pub fn build_month(
    year: i32,
    month: u32,
    sunday: &[FamilyMember],
    wednesday: &[FamilyMember],
    saturday: &[FamilyMember],
) -> Vec<ReservationToken> {
    let family_for = |group: WeekdayGroup| match group {
        WeekdayGroup::Sunday => sunday,
        WeekdayGroup::Wednesday => wednesday,
        WeekdayGroup::Saturday => saturday,
    };

    for group in WeekdayGroup::ALL {
        let have = family_for(group).len();
        if have < group.slot_count() {
            tracing::warn!(
                "{} family too short ({} < {}), skipping {} reservations",
                group,
                have,
                group.slot_count(),
                group
            );
        }
    }

    let weekdays: Vec<_> = WeekdayGroup::ALL.iter().map(|g| g.weekday()).collect();
    let mut tokens = Vec::new();

    for (date, weekday) in weekday_occurrences(year, month, &weekdays) {
        let Some(group) = WeekdayGroup::from_weekday(weekday) else {
            continue;
        };
        let family = family_for(group);
        if family.len() < group.slot_count() {
            continue;
        }

        tracing::debug!("Building {} slots for {}", group, date);
        for (slot, member) in family.iter().take(group.slot_count()).enumerate() {
            tokens.push(ReservationToken {
                identifier: CourtIdentifier::new(member.prefix, group.category(), date),
                group,
                slot,
            });
        }
    }

    tracing::info!("Built {} reservation tokens for {}-{:02}", tokens.len(), year, month);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::family::derive_family;
    use chrono::{Datelike, NaiveDate, Weekday};

    fn families() -> (Vec<FamilyMember>, Vec<FamilyMember>, Vec<FamilyMember>) {
        (
            derive_family("250100||4||20260104", 4),
            derive_family("300500||6||20260107", 2),
            derive_family("280300||5||20260103", 2),
        )
    }

    #[test]
    fn test_full_month_token_count() {
        // January 2026: 4 Sundays, 4 Wednesdays, 5 Saturdays
        let (sun, wed, sat) = families();
        let tokens = build_month(2026, 1, &sun, &wed, &sat);
        assert_eq!(tokens.len(), 4 * 4 + 2 * 4 + 2 * 5);
    }

    #[test]
    fn test_tokens_ordered_by_date_then_slot() {
        let (sun, wed, sat) = families();
        let tokens = build_month(2026, 1, &sun, &wed, &sat);

        let wire: Vec<String> = tokens.iter().take(8).map(|t| t.wire_value()).collect();
        assert_eq!(
            wire,
            vec![
                "280300||5||20260103",
                "280301||5||20260103",
                "250100||4||20260104",
                "250101||4||20260104",
                "250102||4||20260104",
                "250103||4||20260104",
                "300500||6||20260107",
                "300501||6||20260107",
            ]
        );

        assert!(tokens
            .windows(2)
            .all(|w| (w[0].date(), w[0].slot) < (w[1].date(), w[1].slot)));
    }

    #[test]
    fn test_category_follows_weekday() {
        let (sun, wed, sat) = families();
        for token in build_month(2026, 1, &sun, &wed, &sat) {
            assert_eq!(token.identifier.category, token.group.category());
            assert_eq!(token.date().weekday(), token.group.weekday());
            assert_eq!(token.date().month(), 1);
        }
    }

    #[test]
    fn test_date_rebound_from_family_sample() {
        let (sun, wed, sat) = families();
        let tokens = build_month(2026, 1, &sun, &wed, &sat);
        let last = tokens.last().unwrap();
        assert_eq!(last.date(), NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        assert_eq!(last.wire_value(), "280301||5||20260131");
    }

    #[test]
    fn test_undersized_wednesday_family() {
        let (sun, wed, sat) = families();
        let tokens = build_month(2026, 1, &sun, &wed[..1], &sat);
        assert_eq!(tokens.len(), 4 * 4 + 2 * 5);
        assert!(tokens.iter().all(|t| t.group != WeekdayGroup::Wednesday));
        assert_eq!(
            tokens.iter().filter(|t| t.group == WeekdayGroup::Sunday).count(),
            16
        );
    }

    #[test]
    fn test_longer_families_are_truncated() {
        let sun = derive_family("250100||4||20260104", 6);
        let (_, wed, sat) = families();
        let tokens = build_month(2026, 1, &sun, &wed, &sat);
        assert!(tokens
            .iter()
            .filter(|t| t.group == WeekdayGroup::Sunday)
            .all(|t| t.identifier.prefix <= 250103));
    }

    #[test]
    fn test_empty_families() {
        assert!(build_month(2026, 1, &[], &[], &[]).is_empty());
    }

    #[test]
    fn test_sample_tail_is_replaced() {
        let sun = derive_family("250100||A||2025-08-03", 4);
        let tokens = build_month(2025, 8, &sun, &[], &[]);
        assert_eq!(tokens.len(), 4 * 5);
        assert_eq!(tokens[0].wire_value(), "250100||4||20250803");
        assert_eq!(tokens[19].wire_value(), "250103||4||20250831");
    }

    #[test]
    fn test_wednesday_pairs_in_august_2025() {
        let wed = derive_family("300500||6||20250806", 2);
        let tokens = build_month(2025, 8, &[], &wed, &[]);
        let dates: Vec<_> = tokens.iter().map(|t| t.date().day()).collect();
        assert_eq!(dates, vec![6, 6, 13, 13, 20, 20, 27, 27]);
        assert!(tokens.iter().all(|t| t.date().weekday() == Weekday::Wed));
    }
}
