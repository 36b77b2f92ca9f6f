//! Form payloads for portal calls and reservation response classification

use chrono::{Datelike, NaiveDate};

use crate::config::Credentials;
use crate::models::{ReservationOutcome, ReservationToken, WeekdayGroup};

/// Fixed facility key sent with discovery and cart requests
const SCT_KEY: &str = "3";

/// Number of courts shown in the discovery grid
const COTE_CNT: &str = "8";

/// Repeated field carrying reservation identifiers
pub const RESERVATION_FIELD: &str = "cote_seq_arr[]";

/// Phrase in the cart response when items were added
pub const ADDED_TO_CART: &str = "장바구니에 담았습니다.";

/// Phrase in the cart response when some items were excluded (already taken)
pub const EXCLUDED_ITEMS: &str = "항목 제외하고";

pub type Form = Vec<(&'static str, String)>;

/// Login form. `return_url` is where the portal redirects after login.
pub fn login_form(credentials: &Credentials, return_url: &str) -> Form {
    vec![
        ("rtn_url", return_url.to_string()),
        ("rtn_par", String::new()),
        ("mb_id", credentials.username.clone()),
        ("mb_password", credentials.password.clone()),
    ]
}

/// Discovery query for one weekday group anchored at `date`
pub fn discovery_form(date: NaiveDate, group: WeekdayGroup) -> Form {
    vec![
        ("mode", "rent_ymd_chk".to_string()),
        ("sct_key", SCT_KEY.to_string()),
        ("mseason", date.month().to_string()),
        ("urent_d", date.format("%Y-%m-%d").to_string()),
        ("week_chk", group.week_code().to_string()),
        ("cote_cnt", COTE_CNT.to_string()),
    ]
}

/// Cart submission for a single token
pub fn reservation_form(month: u32, token: &ReservationToken) -> Form {
    vec![
        ("mode", "cart_list_rent".to_string()),
        ("sct_key", SCT_KEY.to_string()),
        ("mseason", month.to_string()),
        (RESERVATION_FIELD, token.wire_value()),
    ]
}

/// Classify a 200 response body from the cart endpoint
pub fn classify_reservation_response(body: &str) -> ReservationOutcome {
    if !body.contains(ADDED_TO_CART) {
        return ReservationOutcome::Failed;
    }
    if body.contains(EXCLUDED_ITEMS) {
        ReservationOutcome::AcceptedWithExclusion
    } else {
        ReservationOutcome::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourtIdentifier;

    fn field<'a>(form: &'a Form, name: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_classify_accepted() {
        let body = "<script>alert('장바구니에 담았습니다.');</script>";
        assert_eq!(
            classify_reservation_response(body),
            ReservationOutcome::Accepted
        );
    }

    #[test]
    fn test_classify_accepted_with_exclusion() {
        let body = "<script>alert('이미 예약된 1개 항목 제외하고 장바구니에 담았습니다.');</script>";
        assert_eq!(
            classify_reservation_response(body),
            ReservationOutcome::AcceptedWithExclusion
        );
    }

    #[test]
    fn test_classify_failed() {
        assert_eq!(
            classify_reservation_response("<script>alert('로그인 후 이용하세요.');</script>"),
            ReservationOutcome::Failed
        );
        assert_eq!(classify_reservation_response(""), ReservationOutcome::Failed);
        // Exclusion phrase alone is not a success
        assert_eq!(
            classify_reservation_response("항목 제외하고"),
            ReservationOutcome::Failed
        );
    }

    #[test]
    fn test_login_form() {
        let credentials = Credentials {
            username: "player1".to_string(),
            password: "secret".to_string(),
        };
        let form = login_form(&credentials, "https://jnrent2.jungnangimc.or.kr");
        assert_eq!(field(&form, "rtn_url"), Some("https://jnrent2.jungnangimc.or.kr"));
        assert_eq!(field(&form, "rtn_par"), Some(""));
        assert_eq!(field(&form, "mb_id"), Some("player1"));
        assert_eq!(field(&form, "mb_password"), Some("secret"));
    }

    #[test]
    fn test_discovery_form() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 6).unwrap();
        let form = discovery_form(date, WeekdayGroup::Wednesday);
        assert_eq!(field(&form, "mode"), Some("rent_ymd_chk"));
        assert_eq!(field(&form, "sct_key"), Some("3"));
        assert_eq!(field(&form, "mseason"), Some("8"));
        assert_eq!(field(&form, "urent_d"), Some("2025-08-06"));
        assert_eq!(field(&form, "week_chk"), Some("3"));
        assert_eq!(field(&form, "cote_cnt"), Some("8"));
    }

    #[test]
    fn test_reservation_form() {
        let token = ReservationToken {
            identifier: "250100||4||20250803".parse::<CourtIdentifier>().unwrap(),
            group: WeekdayGroup::Sunday,
            slot: 0,
        };
        let form = reservation_form(8, &token);
        assert_eq!(field(&form, "mode"), Some("cart_list_rent"));
        assert_eq!(field(&form, "mseason"), Some("8"));
        assert_eq!(field(&form, "cote_seq_arr[]"), Some("250100||4||20250803"));
        assert_eq!(form.iter().filter(|(k, _)| *k == RESERVATION_FIELD).count(), 1);
    }
}
