use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::errors::ApiError;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Parse the optional `start_date`/`end_date` pair into an inclusive range.
/// Both bounds must be present for a filter to apply, matching the legacy
/// API. Accepts RFC 3339 timestamps or plain dates (day-inclusive).
pub fn parse_period(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, ApiError> {
    match (start, end) {
        (Some(start), Some(end)) => {
            let start = parse_bound(start, false)?;
            let end = parse_bound(end, true)?;
            Ok(Some((start, end)))
        }
        _ => Ok(None),
    }
}

fn parse_bound(raw: &str, is_end: bool) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = if is_end {
            date.and_hms_milli_opt(23, 59, 59, 999)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        if let Some(naive) = time {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(ApiError::Validation(format!("Data inválida: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_requires_both_bounds() {
        assert!(parse_period(Some("2026-01-01"), None).unwrap().is_none());
        assert!(parse_period(None, Some("2026-01-31")).unwrap().is_none());
        assert!(parse_period(None, None).unwrap().is_none());
    }

    #[test]
    fn plain_dates_cover_the_whole_day() {
        let (start, end) = parse_period(Some("2026-01-01"), Some("2026-01-01"))
            .unwrap()
            .unwrap();
        assert_eq!(start.to_rfc3339(), "2026-01-01T00:00:00+00:00");
        assert!(end > start);
        assert_eq!(end.date_naive().to_string(), "2026-01-01");
    }

    #[test]
    fn rfc3339_bounds_pass_through() {
        let (start, end) = parse_period(
            Some("2026-01-01T08:30:00Z"),
            Some("2026-01-01T17:45:00-03:00"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(start.to_rfc3339(), "2026-01-01T08:30:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-01T20:45:00+00:00");
    }

    #[test]
    fn garbage_dates_are_rejected() {
        let err = parse_period(Some("ontem"), Some("hoje")).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
