//! # 日期解析
//!
//! 表单提交的日期可能是 `YYYY-MM-DD`、`YYYY-MM-DDTHH:MM`（datetime-local）或 RFC 3339

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// 解析日期
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(raw).map(|dt| dt.date()))
}

/// 解析日期时间，RFC 3339 时间统一转为 UTC
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2004, 5, 1).unwrap();
        assert_eq!(parse_date("2004-05-01"), Some(expected));
        assert_eq!(parse_date("2004-05-01T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_date(" 2004-05-01 "), Some(expected));
        assert_eq!(parse_date("01/05/2004"), None);
    }

    #[test]
    fn test_parse_datetime_formats() {
        let dt = parse_datetime("2024-09-10T14:30").unwrap();
        assert_eq!(dt.to_string(), "2024-09-10 14:30:00");

        let dt = parse_datetime("2024-09-10T14:30:00+02:00").unwrap();
        assert_eq!(dt.to_string(), "2024-09-10 12:30:00");

        let dt = parse_datetime("2024-09-10").unwrap();
        assert_eq!(dt.to_string(), "2024-09-10 00:00:00");
        assert!(parse_datetime("tomorrow").is_none());
    }
}
