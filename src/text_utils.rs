use std::ops::Index;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS[.fff]]` (space or `T` separated)
/// and RFC 3339 with an offset, which is converted to UTC.
pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    lazy_static! {
        static ref DATE_REGEX: Regex = Regex::new(
            r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:\.\d+)?)?)?$"
        ).unwrap();
    }

    let buf = buf.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(buf) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }

    let Some(caps) = DATE_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);
    let opt_u32 = |idx: usize| caps.get(idx).map_or(Ok(0), |m| to_u32(m.as_str()));

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = opt_u32(4)?;
    let mn: u32 = opt_u32(5)?;
    let s: u32 = opt_u32(6)?;

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid calendar date {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time of day {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

/// Extracts the `YYYY-MM-DD` prefix of names such as `2024-02-12-my-post`
pub fn date_prefix(name: &str) -> Option<(NaiveDate, &str)> {
    lazy_static! {
        static ref PREFIX_REGEX: Regex = Regex::new(r"^(\d{4}-\d{2}-\d{2})[-_](.*)$").unwrap();
    }

    let caps = PREFIX_REGEX.captures(name)?;
    let date = NaiveDate::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d").ok()?;
    Some((date, caps.get(2)?.as_str()))
}

pub fn format_date_time(date_time: &NaiveDateTime) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}

/// Human readable date used by the templates, e.g. `2 January 2024`
pub fn display_date(date_time: &NaiveDateTime) -> String {
    date_time.format("%-d %B %Y").to_string()
}

pub fn rfc2822(date_time: &NaiveDateTime) -> String {
    Utc.from_utc_datetime(date_time).to_rfc2822()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_time() {
        let date_time = parse_date_time("2017-09-10 10:42:32.123").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:32");

        let date_time = parse_date_time("2017-09-10T10:42").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:00");

        let date_time = parse_date_time("2017-09-10").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "00:00:00");
    }

    #[test]
    fn test_parse_rfc3339_is_converted_to_utc() {
        let date_time = parse_date_time("2024-03-01T10:00:00+02:00").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2024-03-01");
        assert_eq!(time, "08:00:00");
    }

    #[test]
    fn test_parse_invalid_dates() {
        assert!(parse_date_time("yesterday").is_err());
        assert!(parse_date_time("2024-13-01").is_err());
        assert!(parse_date_time("2024-02-30").is_err());
        assert!(parse_date_time("2024-02-03 25:00").is_err());
    }

    #[test]
    fn test_date_prefix() {
        let (date, rest) = date_prefix("2024-02-12-hello-world").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 12).unwrap());
        assert_eq!(rest, "hello-world");
        assert!(date_prefix("hello-world").is_none());
        assert!(date_prefix("2024-99-12-hello").is_none());
    }

    #[test]
    fn test_display_and_rfc2822() {
        let dt = parse_date_time("2024-01-02 05:06:07").unwrap();
        assert_eq!(display_date(&dt), "2 January 2024");
        assert_eq!(rfc2822(&dt), "Tue, 2 Jan 2024 05:06:07 +0000");
    }
}
