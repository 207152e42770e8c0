//! Best-effort parsing of the publication dates found on source pages.
//!
//! Sources print dates in whatever shape their CMS produces: ISO-8601 in
//! `datetime` attributes, Spanish long form in visible text, or numeric
//! day-first dates. [`parse_date`] tries a fixed, ordered list of formats and
//! gives up quietly when none fits.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SPANISH_LONG: Regex =
        Regex::new(r"(\d{1,2})\s+de\s+([a-záéíóú]+)(?:\s+de)?\s+(\d{4})").expect("valid regex");
    static ref SPANISH_SHORT: Regex =
        Regex::new(r"(\d{1,2})\s+([a-záéíóú]+)\.?,?\s+(\d{4})").expect("valid regex");
    static ref DAY_FIRST: Regex = Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").expect("valid regex");
    static ref YEAR_FIRST: Regex = Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").expect("valid regex");
}

const ISO_NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a raw date string into a calendar date.
///
/// Accepted, in order: ISO-8601 date-times (with or without offset or
/// fractional seconds), `15 de abril de 2023`, `15 abril 2023`, `15/04/2023`
/// and `2023-04-15`. Anything else yields `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if text.contains('T') {
        if let Some(date) = parse_iso(text) {
            return Some(date);
        }
    }

    let lower = text.to_lowercase();

    for re in [&*SPANISH_LONG, &*SPANISH_SHORT] {
        if let Some(caps) = re.captures(&lower) {
            let day = caps[1].parse().ok()?;
            let year = caps[3].parse().ok()?;
            if let Some(month) = spanish_month(&caps[2]) {
                return NaiveDate::from_ymd_opt(year, month, day);
            }
        }
    }

    if let Some(caps) = DAY_FIRST.captures(&lower) {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = YEAR_FIRST.captures(&lower) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn parse_iso(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    // +0000 style offsets are not RFC 3339
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.date_naive());
    }
    for fmt in ISO_NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    let date_part = text.split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn spanish_month(name: &str) -> Option<u32> {
    let month = match name {
        "enero" | "ene" => 1,
        "febrero" | "feb" => 2,
        "marzo" | "mar" => 3,
        "abril" | "abr" => 4,
        "mayo" | "may" => 5,
        "junio" | "jun" => 6,
        "julio" | "jul" => 7,
        "agosto" | "ago" => 8,
        "septiembre" | "setiembre" | "sep" | "sept" | "set" => 9,
        "octubre" | "oct" => 10,
        "noviembre" | "nov" => 11,
        "diciembre" | "dic" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_iso_variants() {
        assert_eq!(parse_date("2024-03-05T10:15:00+00:00"), ymd(2024, 3, 5));
        assert_eq!(parse_date("2024-03-05T10:15:00Z"), ymd(2024, 3, 5));
        assert_eq!(parse_date("2024-03-05T10:15:00-0600"), ymd(2024, 3, 5));
        assert_eq!(parse_date("2024-03-05T10:15:00.123456"), ymd(2024, 3, 5));
        assert_eq!(parse_date("2024-03-05T10:15:00"), ymd(2024, 3, 5));
    }

    #[test]
    fn test_spanish_long_form() {
        assert_eq!(parse_date("15 de abril de 2023"), ymd(2023, 4, 15));
        assert_eq!(parse_date("Publicado el 1 de Septiembre 2022"), ymd(2022, 9, 1));
        assert_eq!(parse_date("7 de setiembre de 2021"), ymd(2021, 9, 7));
    }

    #[test]
    fn test_spanish_short_form() {
        assert_eq!(parse_date("15 abril 2023"), ymd(2023, 4, 15));
        assert_eq!(parse_date("3 dic. 2020"), ymd(2020, 12, 3));
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(parse_date("15/04/2023"), ymd(2023, 4, 15));
        assert_eq!(parse_date("2023-4-15"), ymd(2023, 4, 15));
    }

    #[test]
    fn test_unparseable_input() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("ayer por la tarde"), None);
        assert_eq!(parse_date("15 de brumario de 2023"), None);
        assert_eq!(parse_date("31/02/2023"), None);
    }
}
