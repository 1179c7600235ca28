//! Normalizers that turn raw upstream fields into the small set of
//! categories and derived numbers the views use.

use crate::models::{Control, Party};
use crate::remote::RawTerm;
use chrono::{DateTime, Datelike, Utc};

/// First Congress convened in 1789; a new one starts every odd year on Jan 3.
const FIRST_CONGRESS_YEAR: i32 = 1789;

/// Map any upstream party string to a [`Party`].
pub fn normalize_party_name(party_name: Option<&str>) -> Party {
    let Some(raw) = party_name.filter(|s| !s.is_empty()) else {
        return Party::Unknown;
    };

    let lower = raw.to_lowercase();
    if lower.contains("democrat") {
        Party::Democrat
    } else if lower.contains("republican") {
        Party::Republican
    } else if lower.contains("independent") {
        Party::Independent
    } else {
        Party::Other(raw.to_string())
    }
}

/// Number of the Congress in session on `date`.
pub fn current_congress_number(date: DateTime<Utc>) -> u32 {
    let year = date.year();
    let mut congress = (year - FIRST_CONGRESS_YEAR) / 2 + 1;

    // Jan 1-2 of an odd year still belong to the outgoing Congress.
    if year % 2 != 0 && date.month() == 1 && date.day() < 3 {
        congress -= 1;
    }

    congress.max(1) as u32
}

/// House term still being served in `year`.
///
/// A term ending in `year` ended on Jan 3 of that year.
pub fn is_current_house_term(term: &RawTerm, year: i32) -> bool {
    term.chamber().contains("House") && term.end_year.map_or(true, |end| end > year)
}

/// Senate term still being served in `year`.
pub fn is_current_senate_term(term: &RawTerm, year: i32) -> bool {
    term.chamber() == "Senate" && term.end_year.map_or(true, |end| end >= year)
}

/// Start year of a directory term: an explicit numeric year, else the year
/// prefix of an ISO `start`/`begin` date.
pub fn extract_start_year(numeric: Option<i32>, start: Option<&str>, begin: Option<&str>) -> Option<i32> {
    numeric.or_else(|| start.and_then(year_prefix)).or_else(|| begin.and_then(year_prefix))
}

fn year_prefix(date: &str) -> Option<i32> {
    let prefix = date.get(..4)?;
    if prefix.bytes().all(|b| b.is_ascii_digit()) {
        prefix.parse().ok()
    } else {
        None
    }
}

/// Years since the earliest start year; 0 without history.
pub fn years_in_service(start_years: &[i32], year: i32) -> i32 {
    start_years.iter().min().map_or(0, |first| year - first)
}

/// FEC two-year transaction period containing `year` (periods end on even years).
pub fn fec_cycle(year: i32) -> i32 {
    if year % 2 == 0 {
        year
    } else {
        year + 1
    }
}

/// Share of receipts that came from individuals, in percent.
pub fn individual_percentage(individual: f64, receipts: f64) -> f64 {
    if receipts > 0.0 {
        individual / receipts * 100.0
    } else {
        0.0
    }
}

/// More than `threshold_pct` percent of receipts came from individuals.
pub fn is_grassroots(individual: f64, receipts: f64, threshold_pct: f64) -> bool {
    receipts > 0.0 && individual > receipts * threshold_pct / 100.0
}

/// Control label for a senate delegation.
pub fn senate_control(parties: &[Party]) -> Control {
    match parties {
        [Party::Republican, Party::Republican] => Control::Republican,
        [Party::Democrat, Party::Democrat] => Control::Democrat,
        _ => Control::Split,
    }
}

/// Order key for districts; at-large seats sort first.
pub fn district_sort_key(district: &str) -> u32 {
    if district == "At-Large" {
        0
    } else {
        district.trim().parse().unwrap_or(0)
    }
}
