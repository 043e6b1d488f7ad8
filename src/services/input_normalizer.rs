//! Turns raw search-form input into [`SearchCriteria`].
//!
//! Locations must carry geocoded coordinates; a name typed without an
//! autocomplete match fails validation instead of being given a guessed
//! coordinate.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::errors::BookingError;
use crate::models::search::{LocationSelection, SearchCriteria, SearchForm};

pub const DEFAULT_TIME: &str = "10:00";

pub const SUPPORTED_COUNTRIES: &[(&str, &str)] = &[
    ("PK", "Pakistan"),
    ("US", "United States"),
    ("UK", "United Kingdom"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("DE", "Germany"),
    ("FR", "France"),
    ("IN", "India"),
    ("AE", "UAE"),
    ("MT", "Malta"),
];

pub const AGE_BRACKETS: &[&str] = &[
    "18-25", "26-30", "31-35", "36-40", "41-45", "46-50", "51-55", "56-60", "60+",
];

/// `Wed, Aug 20, 2025 10:00`, the format the search endpoint expects.
pub fn format_api_datetime(at: NaiveDateTime) -> String {
    at.format("%a, %b %-d, %Y %H:%M").to_string()
}

/// `Wed, Aug 20, 10:00`, used on summaries and cards.
pub fn format_display_datetime(at: NaiveDateTime) -> String {
    at.format("%a, %b %-d, %H:%M").to_string()
}

/// Parse an `HH:MM` pick, defaulting to 10:00 when nothing was chosen.
pub fn parse_time(time: Option<&str>) -> Option<NaiveTime> {
    let time = time.map(str::trim).filter(|t| !t.is_empty()).unwrap_or(DEFAULT_TIME);
    NaiveTime::parse_from_str(time, "%H:%M").ok()
}

/// Combine a calendar day and a time-of-day pick into the canonical string.
pub fn canonical_datetime(
    date: NaiveDate,
    time: Option<&str>,
) -> Option<(NaiveDateTime, String)> {
    let at = date.and_time(parse_time(time)?);
    Some((at, format_api_datetime(at)))
}

/// Calendar picks before today are refused when they are made.
pub fn select_calendar_day(
    field: &str,
    day: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate, BookingError> {
    if day < today {
        return Err(BookingError::Validation(vec![field.to_string()]));
    }
    Ok(day)
}

/// Whole days between pickup and drop-off, rounded up, never less than one.
pub fn rental_days(pickup: NaiveDateTime, dropoff: NaiveDateTime) -> u32 {
    let minutes = (dropoff - pickup).num_minutes().unsigned_abs();
    let days = minutes.div_ceil(24 * 60);
    u32::try_from(days).unwrap_or(u32::MAX).max(1)
}

fn valid_country(code: &str) -> bool {
    SUPPORTED_COUNTRIES.iter().any(|&(supported, _)| supported == code)
}

fn valid_driver_age(age: &str) -> bool {
    if AGE_BRACKETS.contains(&age) {
        return true;
    }
    matches!(age.parse::<u32>(), Ok(years) if (18..=99).contains(&years))
}

fn checked_date(
    field: &str,
    date: Option<NaiveDate>,
    time: Option<&str>,
    today: NaiveDate,
    missing: &mut Vec<String>,
) -> Option<(NaiveDateTime, String)> {
    let Some(date) = date else {
        missing.push(field.to_string());
        return None;
    };
    if select_calendar_day(field, date, today).is_err() {
        missing.push(field.to_string());
        return None;
    }
    let time_field = field.replace("_date", "_time");
    match canonical_datetime(date, time) {
        Some(result) => Some(result),
        None => {
            missing.push(time_field);
            None
        }
    }
}

/// Validate a search form. Every problem is reported at once so the form
/// can flag all offending fields; nothing is sent upstream on failure.
pub fn normalize(form: &SearchForm, today: NaiveDate) -> Result<SearchCriteria, BookingError> {
    let mut missing = Vec::new();

    let pickup = form.pickup.resolved();
    if pickup.is_none() {
        missing.push("pickup_location".to_string());
    }

    let dropoff = if form.same_as_pickup {
        pickup.clone()
    } else {
        let resolved = form
            .dropoff
            .as_ref()
            .and_then(LocationSelection::resolved);
        if resolved.is_none() {
            missing.push("dropoff_location".to_string());
        }
        resolved
    };

    let pickup_at = checked_date(
        "pickup_date",
        form.pickup_date,
        form.pickup_time.as_deref(),
        today,
        &mut missing,
    );
    let dropoff_at = checked_date(
        "dropoff_date",
        form.dropoff_date,
        form.dropoff_time.as_deref(),
        today,
        &mut missing,
    );

    let country = form.country.trim().to_uppercase();
    if !valid_country(&country) {
        missing.push("country".to_string());
    }
    let driver_age = form.driver_age.trim().to_string();
    if !valid_driver_age(&driver_age) {
        missing.push("driver_age".to_string());
    }

    if let (Some((pickup_at, _)), Some((dropoff_at, _))) = (&pickup_at, &dropoff_at) {
        if dropoff_at < pickup_at {
            missing.push("dropoff_date".to_string());
        }
    }

    match (pickup, dropoff, pickup_at, dropoff_at) {
        (Some(pickup), Some(dropoff), Some((pickup_at, pickup_date)), Some((dropoff_at, dropoff_date)))
            if missing.is_empty() =>
        {
            Ok(SearchCriteria {
                pickup,
                dropoff,
                same_as_pickup: form.same_as_pickup,
                pickup_at,
                dropoff_at,
                pickup_date,
                dropoff_date,
                country,
                driver_age,
                rental_days: rental_days(pickup_at, dropoff_at),
            })
        }
        _ => {
            missing.dedup();
            Err(BookingError::Validation(missing))
        }
    }
}
