// Stay pricing: nights between check-in and check-out, and the total charged for them
//
// All instants are normalized to UTC before any arithmetic, so the same pair of
// inputs yields the same number of nights regardless of the host's locale.
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::error::ValidationError;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stay {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub nights: u32,
    pub total_price: f64,
}

/// Computes nights and total price from raw date strings.
///
/// Dates may be plain calendar dates (`2024-01-01`, read as midnight UTC) or
/// RFC 3339 timestamps with any offset.
pub fn compute_stay(
    price_per_night: f64,
    check_in: &str,
    check_out: &str,
) -> Result<Stay, ValidationError> {
    validate_price(price_per_night)?;
    let check_in = parse_stay_date(check_in)?;
    let check_out = parse_stay_date(check_out)?;
    compute_stay_between(price_per_night, check_in, check_out)
}

pub fn compute_stay_for_dates(
    price_per_night: f64,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Stay, ValidationError> {
    compute_stay_between(
        price_per_night,
        check_in.and_time(NaiveTime::MIN).and_utc(),
        check_out.and_time(NaiveTime::MIN).and_utc(),
    )
}

pub fn compute_stay_between(
    price_per_night: f64,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<Stay, ValidationError> {
    validate_price(price_per_night)?;

    if check_out <= check_in {
        return Err(ValidationError::InvalidDateRange(format!(
            "check-out {} must be after check-in {}",
            check_out, check_in
        )));
    }

    // Any partial day is billed as a full night
    let millis = (check_out - check_in).num_milliseconds();
    let nights = (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
    let nights = u32::try_from(nights).map_err(|_| {
        ValidationError::InvalidDateRange(format!("stay of {} nights is too long", nights))
    })?;

    let total_price = round_currency(f64::from(nights) * price_per_night);
    if !total_price.is_finite() {
        return Err(ValidationError::InvalidPrice(format!(
            "total for {} nights at {} overflows",
            nights, price_per_night
        )));
    }

    Ok(Stay {
        check_in,
        check_out,
        nights,
        total_price,
    })
}

pub fn parse_stay_date(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ValidationError::InvalidDateRange(format!("'{}' is not a valid date: {}", value, e)))
}

pub fn validate_price(price_per_night: f64) -> Result<(), ValidationError> {
    if !price_per_night.is_finite() || price_per_night < 0.0 {
        return Err(ValidationError::InvalidPrice(format!(
            "price per night must be a non-negative number, got {}",
            price_per_night
        )));
    }
    Ok(())
}

/// Rounds to two decimal places, ties to even.
pub fn round_currency(amount: f64) -> f64 {
    let scaled = amount * 100.0;
    // Snap binary noise first so 2.675 * 100 is seen as the tie it represents
    let snapped = (scaled * 1e6).round() / 1e6;
    snapped.round_ties_even() / 100.0
}
