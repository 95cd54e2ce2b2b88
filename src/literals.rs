// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Parsing of the TransXChange literals: times of day (`HH:MM:SS`),
//! ISO 8601 durations (`PT1H30M`) and dates (`YYYY-MM-DD`).

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// A calendar date, without time.
pub type Date = NaiveDate;

/// A literal value supplied by the caller could not be interpreted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LiteralError {
    /// Not a `HH:MM:SS` time of day.
    #[error("malformed time '{0}', expected 'HH:MM:SS'")]
    MalformedTime(String),
    /// Not a `PT[nH][nM][nS]` duration.
    #[error("malformed duration '{0}', expected 'PT[nH][nM][nS]'")]
    MalformedDuration(String),
    /// Not a `YYYY-MM-DD` date.
    #[error("malformed date '{0}', expected 'YYYY-MM-DD'")]
    MalformedDate(String),
    /// Not a weekday name.
    #[error("unknown day of week '{0}'")]
    UnknownDay(String),
    /// Weekday numbers go from 0 (Monday) to 6 (Sunday).
    #[error("day of week {0} is out of range 0..=6")]
    DayOutOfRange(u8),
}

/// Parse a `HH:MM:SS` time of day into a duration since midnight.
///
/// Hours above 23 are accepted and give an offset past midnight.
///
/// ```
/// use chrono::Duration;
/// use transxchange_model::parse_time;
///
/// let time = parse_time("08:30:00").unwrap();
/// assert_eq!(Duration::hours(8) + Duration::minutes(30), time);
/// ```
pub fn parse_time(time: &str) -> Result<Duration, LiteralError> {
    let malformed = || LiteralError::MalformedTime(time.to_string());
    let mut components = time.trim().split(':');
    let mut next_component = || -> Result<i64, LiteralError> {
        let component = components.next().ok_or_else(malformed)?;
        if component.is_empty() || !component.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        component.parse().map_err(|_| malformed())
    };
    let hours = next_component()?;
    let minutes = next_component()?;
    let seconds = next_component()?;
    if components.next().is_some() || minutes > 59 || seconds > 59 {
        return Err(malformed());
    }
    Duration::try_hours(hours)
        .and_then(|time| time.checked_add(&Duration::minutes(minutes)))
        .and_then(|time| time.checked_add(&Duration::seconds(seconds)))
        .ok_or_else(malformed)
}

/// Parse an ISO 8601 duration restricted to hours, minutes and seconds
/// (`PT[nH][nM][nS]`). At least one component must be present; components
/// may come in any order.
///
/// ```
/// use chrono::Duration;
/// use transxchange_model::parse_duration;
///
/// assert_eq!(Duration::minutes(90), parse_duration("PT1H30M").unwrap());
/// assert!(parse_duration("10M").is_err());
/// ```
pub fn parse_duration(duration: &str) -> Result<Duration, LiteralError> {
    let malformed = || LiteralError::MalformedDuration(duration.to_string());
    let components = duration.trim().strip_prefix("PT").ok_or_else(malformed)?;
    let mut total = Duration::zero();
    let mut number = String::new();
    let mut has_component = false;
    for c in components.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        if number.is_empty() {
            return Err(malformed());
        }
        let value: i64 = number.parse().map_err(|_| malformed())?;
        let component = match c {
            'H' => Duration::try_hours(value),
            'M' => Duration::try_minutes(value),
            'S' => Duration::try_seconds(value),
            _ => return Err(malformed()),
        };
        total = component
            .and_then(|component| total.checked_add(&component))
            .ok_or_else(malformed)?;
        number.clear();
        has_component = true;
    }
    if !number.is_empty() || !has_component {
        return Err(malformed());
    }
    Ok(total)
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(date: &str) -> Result<Date, LiteralError> {
    Date::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| LiteralError::MalformedDate(date.to_string()))
}

/// Format a duration since midnight as `HH:MM:SS`. Hours are not wrapped.
pub fn format_time(time: Duration) -> String {
    let seconds = time.num_seconds();
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}
