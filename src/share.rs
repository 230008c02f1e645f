//! Plain-text summary of the latest session for sharing.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

use crate::{models::Session, utils::format::format_duration};

const TIME_FORMAT: &str = "%I:%M %p";

pub fn summarize<Tz>(session: &Session, distance_meters: f64, duration_seconds: u64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let start = clock_time(session.start, tz);
    let end = session
        .end
        .map(|end| clock_time(end, tz))
        .unwrap_or_else(|| "Ongoing".to_string());

    format!(
        "🏃 Step Tracker Stats:\n\
         Distance covered: {distance_meters} meters\n\
         Duration: {}\n\
         Start time: {start}\n\
         End time: {end}",
        format_duration(duration_seconds)
    )
}

/// `None` when there is nothing to share yet.
pub fn summarize_latest<Tz>(
    sessions: &[Session],
    distance_meters: f64,
    duration_seconds: u64,
    tz: &Tz,
) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    sessions
        .last()
        .map(|session| summarize(session, distance_meters, duration_seconds, tz))
}

fn clock_time<Tz>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.with_timezone(tz).format(TIME_FORMAT).to_string()
}
