//! Record timestamps.
//!
//! # Responsibility
//! - Issue creation/update instants for records.
//! - Encode and parse the textual wire form.
//!
//! # Invariants
//! - Timestamps are naive UTC with microsecond precision, so the wire form
//!   round-trips exactly.
//! - `now()` is strictly increasing within a process, even when the wall clock
//!   stalls or two calls land in the same microsecond.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Wire format: ISO-8601 without timezone, six fractional digits.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Parse format: fractional part optional and of any precision.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub type Timestamp = NaiveDateTime;

static LAST_ISSUED_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Returns the current instant, strictly after every previously issued one.
pub fn now() -> Timestamp {
    let wall = Utc::now().timestamp_micros();
    let mut previous = LAST_ISSUED_MICROS.load(Ordering::Relaxed);
    loop {
        let next = wall.max(previous.saturating_add(1));
        match LAST_ISSUED_MICROS.compare_exchange_weak(
            previous,
            next,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ) {
            Ok(_) => return from_micros(next),
            Err(actual) => previous = actual,
        }
    }
}

/// Renders the wire form.
pub fn format(value: &Timestamp) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses the wire form. Sub-microsecond digits are truncated.
pub fn parse(value: &str) -> Option<Timestamp> {
    let parsed = NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_PARSE_FORMAT).ok()?;
    Some(from_micros(parsed.and_utc().timestamp_micros()))
}

fn from_micros(micros: i64) -> Timestamp {
    DateTime::from_timestamp_micros(micros)
        .map(|value| value.naive_utc())
        .unwrap_or_else(|| Utc::now().naive_utc())
}
