use chrono::{DateTime, FixedOffset, TimeZone};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::error::{Result, TimelogError};
use crate::models::Instant;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a timezone setting into a [`Tz`].
///
/// `"auto"` resolves to the system timezone (UTC when the system zone is not a
/// known IANA name). Any other unrecognised name is a configuration error.
pub fn resolve_timezone(tz_name: &str) -> Result<Tz> {
    if tz_name.eq_ignore_ascii_case("auto") {
        let detected = get_system_timezone();
        return Ok(detected.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "system timezone \"{}\" is not a known IANA name, using UTC",
                detected
            );
            Tz::UTC
        }));
    }
    tz_name
        .parse::<Tz>()
        .map_err(|_| TimelogError::Config(format!("unknown timezone \"{}\"", tz_name)))
}

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Layouts tried after RFC 3339. `%z` accepts both `+hh:mm` and `+hhmm`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

/// Parse one ISO-8601 timestamp carrying an explicit UTC offset.
///
/// Surrounding whitespace is ignored. The parsed value keeps the offset it was
/// written with. Returns `None` for blank input, unrecognised layouts, and
/// timestamps without an offset.
pub fn parse_timestamp(s: &str) -> Option<Instant> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    debug!("could not parse timestamp \"{}\"", s);
    None
}

// ── Formatting ────────────────────────────────────────────────────────────────

/// Render an instant the way the log stores it: `YYYY-MM-DDThh:mm:ss±hh:mm`.
pub fn format_stamp<Z: TimeZone>(dt: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Current time in `tz`, reduced to a fixed offset.
pub fn now_in(tz: &Tz) -> DateTime<FixedOffset> {
    chrono::Utc::now().with_timezone(tz).fixed_offset()
}
