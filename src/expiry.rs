//! Expiry evaluation for links
//!
//! Expiry is never stored on a link. It is derived from `expires_at` and the
//! caller's notion of "now" every time it is asked for.

use std::fmt;

use crate::models::Link;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Returns true once `now` is strictly past the link's expiry instant.
pub fn is_expired(link: &Link, now: i64) -> bool {
    now > link.expires_at
}

/// Time left before a link expires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    Expired,
    /// Milliseconds left (zero when `now == expires_at`)
    Left(i64),
}

pub fn time_remaining(link: &Link, now: i64) -> TimeRemaining {
    if is_expired(link, now) {
        TimeRemaining::Expired
    } else {
        TimeRemaining::Left(link.expires_at - now)
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = match *self {
            TimeRemaining::Expired => return write!(f, "Expired"),
            TimeRemaining::Left(ms) => ms,
        };

        let days = ms / DAY_MS;
        let hours = (ms % DAY_MS) / HOUR_MS;
        let minutes = (ms % HOUR_MS) / MINUTE_MS;

        if days > 0 {
            write!(f, "{days}d {hours}h {minutes}m")
        } else if hours > 0 {
            write!(f, "{hours}h {minutes}m")
        } else if minutes > 0 {
            write!(f, "{minutes}m")
        } else {
            write!(f, "<1m")
        }
    }
}
