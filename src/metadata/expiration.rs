//! Release-date driven cache expiration policy.
//!
//! Recently released items change often upstream (vote counts, artwork,
//! next-episode data), so they get a shorter retention than back-catalog
//! items.

use std::time::Duration;

use chrono::{NaiveDate, Utc};

/// Retention for back-catalog items and slow-moving entities.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);
/// Retention for recently released items and volatile result pages.
pub const ONE_WEEK_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Pick a TTL from an item's release date.
///
/// Returns `recent_ttl` when the date parses as `YYYY-MM-DD` and lies less
/// than 30 days in the past, `default_ttl` otherwise (including empty or
/// malformed dates).
pub fn ttl_for_release(
    release_date: &str,
    default_ttl: Duration,
    recent_ttl: Duration,
) -> Duration {
    if release_date.is_empty() {
        return default_ttl;
    }
    let parsed = match NaiveDate::parse_from_str(release_date, "%Y-%m-%d") {
        Ok(d) => d,
        Err(_) => return default_ttl,
    };

    let age = Utc::now().date_naive() - parsed;
    if age < chrono::Duration::days(30) {
        recent_ttl
    } else {
        default_ttl
    }
}

/// `ttl_for_release` with the standard policy constants.
pub fn release_ttl(release_date: &str) -> Duration {
    ttl_for_release(release_date, DEFAULT_TTL, ONE_WEEK_TTL)
}
