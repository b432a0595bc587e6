//! Expiry directive parsing.
//!
//! A directive is either `"never"` or `<positive integer><unit>` with unit
//! `m` (minutes), `h` (hours), `d` (days), or `w` (weeks).  Anything else
//! falls back to one hour rather than erroring, so garbage input can only
//! shorten a record's life, never extend it.

use chrono::{DateTime, Duration, Utc};

/// Directive the create path substitutes when the client supplies none.
pub const DEFAULT_DIRECTIVE: &str = "1h";

/// Turn a user-supplied expiry directive into an absolute expiry timestamp.
///
/// Returns `None` for `"never"` (the record never expires).  Pure: the
/// result depends only on the arguments.
pub fn compute(directive: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let directive = directive.trim().to_ascii_lowercase();
    if directive == "never" {
        return None;
    }

    let ttl = parse_ttl(&directive).unwrap_or_else(|| Duration::hours(1));
    Some(now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC))
}

/// Parse `<positive integer><unit>`; `None` for anything else.
fn parse_ttl(directive: &str) -> Option<Duration> {
    let unit = directive.chars().last()?;
    let value_str = &directive[..directive.len() - unit.len_utf8()];
    if value_str.is_empty() || !value_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = value_str.parse().ok()?;
    if value == 0 {
        return None;
    }

    match unit {
        'm' => Duration::try_minutes(value),
        'h' => Duration::try_hours(value),
        'd' => Duration::try_days(value),
        'w' => Duration::try_weeks(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn never_means_no_expiry() {
        assert_eq!(compute("never", now()), None);
        assert_eq!(compute("NEVER", now()), None);
    }

    #[test]
    fn pattern_directives() {
        assert_eq!(compute("30m", now()), Some(now() + Duration::minutes(30)));
        assert_eq!(compute("2d", now()), Some(now() + Duration::hours(48)));
        assert_eq!(compute("3w", now()), Some(now() + Duration::weeks(3)));
    }

    #[test]
    fn shorthand_literals() {
        assert_eq!(compute("1h", now()), Some(now() + Duration::hours(1)));
        assert_eq!(compute("6h", now()), Some(now() + Duration::hours(6)));
        assert_eq!(compute("1d", now()), Some(now() + Duration::days(1)));
        assert_eq!(compute("1w", now()), Some(now() + Duration::weeks(1)));
    }

    #[test]
    fn unit_is_case_insensitive() {
        assert_eq!(compute("10M", now()), Some(now() + Duration::minutes(10)));
    }

    #[test]
    fn unrecognized_defaults_to_one_hour() {
        let one_hour = Some(now() + Duration::hours(1));
        assert_eq!(compute("garbage", now()), one_hour);
        assert_eq!(compute("", now()), one_hour);
        assert_eq!(compute("0m", now()), one_hour);
        assert_eq!(compute("-5m", now()), one_hour);
        assert_eq!(compute("5x", now()), one_hour);
        assert_eq!(compute("m", now()), one_hour);
    }

    #[test]
    fn huge_values_do_not_panic() {
        // Overflows chrono's Duration range; still maps to a defined output.
        assert!(compute("99999999999999999999w", now()).is_some());
    }
}
