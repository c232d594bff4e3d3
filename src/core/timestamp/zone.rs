//! Target timezone for resolved timestamps.

use crate::error::ConfigError;
use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use std::str::FromStr;

/// Zone in which capture times are expressed for directory and file names.
///
/// Container timestamps are absolute and get converted into this zone. EXIF
/// timestamps are wall-clock values without a zone; they keep their fields
/// and only gain this zone's offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetZone {
    /// The zone of the machine running the organizer
    #[default]
    Local,
    /// A fixed UTC offset, independent of the machine
    Fixed(FixedOffset),
}

impl TargetZone {
    /// Express an absolute time in this zone
    pub fn convert(&self, time: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            TargetZone::Local => time.with_timezone(&Local).fixed_offset(),
            TargetZone::Fixed(offset) => time.with_timezone(offset),
        }
    }

    /// Attach this zone to a wall-clock time without changing its fields.
    ///
    /// Wall times the zone skips (DST gaps) are tagged as UTC instead; for
    /// ambiguous ones the earlier instant is used.
    pub fn localize(&self, naive: NaiveDateTime) -> DateTime<FixedOffset> {
        let local = match self {
            TargetZone::Local => earliest(Local.from_local_datetime(&naive)),
            TargetZone::Fixed(offset) => earliest(offset.from_local_datetime(&naive)),
        };
        local.unwrap_or_else(|| Utc.from_utc_datetime(&naive).fixed_offset())
    }
}

fn earliest<Tz: TimeZone>(result: LocalResult<DateTime<Tz>>) -> Option<DateTime<FixedOffset>> {
    result.earliest().map(|t| t.fixed_offset())
}

impl FromStr for TargetZone {
    type Err = ConfigError;

    /// Accepts `local`, `utc`, `Z`, `+HH:MM`, `-HHMM` and `+HH`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidOffset {
            value: s.to_string(),
        };
        let trimmed = s.trim();

        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(TargetZone::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return FixedOffset::east_opt(0).map(TargetZone::Fixed).ok_or_else(invalid);
        }

        let (sign, rest) = match trimmed.chars().next() {
            Some('+') => (1, &trimmed[1..]),
            Some('-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };

        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) || rest.matches(':').count() > 1 {
            return Err(invalid());
        }
        let (hours, minutes) = match digits.len() {
            2 => (&digits[..2], "0"),
            4 => (&digits[..2], &digits[2..]),
            _ => return Err(invalid()),
        };
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(TargetZone::Fixed)
            .ok_or_else(invalid)
    }
}

impl std::fmt::Display for TargetZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetZone::Local => write!(f, "local"),
            TargetZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn offset(zone: TargetZone) -> i32 {
        match zone {
            TargetZone::Fixed(o) => o.local_minus_utc(),
            TargetZone::Local => panic!("expected fixed"),
        }
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(offset("+09:00".parse().unwrap()), 9 * 3600);
        assert_eq!(offset("-0530".parse().unwrap()), -(5 * 3600 + 30 * 60));
        assert_eq!(offset("+02".parse().unwrap()), 2 * 3600);
        assert_eq!(offset("UTC".parse().unwrap()), 0);
        assert_eq!(offset("Z".parse().unwrap()), 0);
        assert_eq!("local".parse::<TargetZone>().unwrap(), TargetZone::Local);
    }

    #[test]
    fn rejects_garbage_offsets() {
        for bad in ["", "9", "+9:00:00", "+25:00", "+09:75", "tokyo", "+0a:00"] {
            assert!(bad.parse::<TargetZone>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn localize_keeps_wall_clock_fields() {
        let naive = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let zone: TargetZone = "-03:00".parse().unwrap();
        let time = zone.localize(naive);
        assert_eq!(time.naive_local(), naive);
        assert_eq!(time.offset().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn convert_shifts_fields() {
        let utc = DateTime::parse_from_rfc3339("2023-12-31T23:30:00Z").unwrap();
        let zone: TargetZone = "+01:00".parse().unwrap();
        let converted = zone.convert(utc);
        assert_eq!(converted.to_rfc3339(), "2024-01-01T00:30:00+01:00");
        assert_eq!(converted, utc);
    }

    #[test]
    fn display_round_trips_fixed() {
        let zone: TargetZone = "+09:00".parse().unwrap();
        assert_eq!(zone.to_string(), "+09:00");
        assert_eq!(zone.to_string().parse::<TargetZone>().unwrap(), zone);
    }
}
