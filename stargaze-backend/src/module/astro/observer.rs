///! Civil inputs: coordinate normalization, longitude-derived UTC, and
///! assembly of the per-request observation context
use stargaze_common::ObservationContext;

use crate::error::SkyError;

use super::time::{gmst, julian_date, lst, CivilDate, CivilTime};

/// A fully resolved observation: the serializable context plus the
/// parsed numeric coordinates the math consumes.
#[derive(Debug, Clone)]
pub struct Observation {
    pub context: ObservationContext,
    pub longitude: f64,
    pub latitude: f64,
}

/// Normalize decimal-string coordinates to exactly six fractional
/// digits (shorter fractional parts are zero-padded).
///
/// The padded form is a contract, not cosmetics: the UTC offset below
/// is derived from integer hours of longitude.
pub fn fix_long_lat(long: &str, lat: &str) -> Result<(String, String), SkyError> {
    Ok((fix_coordinate(long)?, fix_coordinate(lat)?))
}

fn fix_coordinate(raw: &str) -> Result<String, SkyError> {
    let trimmed = raw.trim();
    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let fixed = format!("{whole}.{frac:0<6}");

    if fixed.parse::<f64>().is_err() {
        return Err(SkyError::InvalidCoordinate(raw.to_string()));
    }
    Ok(fixed)
}

/// Shift a local clock time to UTC using the crude whole-hours-of-
/// longitude offset (no timezone database; 15 degrees per hour,
/// truncated). Minutes and seconds pass through unchanged.
pub fn utc_shift(longitude: f64, local: &CivilTime) -> CivilTime {
    let long_hours = (longitude / 15.0).trunc();
    let hour = ((local.hour as f64 - long_hours) % 24.0).abs() as i64;
    CivilTime { hour, minute: local.minute, second: local.second }
}

/// Parse an `HH:MM:SS` clock string; a bare six-digit `HHMMSS` form is
/// accepted as well. Components must be numeric but are not
/// range-checked.
pub fn parse_time(raw: &str) -> Result<CivilTime, SkyError> {
    let bad = || SkyError::InvalidTime(raw.to_string());

    let parts: Vec<String> = if raw.contains(':') {
        raw.split(':').map(str::to_string).collect()
    } else if raw.len() == 6 && raw.chars().all(|c| c.is_ascii_digit()) {
        vec![raw[0..2].to_string(), raw[2..4].to_string(), raw[4..6].to_string()]
    } else {
        return Err(bad());
    };

    let [hour, minute, second] = parts.as_slice() else {
        return Err(bad());
    };
    Ok(CivilTime {
        hour: hour.parse().map_err(|_| bad())?,
        minute: minute.parse().map_err(|_| bad())?,
        second: second.parse().map_err(|_| bad())?,
    })
}

/// Parse a `YYYY-MM-DD` date string. Components must be numeric but
/// are not range-checked.
pub fn parse_date(raw: &str) -> Result<CivilDate, SkyError> {
    let bad = || SkyError::InvalidDate(raw.to_string());

    let parts: Vec<&str> = raw.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(bad());
    };
    Ok(CivilDate {
        year: year.parse().map_err(|_| bad())?,
        month: month.parse().map_err(|_| bad())?,
        day: day.parse().map_err(|_| bad())?,
    })
}

/// Current local date and time as (`YYYY-MM-DD`, `HH:MM:SS`) strings.
pub fn current_time_date() -> (String, String) {
    let now = chrono::Local::now();
    (now.format("%Y-%m-%d").to_string(), now.format("%H:%M:%S").to_string())
}

/// Resolve raw request inputs into an observation: normalized
/// coordinates, longitude-derived UTC, and the JD -> GMST -> LST chain.
pub fn resolve_observation(
    long: &str,
    lat: &str,
    local_time: &str,
    local_date: &str,
) -> Result<Observation, SkyError> {
    let (long_fixed, lat_fixed) = fix_long_lat(long, lat)?;
    let longitude: f64 = long_fixed
        .parse()
        .map_err(|_| SkyError::InvalidCoordinate(long.to_string()))?;
    let latitude: f64 = lat_fixed
        .parse()
        .map_err(|_| SkyError::InvalidCoordinate(lat.to_string()))?;

    let local = parse_time(local_time)?;
    let date = parse_date(local_date)?;

    let utc = utc_shift(longitude, &local);
    let julian_date =
        julian_date(date.year, date.month, date.day, utc.hour, utc.minute, utc.second);
    let gmst = gmst(&date, &utc);
    let lst = lst(gmst, longitude);

    Ok(Observation {
        context: ObservationContext {
            longitude: long_fixed,
            latitude: lat_fixed,
            local_time: local_time.to_string(),
            local_date: local_date.to_string(),
            utc_time: utc.to_string(),
            julian_date,
            gmst,
            lst,
        },
        longitude,
        latitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_fix_long_lat_pads_to_six_digits() {
        let (long, lat) = fix_long_lat("147.3058", "60.95").unwrap();
        assert_eq!(long, "147.305800");
        assert_eq!(lat, "60.950000");
    }

    #[test]
    fn test_fix_long_lat_accepts_fractionless_input() {
        let (long, lat) = fix_long_lat("60", "-12").unwrap();
        assert_eq!(long, "60.000000");
        assert_eq!(lat, "-12.000000");
    }

    #[test]
    fn test_fix_long_lat_rejects_garbage() {
        assert!(matches!(
            fix_long_lat("east-ish", "60.95"),
            Err(SkyError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_utc_shift_east_longitude() {
        // 147.3058 E is 9 whole hours ahead
        let local = CivilTime { hour: 22, minute: 30, second: 0 };
        let utc = utc_shift(147.3058, &local);
        assert_eq!(utc.to_string(), "13:30:00");
    }

    #[test]
    fn test_utc_shift_west_longitude() {
        let local = CivilTime { hour: 1, minute: 0, second: 5 };
        let utc = utc_shift(-30.0, &local);
        assert_eq!(utc.to_string(), "03:00:05");
    }

    #[test]
    fn test_utc_shift_wraps_via_absolute_value() {
        // 2h local minus 9h of longitude: the truncated remainder is
        // -7, folded to 7 by the absolute value
        let local = CivilTime { hour: 2, minute: 0, second: 0 };
        let utc = utc_shift(147.3058, &local);
        assert_eq!(utc.hour, 7);
    }

    #[test]
    fn test_parse_time_colon_and_compact_forms() {
        let a = parse_time("22:30:05").unwrap();
        let b = parse_time("223005").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, CivilTime { hour: 22, minute: 30, second: 5 });
    }

    #[test]
    fn test_parse_time_rejects_non_numeric() {
        assert!(matches!(parse_time("2a:00:00"), Err(SkyError::InvalidTime(_))));
        assert!(matches!(parse_time("22:00"), Err(SkyError::InvalidTime(_))));
    }

    #[test]
    fn test_parse_date() {
        let d = parse_date("2024-03-01").unwrap();
        assert_eq!(d, CivilDate { year: 2024, month: 3, day: 1 });
        assert!(matches!(parse_date("2024-3"), Err(SkyError::InvalidDate(_))));
        assert!(matches!(parse_date("not-a-date"), Err(SkyError::InvalidDate(_))));
    }

    #[test]
    fn test_resolve_observation_chain_at_greenwich() {
        // Longitude 0: local time is UTC, LST equals GMST
        let obs = resolve_observation("0.0", "45.0", "12:00:00", "2000-01-01").unwrap();
        assert_eq!(obs.context.longitude, "0.000000");
        assert_eq!(obs.context.latitude, "45.000000");
        assert_eq!(obs.context.utc_time, "12:00:00");
        assert!((obs.context.julian_date - 2_451_545.0).abs() < EPS);
        assert!((obs.context.lst - obs.context.gmst).abs() < EPS);
        assert!((obs.latitude - 45.0).abs() < EPS);
    }

    #[test]
    fn test_resolve_observation_rejects_bad_time() {
        assert!(resolve_observation("0.0", "45.0", "noonish", "2000-01-01").is_err());
    }
}
