///! Julian Date and sidereal time
use super::round_dp;

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00 UT)
const J2000_JD: f64 = 2_451_545.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Calendar date components.
///
/// Values are taken as-is: out-of-range components propagate through
/// the formulas rather than being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilDate {
    pub year: i64,
    pub month: i64,
    pub day: i64,
}

/// Clock time components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
}

impl std::fmt::Display for CivilDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl std::fmt::Display for CivilTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Julian Date from a UT calendar date and time of day.
///
/// The two inner quotients are integer floor divisions; the day
/// fraction is added on top of the 1721013.5 offset.
pub fn julian_date(year: i64, month: i64, day: i64, hour: i64, minute: i64, second: i64) -> f64 {
    let leap_term = (7 * (year + (month + 9).div_euclid(12))).div_euclid(4);
    let month_term = (275 * month).div_euclid(9);
    let whole = 367 * year - leap_term + month_term + day;

    let day_fraction =
        (hour as f64 + minute as f64 / 60.0 + second as f64 / 3600.0) / 24.0;

    whole as f64 + 1_721_013.5 + day_fraction
}

/// Greenwich Mean Sidereal Time in hours, [0, 24).
///
/// Splits the Julian Date into the midnight nearest below its half-day
/// boundary and the fractional hours against it, then evaluates the
/// IAU 1982-style polynomial.
pub fn gmst(date: &CivilDate, time: &CivilTime) -> f64 {
    let jd = julian_date(date.year, date.month, date.day, time.hour, time.minute, time.second);

    let midnight = jd.floor() + 0.5;
    let hours_since_midnight = (jd - midnight) * 24.0;
    let centuries_since_epoch = (jd - J2000_JD) / DAYS_PER_JULIAN_CENTURY;
    let whole_days_since_epoch = midnight - J2000_JD;

    let raw = 6.697374558
        + 0.06570982441908 * whole_days_since_epoch
        + 1.00273790935 * hours_since_midnight
        + 0.000026 * centuries_since_epoch * centuries_since_epoch;

    sexagesimal_reassemble(raw)
}

/// Sexagesimal display rounding applied to the raw polynomial value:
/// whole hours by truncation, minutes rounded to two decimals, whole
/// seconds re-extracted from the rounded minutes, then reassembled.
/// The truncate/round/floor chain is part of the output contract.
fn sexagesimal_reassemble(raw: f64) -> f64 {
    let hours = (raw.trunc() as i64).rem_euclid(24) as f64;
    let minutes = round_dp((raw - raw.trunc()) * 60.0, 2);
    let seconds = (round_dp(minutes - minutes.trunc(), 2) * 60.0).trunc();
    let minutes = minutes.floor();

    hours + minutes / 60.0 + seconds / 3600.0
}

/// Local Sidereal Time in hours, [0, 24), for an observer longitude in
/// degrees (east positive).
pub fn lst(gmst: f64, longitude: f64) -> f64 {
    (gmst + longitude / 15.0).rem_euclid(24.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_julian_date_j2000_epoch() {
        // 2000-01-01 12:00:00 UT is the J2000.0 epoch
        let jd = julian_date(2000, 1, 1, 12, 0, 0);
        assert!((jd - 2_451_545.0).abs() < EPS);
    }

    #[test]
    fn test_julian_date_midnight_boundary() {
        let jd = julian_date(2000, 1, 1, 18, 0, 0);
        assert!((jd - 2_451_545.25).abs() < EPS);

        let jd = julian_date(2000, 1, 1, 0, 0, 0);
        assert!((jd - 2_451_544.5).abs() < EPS);
    }

    #[test]
    fn test_julian_date_monotonic() {
        let instants = [
            (1999, 12, 31, 23, 59, 59),
            (2000, 1, 1, 0, 0, 0),
            (2000, 1, 1, 12, 0, 0),
            (2000, 2, 29, 6, 30, 0),
            (2000, 3, 1, 0, 0, 0),
            (2012, 7, 15, 4, 45, 12),
            (2024, 1, 1, 0, 0, 1),
            (2024, 12, 31, 23, 0, 0),
        ];
        let jds: Vec<f64> = instants
            .iter()
            .map(|&(y, mo, d, h, mi, s)| julian_date(y, mo, d, h, mi, s))
            .collect();
        for pair in jds.windows(2) {
            assert!(pair[0] < pair[1], "expected {} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_gmst_j2000_noon() {
        // Raw polynomial value at the epoch is -5.302625442 hours; the
        // truncate/round/floor chain lands on 19h -19m -9s.
        let date = CivilDate { year: 2000, month: 1, day: 1 };
        let time = CivilTime { hour: 12, minute: 0, second: 0 };
        let expected = 19.0 - 19.0 / 60.0 - 9.0 / 3600.0;
        assert!((gmst(&date, &time) - expected).abs() < EPS);
    }

    #[test]
    fn test_gmst_j2000_evening() {
        // 2000-01-01 18:00 UT: raw value 0.713802014, reassembled as
        // 0h 42m 49s.
        let date = CivilDate { year: 2000, month: 1, day: 1 };
        let time = CivilTime { hour: 18, minute: 0, second: 0 };
        let expected = 42.0 / 60.0 + 49.0 / 3600.0;
        assert!((gmst(&date, &time) - expected).abs() < EPS);
    }

    #[test]
    fn test_gmst_in_range() {
        let samples = [
            (1995, 6, 1, 3, 20, 10),
            (2005, 11, 23, 17, 5, 0),
            (2024, 3, 8, 23, 59, 59),
        ];
        for &(y, mo, d, h, mi, s) in &samples {
            let g = gmst(
                &CivilDate { year: y, month: mo, day: d },
                &CivilTime { hour: h, minute: mi, second: s },
            );
            assert!((0.0..24.0).contains(&g), "gmst {} out of range", g);
        }
    }

    #[test]
    fn test_lst_simple_offset() {
        // 15 degrees east is exactly one sidereal hour ahead
        assert!((lst(6.0, 15.0) - 7.0).abs() < EPS);
    }

    #[test]
    fn test_lst_always_in_range() {
        let cases = [
            (23.5, 147.3058),
            (1.0, -170.0),
            (0.0, -180.0),
            (12.0, 0.0),
            (23.999, 179.999),
        ];
        for &(g, long) in &cases {
            let l = lst(g, long);
            assert!((0.0..24.0).contains(&l), "lst({}, {}) = {}", g, long, l);
        }
    }

    #[test]
    fn test_lst_wraps_negative_sum() {
        // 1h - 11.333h would be negative; the result must wrap forward
        let l = lst(1.0, -170.0);
        assert!((l - (1.0 - 170.0 / 15.0 + 24.0)).abs() < EPS);
    }
}
