///! Astronomical time and coordinate math
///!
///! Pure functions, no I/O: Julian Date, Greenwich Mean Sidereal Time,
///! Local Sidereal Time, equatorial-to-horizontal conversion, and the
///! visibility evaluator built on top of them.

// ============ Sidereal Time ============
mod time;
pub use time::{gmst, julian_date, lst, CivilDate, CivilTime};

// ============ Coordinate Conversion & Visibility ============
mod coords;
pub use coords::{equatorial_to_horizontal, visible_entries};

// ============ Civil Inputs ============
mod observer;
pub use observer::{
    current_time_date, fix_long_lat, parse_date, parse_time, resolve_observation, utc_shift,
    Observation,
};

/// Round to a fixed number of fractional digits, half away from zero.
pub(crate) fn round_dp(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
