///! Equatorial-to-horizontal conversion and the visibility evaluator
use std::f64::consts::PI;

use stargaze_common::{CatalogEntry, VisibleEntry};

use super::round_dp;

/// Convert equatorial coordinates to horizontal azimuth/altitude, both
/// in degrees.
///
/// `ra` and `lst` are in hour units and are scaled by 15 before the
/// conversion; `dec` and `lat` are in degrees. The hour angle is
/// normalized into the [-pi, pi) band before the trigonometry.
pub fn equatorial_to_horizontal(ra: f64, dec: f64, lat: f64, lst: f64) -> (f64, f64) {
    let ra = (ra * 15.0).to_radians();
    let dec = dec.to_radians();
    let lat = lat.to_radians();
    let lst = (lst * 15.0).to_radians();

    let hour_angle = (lst - ra + PI).rem_euclid(2.0 * PI) - PI;

    let alt = clamp_unit(dec.sin() * lat.sin() + dec.cos() * lat.cos() * hour_angle.cos()).asin();
    let mut az =
        clamp_unit((dec.sin() - lat.sin() * alt.sin()) / (lat.cos() * alt.cos())).acos();

    // acos alone cannot tell east from west
    if hour_angle.sin() > 0.0 {
        az = 2.0 * PI - az;
    }

    (az.to_degrees(), alt.to_degrees())
}

/// The meridian and pole cases land exactly on +/-1 and drift past it
/// in floating point; asin/acos would return NaN there.
fn clamp_unit(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

/// Evaluate which catalog entries are up for an observer latitude and
/// local sidereal time.
///
/// An entry counts as visible when both azimuth and altitude are
/// strictly positive (a bearing of exactly due north is excluded).
/// Output keeps catalog iteration order; coordinates are rounded to
/// three fractional digits.
pub fn visible_entries(lat: f64, lst: f64, catalog: &[CatalogEntry]) -> Vec<VisibleEntry> {
    let mut visible = Vec::new();
    for entry in catalog {
        let (az, alt) = equatorial_to_horizontal(entry.ra, entry.dec, lat, lst);
        if az > 0.0 && alt > 0.0 {
            visible.push(VisibleEntry::new(entry.clone(), round_dp(az, 3), round_dp(alt, 3)));
        }
    }
    visible
}
