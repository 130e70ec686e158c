//! Vectors and the angles between them

use std::f64::consts;

mod four_vector;
pub use four_vector::*;

mod three_vector;
pub use three_vector::*;

/// Maps an azimuthal angle onto the canonical range [-pi, pi).
pub fn normalize_azimuth(phi: f64) -> f64 {
    let phi = (phi + consts::PI).rem_euclid(2.0 * consts::PI) - consts::PI;
    // rem_euclid can round up to 2 pi for tiny negative arguments
    if phi >= consts::PI {
        phi - 2.0 * consts::PI
    } else {
        phi
    }
}

/// Returns the polar and azimuthal angles of the direction opposite
/// to (`theta`, `phi`), i.e. (pi - theta, phi + pi), with the azimuth
/// wrapped into [-pi, pi).
pub fn mirror(theta: f64, phi: f64) -> (f64, f64) {
    (consts::PI - theta, normalize_azimuth(phi + consts::PI))
}
