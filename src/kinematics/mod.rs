//! Relativistic kinematics of two-body systems.
//!
//! All functions are pure: masses in GeV/c^2, momenta in GeV/c, energies in
//! GeV and angles in radians. Formulas that take a square root of something
//! that can turn negative near the kinematic boundary return a `DomainError`
//! rather than NaN.

use std::f64::consts;

use crate::constants::*;
use crate::geometry::{FourVector, ThreeVector};

mod error;
pub use error::*;

fn checked_sqrt(x: f64, formula: &'static str) -> Result<f64, DomainError> {
    if x >= 0.0 {
        Ok(x.sqrt())
    } else {
        // also catches NaN
        Err(DomainError::new(formula, x))
    }
}

/// Total energy of a particle with momentum `p` and mass `m`.
pub fn energy(p: f64, m: f64) -> f64 {
    (p * p + m * m).sqrt()
}

/// Invariant mass of a projectile, mass `m_moving` and momentum
/// `p_moving`, striking a stationary target of mass `m_rest`.
pub fn invariant_mass_fixed_target(m_moving: f64, m_rest: f64, p_moving: f64) -> f64 {
    (m_moving * m_moving + m_rest * m_rest + 2.0 * m_rest * energy(p_moving, m_moving)).sqrt()
}

/// Squared invariant mass of two moving bodies, with energies `e1`, `e2`
/// and momenta `p1`, `p2`, whose momenta subtend `angle`.
pub fn invariant_mass_sqr(e1: f64, e2: f64, p1: f64, p2: f64, angle: f64) -> f64 {
    (e1 + e2).powi(2) - p1 * p1 - p2 * p2 - 2.0 * p1 * p2 * angle.cos()
}

/// Invariant mass of two moving bodies, see [invariant_mass_sqr].
pub fn invariant_mass(e1: f64, e2: f64, p1: f64, p2: f64, angle: f64) -> Result<f64, DomainError> {
    checked_sqrt(invariant_mass_sqr(e1, e2, p1, p2, angle), "invariant mass")
}

/// Mass of the heavier partner of a bound two-body system of total mass
/// `m_total`, given that the lighter partner (the spectator, mass `m_spectator`)
/// carries momentum `p` in the rest frame of the system:
/// ```text
/// m_eff^2 = m_total^2 + m_spectator^2 - 2 m_total sqrt(m_spectator^2 + p^2)
/// ```
pub fn effective_bound_mass(m_total: f64, m_spectator: f64, p: f64) -> Result<f64, DomainError> {
    let m2 = m_total * m_total + m_spectator * m_spectator - 2.0 * m_total * energy(p, m_spectator);
    checked_sqrt(m2, "effective bound mass")
}

/// Momentum of the beam proton in the frame where the bound target proton,
/// of effective mass `m_eff`, is at rest. `e1`, `p1` refer to the beam and
/// `e2`, `p2` to the target proton, both in the lab, with `angle` between
/// their momenta.
pub fn effective_momentum(e1: f64, e2: f64, p1: f64, p2: f64, angle: f64, m_eff: f64) -> Result<f64, DomainError> {
    let s = invariant_mass_sqr(e1, e2, p1, p2, angle);
    if !(s >= 0.0) {
        return Err(DomainError::new("effective momentum (invariant mass)", s));
    }
    if !(m_eff > 0.0) {
        return Err(DomainError::new("effective momentum (target mass)", m_eff));
    }
    let e_beam = (s - PROTON_MASS * PROTON_MASS - m_eff * m_eff) / (2.0 * m_eff);
    checked_sqrt(e_beam * e_beam - PROTON_MASS * PROTON_MASS, "effective momentum")
}

/// Momentum of either daughter in the rest frame of a parent of mass
/// `m_parent` that decays to two bodies of mass `m1` and `m2`.
pub fn two_body_decay_momentum(m_parent: f64, m1: f64, m2: f64) -> Result<f64, DomainError> {
    if !(m_parent > 0.0) {
        return Err(DomainError::new("two-body decay momentum (parent mass)", m_parent));
    }
    let a = m_parent * m_parent - m1 * m1 - m2 * m2;
    let p = checked_sqrt(a * a - 4.0 * m1 * m1 * m2 * m2, "two-body decay momentum")?;
    if a < 0.0 {
        // below threshold: the radicand is positive again, but the root is unphysical
        Err(DomainError::new("two-body decay momentum (below threshold)", m_parent))
    } else {
        Ok(p / (2.0 * m_parent))
    }
}

/// Velocity of the centre-of-mass frame of a beam, momentum `p` and mass
/// `m_beam`, incident on a stationary target of mass `m_target`.
pub fn beta_cm(p: f64, m_beam: f64, m_target: f64) -> f64 {
    p / (m_target + energy(p, m_beam))
}

/// Lorentz factor corresponding to `beta`, which must lie in [0, 1).
pub fn gamma_cm(beta: f64) -> Result<f64, DomainError> {
    if beta >= 0.0 && beta < 1.0 {
        Ok(1.0 / (1.0 - beta * beta).sqrt())
    } else {
        Err(DomainError::new("Lorentz factor", beta))
    }
}

/// Four-momentum of a particle of `mass`, with momentum of magnitude
/// `momentum` along the direction (`theta`, `phi`).
pub fn four_vector_from_spherical(mass: f64, momentum: f64, theta: f64, phi: f64) -> FourVector {
    FourVector::from_vector_and_mass(ThreeVector::from_spherical(momentum, theta, phi), mass)
}

/// Relativistic Breit-Wigner line shape, normalised to unit area, of a
/// state with the given `mass` and `width`.
pub fn breit_wigner(x: f64, mass: f64, width: f64) -> f64 {
    width / (2.0 * consts::PI * ((x - mass).powi(2) + 0.25 * width * width))
}

/// The peak value of [breit_wigner], attained at `x == mass`.
pub fn breit_wigner_peak(width: f64) -> f64 {
    2.0 / (consts::PI * width)
}
