//! Formation and decay of a bound helium-3/eta state in proton-deuteron
//! collisions: pd -> (3He-eta)_bound -> d N*(1535) -> p d pi0 -> p d gg

use crate::constants::*;
use crate::distribution::DensityTable;
use crate::geometry::*;
use crate::kinematics::*;
use crate::particle::{Event, Species};
use crate::sampler::UniformSampler;

use super::{Attempt, BeamSettings, Reaction, Rejection};

static DIAGNOSTICS: [&str; 18] = [
    "p_beam",
    "sqrt_s",
    "q",
    "p_fermi",      // N*, CM frame
    "theta_nstar",
    "phi_nstar",
    "m_nstar",
    "p_decay",      // proton, N* rest frame
    "theta_p_nstar",
    "phi_p_nstar",
    "theta_g_pi0",  // first photon, pi0 rest frame
    "phi_g_pi0",
    "p_p",          // lab frame
    "theta_p",
    "p_d",
    "theta_d",
    "e_g1",
    "e_g2",
];

/// The bound state is populated according to a Breit-Wigner
/// distribution in the total CM energy. Inside it, an N*(1535) with
/// momentum drawn from the momentum distribution recoils against the
/// deuteron and decays to a proton and a neutral pion.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundState {
    beam: BeamSettings,
    cutoff: f64,
    width: f64,
    binding_energy: f64,
}

impl BoundState {
    pub const DEFAULT_WIDTH: f64 = 0.01;
    pub const DEFAULT_BINDING_ENERGY: f64 = 0.01;

    pub fn new(beam: BeamSettings, cutoff: f64, width: f64, binding_energy: f64) -> Self {
        BoundState { beam, cutoff, width, binding_energy }
    }

    pub fn beam(&self) -> BeamSettings {
        self.beam
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn binding_energy(&self) -> f64 {
        self.binding_energy
    }

    /// Production threshold of free helium-3 and eta
    pub fn threshold() -> f64 {
        HELIUM_3_MASS + ETA_MASS
    }

    /// Mass of the bound state
    pub fn pole_mass(&self) -> f64 {
        Self::threshold() - self.binding_energy
    }
}

impl Reaction for BoundState {
    fn name(&self) -> &'static str {
        "bound-state"
    }

    fn final_state_size(&self) -> usize {
        4
    }

    fn diagnostic_names(&self) -> &'static [&'static str] {
        &DIAGNOSTICS
    }

    fn pair_names(&self) -> [&'static str; 2] {
        ["q", "theta_p_nstar"]
    }

    fn generate(&self, sampler: &mut UniformSampler, table: &DensityTable, event: &mut Event) -> Result<Attempt, DomainError> {
        let p_beam = sampler.uniform(self.beam.momentum_min, self.beam.momentum_max);
        let sqrt_s = invariant_mass_fixed_target(PROTON_MASS, DEUTERON_MASS, p_beam);

        let line_shape = breit_wigner(sqrt_s, self.pole_mass(), self.width);
        if !(line_shape > sampler.unit() * breit_wigner_peak(self.width)) {
            return Ok(Attempt::Rejected(Rejection::Resonance));
        }

        let theta = sampler.polar_angle();
        let phi = sampler.azimuth();
        let p_fermi = sampler.uniform(0.0, self.cutoff);

        if !(table.evaluate(p_fermi) > sampler.unit() * table.max_density()) {
            return Ok(Attempt::Rejected(Rejection::Density));
        }

        let m_nstar = effective_bound_mass(sqrt_s, DEUTERON_MASS, p_fermi)?;
        if m_nstar <= PROTON_MASS + PI_0_MASS {
            return Ok(Attempt::Rejected(Rejection::Threshold));
        }

        // CM frame
        let nstar = four_vector_from_spherical(m_nstar, p_fermi, theta, phi);
        let (theta_d, phi_d) = mirror(theta, phi);
        let deuteron = four_vector_from_spherical(DEUTERON_MASS, p_fermi, theta_d, phi_d);

        // N* rest frame
        let p_decay = two_body_decay_momentum(m_nstar, PROTON_MASS, PI_0_MASS)?;
        let theta_p = sampler.polar_angle();
        let phi_p = sampler.azimuth();
        let (theta_pi, phi_pi) = mirror(theta_p, phi_p);
        let proton = four_vector_from_spherical(PROTON_MASS, p_decay, theta_p, phi_p);
        let pion = four_vector_from_spherical(PI_0_MASS, p_decay, theta_pi, phi_pi);

        // pi0 rest frame
        let theta_g = sampler.polar_angle();
        let phi_g = sampler.azimuth();
        let (theta_g2, phi_g2) = mirror(theta_g, phi_g);
        let g1 = four_vector_from_spherical(0.0, 0.5 * PI_0_MASS, theta_g, phi_g);
        let g2 = four_vector_from_spherical(0.0, 0.5 * PI_0_MASS, theta_g2, phi_g2);

        let to_lab = (
            FourVector::from_vector_and_mass(ThreeVector::new(0.0, 0.0, p_beam), PROTON_MASS)
            + FourVector::new(DEUTERON_MASS, 0.0, 0.0, 0.0)
        ).boost_vector();
        let to_cm = nstar.boost_vector();
        let to_nstar = pion.boost_vector();

        let proton = proton.boost(to_cm)?.boost(to_lab)?;
        let deuteron = deuteron.boost(to_lab)?;
        let g1 = g1.boost(to_nstar)?.boost(to_cm)?.boost(to_lab)?;
        let g2 = g2.boost(to_nstar)?.boost(to_cm)?.boost(to_lab)?;

        let q = sqrt_s - Self::threshold();

        event.clear();
        event.push(Species::Proton, proton);
        event.push(Species::Deuteron, deuteron);
        event.push(Species::Photon, g1);
        event.push(Species::Photon, g2);
        event
            .with_pair(q, theta_p)
            .with_diagnostics(&[
                p_beam,
                sqrt_s,
                q,
                p_fermi,
                theta,
                phi,
                m_nstar,
                p_decay,
                theta_p,
                phi_p,
                theta_g,
                phi_g,
                proton.momentum(),
                proton.theta(),
                deuteron.momentum(),
                deuteron.theta(),
                g1.energy(),
                g2.energy(),
            ]);

        Ok(Attempt::Accepted)
    }
}
