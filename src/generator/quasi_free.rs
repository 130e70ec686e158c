//! Quasi-free proton-proton scattering on a deuteron, pd -> pp n,
//! with the neutron as a spectator

use crate::constants::*;
use crate::distribution::DensityTable;
use crate::geometry::*;
use crate::kinematics::*;
use crate::particle::{Event, Species};
use crate::sampler::UniformSampler;

use super::{Attempt, BeamSettings, Reaction, Rejection};

static DIAGNOSTICS: [&str; 19] = [
    "p_beam",       // lab frame
    "sqrt_s_pd",
    "beta_cm_pd",
    "gamma_cm_pd",
    "p_fermi",      // spectator, lab frame
    "theta_n",
    "phi_n",
    "m_eff",        // bound proton
    "sqrt_s_pp",
    "p_eff",
    "p_cm",         // pp CM frame
    "theta_scatt",
    "phi_scatt",
    "p_p1",         // lab frame
    "theta_p1",
    "phi_p1",
    "p_p2",
    "theta_p2",
    "phi_p2",
];

/// The beam proton scatters elastically off the proton bound in the
/// deuteron target, which is off shell: it carries the momentum
/// opposite to the spectator neutron and the mass left over once the
/// neutron is on shell.
#[derive(Clone, Debug, PartialEq)]
pub struct QuasiFree {
    beam: BeamSettings,
    cutoff: f64,
}

impl QuasiFree {
    /// Spectator momenta are drawn uniformly from [0, cutoff) before
    /// the acceptance test.
    pub fn new(beam: BeamSettings, cutoff: f64) -> Self {
        QuasiFree { beam, cutoff }
    }

    pub fn beam(&self) -> BeamSettings {
        self.beam
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Spectator momentum above which the effective mass of the
    /// bound proton is undefined
    pub fn domain_limit() -> f64 {
        let e = (DEUTERON_MASS.powi(2) + NEUTRON_MASS.powi(2)) / (2.0 * DEUTERON_MASS);
        (e * e - NEUTRON_MASS.powi(2)).sqrt()
    }
}

impl Reaction for QuasiFree {
    fn name(&self) -> &'static str {
        "quasi-free"
    }

    fn final_state_size(&self) -> usize {
        3
    }

    fn diagnostic_names(&self) -> &'static [&'static str] {
        &DIAGNOSTICS
    }

    fn pair_names(&self) -> [&'static str; 2] {
        ["p_eff", "theta_scatt"]
    }

    fn generate(&self, sampler: &mut UniformSampler, table: &DensityTable, event: &mut Event) -> Result<Attempt, DomainError> {
        let p_beam = sampler.uniform(self.beam.momentum_min, self.beam.momentum_max);
        let theta = sampler.polar_angle();
        let phi = sampler.azimuth();
        let p_fermi = sampler.uniform(0.0, self.cutoff);

        if !(table.evaluate(p_fermi) > sampler.unit() * table.max_density()) {
            return Ok(Attempt::Rejected(Rejection::Density));
        }

        // Lab frame, in which the deuteron is at rest
        let beam = FourVector::from_vector_and_mass(ThreeVector::new(0.0, 0.0, p_beam), PROTON_MASS);
        let spectator = four_vector_from_spherical(NEUTRON_MASS, p_fermi, theta, phi);

        let m_eff = effective_bound_mass(DEUTERON_MASS, NEUTRON_MASS, p_fermi)?;
        let (theta_p, phi_p) = mirror(theta, phi);
        let partner = four_vector_from_spherical(m_eff, p_fermi, theta_p, phi_p);

        let angle = ThreeVector::from(beam).angle_to(ThreeVector::from(partner));
        let sqrt_s_pp = invariant_mass(beam.energy(), partner.energy(), p_beam, p_fermi, angle)?;
        let p_eff = effective_momentum(beam.energy(), partner.energy(), p_beam, p_fermi, angle, m_eff)?;

        // pp CM frame, where the elastic scattering leaves
        // the momentum magnitude unchanged
        let b = (beam + partner).boost_vector();
        let p_cm = beam.boost(-b)?.momentum();

        let theta_s = sampler.polar_angle();
        let phi_s = sampler.azimuth();
        let (theta_2, phi_2) = mirror(theta_s, phi_s);

        let p1 = four_vector_from_spherical(PROTON_MASS, p_cm, theta_s, phi_s).boost(b)?;
        let p2 = four_vector_from_spherical(m_eff, p_cm, theta_2, phi_2).boost(b)?;

        let beta = beta_cm(p_beam, PROTON_MASS, DEUTERON_MASS);

        event.clear();
        event.push(Species::Neutron, spectator);
        event.push(Species::Proton, p1);
        event.push(Species::Proton, p2);
        event
            .with_pair(p_eff, theta_s)
            .with_diagnostics(&[
                p_beam,
                invariant_mass_fixed_target(PROTON_MASS, DEUTERON_MASS, p_beam),
                beta,
                gamma_cm(beta)?,
                p_fermi,
                theta,
                phi,
                m_eff,
                sqrt_s_pp,
                p_eff,
                p_cm,
                theta_s,
                phi_s,
                p1.momentum(),
                p1.theta(),
                p1.phi(),
                p2.momentum(),
                p2.theta(),
                p2.phi(),
            ]);

        Ok(Attempt::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DensityTable {
        DensityTable::parse("0.0 0.0\n0.02 1.5\n0.05 2.0\n0.1 1.2\n0.2 0.3\n0.3 0.05\n0.4 0.01").unwrap()
    }

    fn accept(reaction: &QuasiFree, sampler: &mut UniformSampler, table: &DensityTable) -> Event {
        let mut event = Event::new();
        loop {
            match reaction.generate(sampler, table, &mut event) {
                Ok(Attempt::Accepted) => return event,
                Ok(Attempt::Rejected(why)) => assert_eq!(why, Rejection::Density),
                Err(e) => panic!("unexpected domain error: {}", e),
            }
        }
    }

    #[test]
    fn fixed_seed_determinism() {
        let reaction = QuasiFree::new(BeamSettings::default(), FERMI_MOMENTUM_CUTOFF);
        let table = table();

        let mut sampler = UniformSampler::from_seed(2017);
        let first = accept(&reaction, &mut sampler, &table);
        let mut sampler = UniformSampler::from_seed(2017);
        let second = accept(&reaction, &mut sampler, &table);

        println!("{}", first);
        assert_eq!(first.particles(), second.particles());
        assert_eq!(first.pair(), second.pair());
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn final_state() {
        let reaction = QuasiFree::new(BeamSettings::default(), FERMI_MOMENTUM_CUTOFF);
        let table = table();
        let mut sampler = UniformSampler::from_seed(0);

        for _ in 0..1000 {
            let event = accept(&reaction, &mut sampler, &table);
            let pt = event.particles();
            let diag = event.diagnostics();
            let (p_beam, m_eff, sqrt_s_pp) = (diag[0], diag[7], diag[8]);

            assert_eq!(pt[0].species(), Species::Neutron);
            assert_eq!(pt[1].species(), Species::Proton);
            assert_eq!(pt[2].species(), Species::Proton);
            assert!(p_beam >= BEAM_MOMENTUM_MIN && p_beam < BEAM_MOMENTUM_MAX);

            // spectator is on shell and untouched by the scattering
            let n = pt[0].momentum();
            assert!((n.mass() - NEUTRON_MASS).abs() < 1.0e-9);
            assert!((n.momentum() - diag[4]).abs() < 1.0e-12);
            assert!(n.momentum() < FERMI_MOMENTUM_CUTOFF);

            // rescattered protons: the second keeps the effective mass
            let (p1, p2) = (pt[1].momentum(), pt[2].momentum());
            assert!((p1.mass() - PROTON_MASS).abs() < 1.0e-9);
            assert!((p2.mass() - m_eff).abs() < 1.0e-9);
            assert!(m_eff < PROTON_MASS);
            assert!(((p1 + p2).mass() - sqrt_s_pp).abs() < 1.0e-9);

            // momentum closure: n + p1 + p2 = beam + target
            let total = ThreeVector::from(event.total_momentum());
            let initial = ThreeVector::new(0.0, 0.0, p_beam);
            assert!((total - initial).norm() < 1.0e-9, "total = {}, initial = {}", total, initial);
        }
    }

    #[test]
    fn effective_momentum_is_beam_momentum_in_target_rest_frame() {
        let reaction = QuasiFree::new(BeamSettings::default(), FERMI_MOMENTUM_CUTOFF);
        let table = table();
        let mut sampler = UniformSampler::from_seed(1);

        for _ in 0..100 {
            let event = accept(&reaction, &mut sampler, &table);
            let diag = event.diagnostics();
            let (p_beam, m_eff) = (diag[0], diag[7]);
            let (p_eff, theta_s) = event.pair();

            let spectator = ThreeVector::from(event.particles()[0].momentum());
            let partner = FourVector::from_vector_and_mass(-spectator, m_eff);
            let beam = FourVector::from_vector_and_mass(ThreeVector::new(0.0, 0.0, p_beam), PROTON_MASS);
            let expected = beam.boost(-partner.boost_vector()).unwrap().momentum();

            assert!((p_eff - expected).abs() < 1.0e-9 * expected, "p_eff = {}, expected {}", p_eff, expected);
            assert!(theta_s >= 0.0 && theta_s <= std::f64::consts::PI);
        }
    }

    #[test]
    fn scattering_is_back_to_back_in_cm() {
        let reaction = QuasiFree::new(BeamSettings::default(), FERMI_MOMENTUM_CUTOFF);
        let table = table();
        let mut sampler = UniformSampler::from_seed(5);

        for _ in 0..100 {
            let event = accept(&reaction, &mut sampler, &table);
            let (p1, p2) = (event.particles()[1].momentum(), event.particles()[2].momentum());
            let b = (p1 + p2).boost_vector();
            let (q1, q2) = (p1.boost(-b).unwrap(), p2.boost(-b).unwrap());
            let angle = ThreeVector::from(q1).angle_to(ThreeVector::from(q2));
            assert!((angle - std::f64::consts::PI).abs() < 1.0e-6);
            assert!((q1.momentum() - event.diagnostics()[10]).abs() < 1.0e-9);
        }
    }

    #[test]
    fn domain_limit() {
        let p = QuasiFree::domain_limit();
        println!("effective mass undefined above p = {:.6} GeV/c", p);
        assert!(effective_bound_mass(DEUTERON_MASS, NEUTRON_MASS, 0.999 * p).is_ok());
        assert!(effective_bound_mass(DEUTERON_MASS, NEUTRON_MASS, 1.001 * p).is_err());
    }
}
