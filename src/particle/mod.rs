//! Particles and events

use std::fmt;

use crate::geometry::*;

#[derive(Copy,Clone,Debug,PartialEq,Eq)]
pub enum Species {
    Proton,
    Neutron,
    Deuteron,
    Photon,
}

impl Species {
    /// Short name used in the event records
    pub fn tag(&self) -> &'static str {
        match self {
            Species::Proton => "p",
            Species::Neutron => "n",
            Species::Deuteron => "d",
            Species::Photon => "g",
        }
    }

    /// Particle Data Group numbering scheme
    #[cfg_attr(not(feature = "hdf5-output"), allow(unused))]
    pub fn pdg_code(&self) -> i32 {
        match self {
            Species::Proton => 2212,
            Species::Neutron => 2112,
            Species::Deuteron => 1000010020,
            Species::Photon => 22,
        }
    }
}

/// A final-state particle: its identity and lab-frame four-momentum.
/// The mass is that of the four-momentum, which for an off-shell
/// nucleon differs from the free mass.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct ParticleRecord {
    species: Species,
    momentum: FourVector,
}

impl fmt::Display for ParticleRecord {
    // species px py pz (GeV/c) m (GeV)
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let p = self.momentum;
        write!(f,
            "{}\t{:.6e}\t{:.6e}\t{:.6e}\t{:.6e}",
            self.species.tag(),
            p.px(), p.py(), p.pz(),
            p.mass(),
        )
    }
}

impl ParticleRecord {
    pub fn new(species: Species, momentum: FourVector) -> Self {
        ParticleRecord { species, momentum }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    /// Four-momentum, in GeV
    pub fn momentum(&self) -> FourVector {
        self.momentum
    }
}

/// The largest final state generated by any reaction
pub const MAX_PARTICLES: usize = 4;

/// The largest number of diagnostic quantities recorded per event
pub const MAX_DIAGNOSTICS: usize = 20;

/// A generated event, stored inline so that building one
/// in the rejection loop does not touch the heap.
#[derive(Copy,Clone,Debug)]
pub struct Event {
    particles: [ParticleRecord; MAX_PARTICLES],
    len: usize,
    pair: [f64; 2],
    diagnostics: [f64; MAX_DIAGNOSTICS],
    num_diagnostics: usize,
}

impl Default for Event {
    fn default() -> Self {
        let placeholder = ParticleRecord::new(Species::Photon, FourVector::new(0.0, 0.0, 0.0, 0.0));
        Event {
            particles: [placeholder; MAX_PARTICLES],
            len: 0,
            pair: [0.0; 2],
            diagnostics: [0.0; MAX_DIAGNOSTICS],
            num_diagnostics: 0,
        }
    }
}

impl fmt::Display for Event {
    // npart impact_parameter reaction_plane_angle, then one line per particle
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{:.6e}\t{:.6e}", self.len, 0.0, 0.0)?;
        for pt in self.particles() {
            write!(f, "\n{}", pt)?;
        }
        Ok(())
    }
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the event, keeping its storage
    pub fn clear(&mut self) {
        self.len = 0;
        self.num_diagnostics = 0;
        self.pair = [0.0; 2];
    }

    /// Appends a particle to the final state.
    ///
    /// # Panics
    /// Panics if the event already holds `MAX_PARTICLES` particles.
    pub fn push(&mut self, species: Species, momentum: FourVector) {
        assert!(self.len < MAX_PARTICLES, "final state cannot hold more than {} particles", MAX_PARTICLES);
        self.particles[self.len] = ParticleRecord::new(species, momentum);
        self.len += 1;
    }

    /// Records the pair of quantities written to the per-event sidecar
    pub fn with_pair(&mut self, a: f64, b: f64) -> &mut Self {
        self.pair = [a, b];
        self
    }

    /// Records diagnostic quantities, in the order named by the reaction.
    /// Values beyond `MAX_DIAGNOSTICS` are discarded.
    pub fn with_diagnostics(&mut self, values: &[f64]) -> &mut Self {
        let n = values.len().min(MAX_DIAGNOSTICS);
        self.diagnostics[..n].copy_from_slice(&values[..n]);
        self.num_diagnostics = n;
        self
    }

    /// Number of particles in the final state
    pub fn npart(&self) -> usize {
        self.len
    }

    pub fn particles(&self) -> &[ParticleRecord] {
        &self.particles[..self.len]
    }

    pub fn pair(&self) -> (f64, f64) {
        (self.pair[0], self.pair[1])
    }

    pub fn diagnostics(&self) -> &[f64] {
        &self.diagnostics[..self.num_diagnostics]
    }

    /// Sum of the four-momenta of all particles in the final state
    #[allow(unused)]
    pub fn total_momentum(&self) -> FourVector {
        self.particles().iter()
            .fold(FourVector::new(0.0, 0.0, 0.0, 0.0), |acc, pt| acc + pt.momentum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn event_format() {
        let mut event = Event::new();
        event.push(Species::Neutron, FourVector::from_vector_and_mass(ThreeVector::new(0.0, 0.0, 0.1), NEUTRON_MASS));
        event.push(Species::Proton, FourVector::from_vector_and_mass(ThreeVector::new(0.3, 0.0, 1.2), PROTON_MASS));
        event.with_pair(1.5, 0.25);

        let output = event.to_string();
        println!("{}", output);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "2\t0.000000e0\t0.000000e0");
        assert!(lines[1].starts_with("n\t0.000000e0\t0.000000e0\t1.000000e-1\t9.39565"));
        assert!(lines[2].starts_with("p\t3.000000e-1\t"));
        assert_eq!(event.pair(), (1.5, 0.25));
    }

    #[test]
    fn clear_and_reuse() {
        let mut event = Event::new();
        for _ in 0..MAX_PARTICLES {
            event.push(Species::Photon, FourVector::new(1.0, 0.0, 0.0, 1.0));
        }
        event.with_diagnostics(&[1.0, 2.0, 3.0]);
        assert_eq!(event.npart(), MAX_PARTICLES);
        assert_eq!(event.diagnostics(), &[1.0, 2.0, 3.0]);
        assert_eq!(event.total_momentum(), FourVector::new(4.0, 0.0, 0.0, 4.0));

        event.clear();
        assert_eq!(event.npart(), 0);
        assert!(event.diagnostics().is_empty());
        assert_eq!(event.to_string(), "0\t0.000000e0\t0.000000e0");
    }

    #[test]
    #[should_panic]
    fn overfull_event() {
        let mut event = Event::new();
        for _ in 0..=MAX_PARTICLES {
            event.push(Species::Proton, FourVector::new(PROTON_MASS, 0.0, 0.0, 0.0));
        }
    }

    #[test]
    fn off_shell_mass() {
        let m_eff = 0.92;
        let p = FourVector::from_vector_and_mass(ThreeVector::new(0.0, 0.2, 0.0), m_eff);
        let pt = ParticleRecord::new(Species::Proton, p);
        assert!((pt.momentum().mass() - m_eff).abs() < 1.0e-12);
        assert!(pt.species() == Species::Proton && PROTON_MASS > m_eff);
    }
}
