//! Event generation by rejection sampling

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use enum_dispatch::enum_dispatch;

use crate::constants::*;
use crate::distribution::DensityTable;
use crate::input::{ettc, PrettyDuration};
use crate::kinematics::DomainError;
use crate::output::EventSink;
use crate::particle::Event;
use crate::sampler::UniformSampler;

mod error;
mod quasi_free;
mod bound_state;
mod config;

pub use error::*;
pub use quasi_free::*;
pub use bound_state::*;
pub use config::*;

/// Why a candidate was discarded
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Rejection {
    /// Failed the acceptance test against the momentum distribution
    Density,
    /// Failed the acceptance test against the resonance line shape
    Resonance,
    /// Kinematically forbidden final state
    Threshold,
}

/// Outcome of a single candidate draw
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Attempt {
    Accepted,
    Rejected(Rejection),
}

/// A reaction that can be sampled one candidate at a time.
#[enum_dispatch]
pub trait Reaction {
    /// Short name, used to label output
    fn name(&self) -> &'static str;

    /// Number of particles in each generated event
    fn final_state_size(&self) -> usize;

    /// Names of the diagnostic quantities recorded with each event, in order
    fn diagnostic_names(&self) -> &'static [&'static str];

    /// Names of the two quantities written to the sidecar
    fn pair_names(&self) -> [&'static str; 2];

    /// Draws one candidate. If it is accepted, `event` is overwritten
    /// with the final state, otherwise it is left in an unspecified state.
    /// Fails if a kinematic formula is evaluated outside its domain.
    fn generate(&self, sampler: &mut UniformSampler, table: &DensityTable, event: &mut Event) -> Result<Attempt, DomainError>;
}

#[enum_dispatch(Reaction)]
#[derive(Clone, Debug, PartialEq)]
pub enum ReactionKind {
    QuasiFree,
    BoundState,
}

/// Range over which the beam momentum is uniformly distributed, in GeV/c
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BeamSettings {
    pub momentum_min: f64,
    pub momentum_max: f64,
}

impl Default for BeamSettings {
    fn default() -> Self {
        BeamSettings {
            momentum_min: BEAM_MOMENTUM_MIN,
            momentum_max: BEAM_MOMENTUM_MAX,
        }
    }
}

/// What to do when a kinematic formula fails for a candidate
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DomainPolicy {
    /// Count the candidate as rejected and continue sampling
    Reject,
    /// Fail the iteration
    Abort,
}

impl FromStr for DomainPolicy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(DomainPolicy::Reject),
            "abort" => Ok(DomainPolicy::Abort),
            _ => Err(()),
        }
    }
}

impl fmt::Display for DomainPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DomainPolicy::Reject => write!(f, "reject"),
            DomainPolicy::Abort => write!(f, "abort"),
        }
    }
}

/// Counts of what happened to the candidates drawn in a run
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RunStatistics {
    pub attempts: u64,
    pub accepted: u64,
    pub density: u64,
    pub resonance: u64,
    pub threshold: u64,
    pub domain: u64,
}

impl RunStatistics {
    /// Fraction of candidates that were accepted
    pub fn acceptance(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            (self.accepted as f64) / (self.attempts as f64)
        }
    }

    fn reject(&mut self, why: Rejection) {
        match why {
            Rejection::Density => self.density += 1,
            Rejection::Resonance => self.resonance += 1,
            Rejection::Threshold => self.threshold += 1,
        }
    }
}

impl std::ops::AddAssign for RunStatistics {
    fn add_assign(&mut self, other: Self) {
        self.attempts += other.attempts;
        self.accepted += other.accepted;
        self.density += other.density;
        self.resonance += other.resonance;
        self.threshold += other.threshold;
        self.domain += other.domain;
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} events from {} candidates ({:.3}% accepted", self.accepted, self.attempts, 100.0 * self.acceptance())?;
        if self.domain > 0 {
            write!(f, ", {} outside kinematic domain", self.domain)?;
        }
        write!(f, ")")
    }
}

/// Drives a reaction until the requested number of events is accepted.
pub struct EventGenerator<'a> {
    reaction: &'a ReactionKind,
    table: Option<&'a DensityTable>,
    max_attempts: u64,
    policy: DomainPolicy,
    progress: Option<String>,
}

impl<'a> EventGenerator<'a> {
    /// Consecutive rejections tolerated by default before giving up
    pub const DEFAULT_MAX_ATTEMPTS: u64 = 1_000_000;

    pub fn new(reaction: &'a ReactionKind) -> Self {
        EventGenerator {
            reaction,
            table: None,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            policy: DomainPolicy::Reject,
            progress: None,
        }
    }

    pub fn with_table(self, table: &'a DensityTable) -> Self {
        EventGenerator {
            table: Some(table),
            ..self
        }
    }

    /// Sets the number of consecutive candidates that may be rejected
    /// before the run fails.
    pub fn with_max_attempts(self, max_attempts: u64) -> Self {
        EventGenerator {
            max_attempts,
            ..self
        }
    }

    pub fn with_domain_policy(self, policy: DomainPolicy) -> Self {
        EventGenerator {
            policy,
            ..self
        }
    }

    /// Prints progress, prefixed by `label`, every 10% of the run
    pub fn with_progress<S: Into<String>>(self, label: S) -> Self {
        EventGenerator {
            progress: Some(label.into()),
            ..self
        }
    }

    /// Generates `num` events, handing each one to `sink` as soon as it
    /// is accepted.
    pub fn run<S: EventSink + ?Sized>(&self, num: usize, sampler: &mut UniformSampler, sink: &mut S) -> Result<RunStatistics, GenerationError> {
        let table = self.table.ok_or(GenerationError::MissingTable)?;

        let mut stats = RunStatistics::default();
        let mut event = Event::new();
        let mut consecutive: u64 = 0;
        let mut accepted: usize = 0;
        let start = Instant::now();
        let step = (num / 10).max(1);

        while accepted < num {
            if consecutive >= self.max_attempts {
                return Err(GenerationError::RetryLimit(consecutive, accepted));
            }

            consecutive += 1;
            stats.attempts += 1;

            match self.reaction.generate(sampler, table, &mut event) {
                Ok(Attempt::Accepted) => {
                    sink.append(&event)?;
                    accepted += 1;
                    stats.accepted += 1;
                    consecutive = 0;

                    if let Some(label) = self.progress.as_ref() {
                        if accepted % step == 0 {
                            println!(
                                "{}: {:>3}% complete, {} events, ettc {}",
                                label, (100 * accepted) / num, accepted,
                                PrettyDuration::from(ettc(start, accepted, num)),
                            );
                        }
                    }
                },
                Ok(Attempt::Rejected(why)) => stats.reject(why),
                Err(e) => match self.policy {
                    DomainPolicy::Reject => stats.domain += 1,
                    DomainPolicy::Abort => return Err(GenerationError::Domain(e)),
                },
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quasi_free() -> ReactionKind {
        QuasiFree::new(BeamSettings::default(), FERMI_MOMENTUM_CUTOFF).into()
    }

    #[test]
    fn exactly_n_events() {
        let reaction = quasi_free();
        let table = DensityTable::parse("0.0 0.0\n0.05 3.0\n0.2 1.0\n0.4 0.1").unwrap();
        let mut sampler = UniformSampler::from_seed(0);
        let mut events: Vec<Event> = Vec::new();

        let stats = EventGenerator::new(&reaction)
            .with_table(&table)
            .run(1000, &mut sampler, &mut events)
            .unwrap();

        println!("{}", stats);
        assert_eq!(events.len(), 1000);
        assert_eq!(stats.accepted, 1000);
        assert_eq!(stats.attempts, stats.accepted + stats.density + stats.domain);
        assert_eq!(stats.domain, 0);
        assert!(events.iter().all(|ev| ev.npart() == reaction.final_state_size()));
        assert!(events.iter().all(|ev| ev.diagnostics().len() == reaction.diagnostic_names().len()));
    }

    #[test]
    fn nothing_requested() {
        let reaction = quasi_free();
        let table = DensityTable::parse("0.0 1.0\n0.4 1.0").unwrap();
        let mut sampler = UniformSampler::from_seed(0);
        let mut events: Vec<Event> = Vec::new();
        let stats = EventGenerator::new(&reaction)
            .with_table(&table)
            .run(0, &mut sampler, &mut events)
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(stats, RunStatistics::default());
    }

    #[test]
    fn missing_table() {
        let reaction = quasi_free();
        let mut sampler = UniformSampler::from_seed(0);
        let mut events: Vec<Event> = Vec::new();
        let result = EventGenerator::new(&reaction).run(10, &mut sampler, &mut events);
        assert!(matches!(result, Err(GenerationError::MissingTable)));
        assert!(events.is_empty());
    }

    #[test]
    fn zero_density_hits_retry_cap() {
        let reaction = quasi_free();
        let table = DensityTable::parse("0.0 0.0\n0.2 0.0\n0.4 0.0").unwrap();
        assert_eq!(table.max_density(), 0.0);
        let mut sampler = UniformSampler::from_seed(0);
        let mut events: Vec<Event> = Vec::new();

        let result = EventGenerator::new(&reaction)
            .with_table(&table)
            .with_max_attempts(10_000)
            .run(10, &mut sampler, &mut events);

        match result {
            Err(GenerationError::RetryLimit(n, k)) => {
                println!("{}", GenerationError::RetryLimit(n, k));
                assert_eq!(n, 10_000);
                assert_eq!(k, 0);
            },
            other => panic!("expected retry limit, got {:?}", other.map(|s| s.to_string())),
        }
        assert!(events.is_empty());
    }

    #[test]
    fn maximum_at_support_boundary() {
        // density rises linearly to its maximum at the cutoff
        let reaction = quasi_free();
        let table = DensityTable::parse("0.0 0.0\n0.4 2.0").unwrap();
        let mut sampler = UniformSampler::from_seed(3);
        let mut events: Vec<Event> = Vec::new();

        let stats = EventGenerator::new(&reaction)
            .with_table(&table)
            .run(20_000, &mut sampler, &mut events)
            .unwrap();

        let expected = table.integral_below(FERMI_MOMENTUM_CUTOFF) / (FERMI_MOMENTUM_CUTOFF * table.max_density());
        println!("acceptance = {:.4}, expected {:.4}", stats.acceptance(), expected);
        assert!(stats.acceptance() <= 1.0);
        assert!((stats.acceptance() - expected).abs() < 0.01);
    }

    #[test]
    fn domain_policy() {
        // flat distribution that extends beyond the point where the
        // effective mass of the bound proton becomes imaginary
        let cutoff = 0.9;
        assert!(QuasiFree::domain_limit() < cutoff);
        let reaction: ReactionKind = QuasiFree::new(BeamSettings::default(), cutoff).into();
        let table = DensityTable::parse("0.0 1.0\n0.9 1.0").unwrap();

        let mut sampler = UniformSampler::from_seed(7);
        let mut events: Vec<Event> = Vec::new();
        let stats = EventGenerator::new(&reaction)
            .with_table(&table)
            .with_domain_policy(DomainPolicy::Reject)
            .run(2000, &mut sampler, &mut events)
            .unwrap();
        println!("{}", stats);
        assert_eq!(events.len(), 2000);
        assert!(stats.domain > 0);
        assert!(events.iter()
            .flat_map(|ev| ev.particles().iter())
            .all(|pt| { let p = pt.momentum(); p.energy().is_finite() && p.pz().is_finite() }));

        let mut sampler = UniformSampler::from_seed(7);
        let mut events: Vec<Event> = Vec::new();
        let result = EventGenerator::new(&reaction)
            .with_table(&table)
            .with_domain_policy(DomainPolicy::Abort)
            .run(2000, &mut sampler, &mut events);
        match result {
            Err(GenerationError::Domain(e)) => {
                println!("{}", e);
                assert!(e.value() <= 0.0);
            },
            other => panic!("expected domain error, got {:?}", other.map(|s| s.to_string())),
        }
        assert!(events.len() < 2000);
    }

    #[test]
    fn statistics_accumulate() {
        let a = RunStatistics { attempts: 10, accepted: 4, density: 5, resonance: 0, threshold: 0, domain: 1 };
        let mut b = RunStatistics { attempts: 6, accepted: 2, density: 4, ..Default::default() };
        b += a;
        assert_eq!(b.attempts, 16);
        assert_eq!(b.accepted, 6);
        assert_eq!(b.density, 9);
        assert_eq!(b.domain, 1);
        assert!((b.acceptance() - 0.375).abs() < 1.0e-15);
        assert_eq!("reject".parse::<DomainPolicy>(), Ok(DomainPolicy::Reject));
        assert_eq!("abort".parse::<DomainPolicy>(), Ok(DomainPolicy::Abort));
        assert!("ignore".parse::<DomainPolicy>().is_err());
    }
}
