//! Assembles a run from the input file

use std::error::Error;
use std::path::PathBuf;

use crate::constants::*;
use crate::distribution::*;
use crate::input::{Config, InputError, InputErrorKind};
use crate::output::OutputConfig;
use crate::{report, Diagnostic};

use super::{BeamSettings, BoundState, DomainPolicy, EventGenerator, QuasiFree, ReactionKind};

/// Number of points at which an analytical momentum distribution is tabulated
const FUNCTION_POINTS: usize = 4001;

/// Everything needed to run a job: the reaction, how many events
/// to generate and how, the momentum distribution and where to put
/// the output.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub reaction: ReactionKind,
    /// Accepted events per iteration
    pub num_events: usize,
    pub iterations: usize,
    pub seed: u64,
    pub max_attempts: u64,
    pub domain_policy: DomainPolicy,
    pub parallel: bool,
    /// Labels the momentum distribution in file names
    pub model: String,
    pub table: DensityTable,
    pub output: OutputConfig,
}

fn optional<T>(result: Result<T, InputError>) -> Result<Option<T>, InputError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == InputErrorKind::Location => Ok(None),
        Err(e) => Err(e),
    }
}

impl GeneratorConfig {
    /// Reads and validates the configuration and loads the momentum
    /// distribution. `default_seed` is used if the input does not
    /// fix the seed.
    pub fn from_input(input: &Config, default_seed: u64) -> Result<Self, Box<dyn Error>> {
        let num_events: usize = input.read("control:events")?;
        let iterations: usize = input.read_or("control:iterations", 1)?;
        let seed: u64 = input.read_or("control:seed", default_seed)?;
        let max_attempts: u64 = input.read_or("control:max_attempts", EventGenerator::DEFAULT_MAX_ATTEMPTS)?;
        let parallel: bool = input.read_or("control:parallel", false)?;

        if iterations == 0 {
            return Err(InputError::invalid("control:iterations", "at least one iteration is required").into());
        }

        if max_attempts == 0 {
            return Err(InputError::invalid("control:max_attempts", "must be positive").into());
        }

        let domain_policy: String = input.read_or("control:domain_errors", "reject".to_owned())?;
        let domain_policy: DomainPolicy = domain_policy.parse()
            .map_err(|_| InputError::invalid("control:domain_errors", format!("'{}' is not one of 'reject', 'abort'", domain_policy)))?;

        let beam = BeamSettings {
            momentum_min: input.read_or("beam:momentum_min", BEAM_MOMENTUM_MIN)?,
            momentum_max: input.read_or("beam:momentum_max", BEAM_MOMENTUM_MAX)?,
        };

        if !(beam.momentum_min > 0.0 && beam.momentum_max >= beam.momentum_min) {
            return Err(InputError::invalid(
                "beam",
                format!("momentum range [{}, {}] GeV/c is empty or unphysical", beam.momentum_min, beam.momentum_max)
            ).into());
        }

        let cutoff: f64 = input.read_or("distribution:cutoff", FERMI_MOMENTUM_CUTOFF)?;
        if !(cutoff > 0.0) {
            return Err(InputError::invalid("distribution:cutoff", "must be positive").into());
        }

        let name: String = input.read_or("control:reaction", "quasi-free".to_owned())?;
        let reaction: ReactionKind = match name.as_str() {
            "quasi-free" => {
                report!(
                    Diagnostic::Warning, cutoff > QuasiFree::domain_limit(),
                    "spectator momenta above {:.3} GeV/c are kinematically forbidden, such candidates will be handled according to the domain error policy ('{}').",
                    QuasiFree::domain_limit(), domain_policy,
                );
                QuasiFree::new(beam, cutoff).into()
            },
            "bound-state" => {
                let width: f64 = input.read_or("bound_state:width", BoundState::DEFAULT_WIDTH)?;
                let binding_energy: f64 = input.read_or("bound_state:binding_energy", BoundState::DEFAULT_BINDING_ENERGY)?;
                if !(width > 0.0) {
                    return Err(InputError::invalid("bound_state:width", "must be positive").into());
                }
                BoundState::new(beam, cutoff, width, binding_energy).into()
            },
            _ => return Err(InputError::invalid("control:reaction", format!("'{}' is not one of 'quasi-free', 'bound-state'", name)).into()),
        };

        let interpolation: String = input.read_or("distribution:interpolation", "linear".to_owned())?;
        let interpolation: Interpolation = interpolation.parse()
            .map_err(|_| InputError::invalid("distribution:interpolation", format!("'{}' is not one of 'linear', 'cubic'", interpolation)))?;

        let (model, table) = Self::load_table(input, cutoff)?;
        let table = table.with_interpolation(interpolation);

        let (lo, hi) = table.support();
        report!(
            Diagnostic::Warning, hi < cutoff,
            "momentum distribution '{}' ends at {:.3} GeV/c, below the sampling cutoff of {:.3} GeV/c, and is taken to vanish above it.",
            model, hi, cutoff,
        );
        report!(
            Diagnostic::Warning, hi > cutoff,
            "momentum distribution '{}' extends to {:.3} GeV/c, but momenta above the sampling cutoff of {:.3} GeV/c are never drawn.",
            model, hi, cutoff,
        );
        report!(
            Diagnostic::Warning, lo > 0.0,
            "momentum distribution '{}' starts at {:.3} GeV/c and is taken to vanish below it.",
            model, lo,
        );

        Ok(GeneratorConfig {
            reaction,
            num_events,
            iterations,
            seed,
            max_attempts,
            domain_policy,
            parallel,
            model,
            table,
            output: OutputConfig::from_input(input)?,
        })
    }

    /// Loads the momentum distribution, in order of precedence, from
    /// an explicit file, an analytical expression in `p`, or the
    /// tabulation associated with a named model.
    fn load_table(input: &Config, cutoff: f64) -> Result<(String, DensityTable), Box<dyn Error>> {
        if let Some(file) = optional(input.read::<String, _>("distribution:file"))? {
            let path = PathBuf::from(&file);
            let label = path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.clone());
            let table = DensityTable::from_file(&path)?;
            return Ok((label, table));
        }

        if optional(input.read::<String, _>("distribution:function"))?.is_some() {
            let f = input.func("distribution:function", "p")?;
            let table = DensityTable::from_function(f, 0.0, cutoff, FUNCTION_POINTS)?;
            return Ok(("function".to_owned(), table));
        }

        let model: String = input.read("distribution:model")?;
        let model: DensityModel = model.parse()?;
        let directory: String = input.read_or("distribution:directory", "momentum_distributions".to_owned())?;
        let table = DensityTable::from_file(model.path(&directory))?;
        Ok((model.to_string(), table))
    }
}
