use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use colored::Colorize;
use rayon::prelude::*;

/// Severity of a message printed with `report!`
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Diagnostic {
    Warning,
    Error,
}

/// Prints a highlighted warning or error to stderr if `cond` holds.
#[macro_export]
macro_rules! report {
    ($level:expr, $cond:expr, $($arg:tt)*) => {
        if $cond {
            use colored::Colorize;
            let prefix = match $level {
                $crate::Diagnostic::Warning => "Warning".bold().yellow(),
                $crate::Diagnostic::Error => "Error".bold().red(),
            };
            eprintln!("{}: {}", prefix, format!($($arg)*));
        }
    };
}

mod constants;
mod distribution;
mod generator;
mod geometry;
mod input;
mod kinematics;
mod output;
mod particle;
mod sampler;

use generator::*;
use input::*;
use output::*;
use sampler::UniformSampler;

/// What a completed iteration produced
struct IterationSummary {
    iteration: usize,
    stats: RunStatistics,
    elapsed: Duration,
    files: Vec<PathBuf>,
}

/// Generates and writes the events of one iteration. Each iteration
/// draws from its own random stream and owns its output files, which
/// are committed only if every event was generated and written.
fn run_iteration(config: &GeneratorConfig, iteration: usize, progress: bool) -> Result<IterationSummary, GenerationError> {
    let start = Instant::now();

    let info = RunInfo {
        reaction: &config.reaction,
        model: &config.model,
        iteration,
        seed: config.seed,
        num_events: config.num_events,
    };

    let mut output = config.output.open(&info)?;
    let mut sampler = UniformSampler::stream(config.seed, iteration);

    let generator = EventGenerator::new(&config.reaction)
        .with_table(&config.table)
        .with_max_attempts(config.max_attempts)
        .with_domain_policy(config.domain_policy);

    let generator = if progress {
        generator.with_progress(format!("\titeration {}", iteration))
    } else {
        generator
    };

    let stats = generator.run(config.num_events, &mut sampler, &mut output)?;
    output.flush()?;

    Ok(IterationSummary {
        iteration,
        stats,
        elapsed: start.elapsed(),
        files: output.paths().to_vec(),
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    let path = args.get(1).ok_or_else(InputError::file)?;

    println!("{}", format!("fermigen v{}", env!("CARGO_PKG_VERSION")).bold());
    println!(
        "\t* git revision {} on branch {}",
        option_env!("VERGEN_SHA_SHORT").unwrap_or("unknown"),
        option_env!("VERGEN_BRANCH").unwrap_or("unknown"),
    );
    let features = option_env!("FERMIGEN_ACTIVE_FEATURES").unwrap_or("");
    println!("\t* with features: {}", if features.is_empty() { "none" } else { features });

    let mut input = Config::from_file(Path::new(path))?;
    input.with_context("constants")?;

    // Unless fixed by the input, runs are seeded from the clock
    let default_seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let config = match GeneratorConfig::from_input(&input, default_seed) {
        Ok(config) => config,
        Err(e) => {
            report!(Diagnostic::Error, true, "failed to configure the run.");
            return Err(e);
        },
    };

    report!(
        Diagnostic::Warning, config.output.hdf5 && cfg!(not(feature = "hdf5-output")),
        "HDF5 output requested, but fermigen was built without the hdf5-output feature, continuing with text output only...",
    );

    report!(
        Diagnostic::Warning, !(config.output.ascii || config.output.sidecar || config.output.diagnostics || config.output.hdf5),
        "all output is switched off, generated events will be discarded.",
    );

    println!("Running {} reaction:", config.reaction.name().bold());
    let (beam, cutoff) = match &config.reaction {
        ReactionKind::QuasiFree(r) => (r.beam(), r.cutoff()),
        ReactionKind::BoundState(r) => (r.beam(), r.cutoff()),
    };
    println!("\t* beam momentum {:.3}-{:.3} GeV/c, Fermi momentum below {:.3} GeV/c", beam.momentum_min, beam.momentum_max, cutoff);
    if let ReactionKind::BoundState(r) = &config.reaction {
        println!(
            "\t* bound state at {:.4} GeV (binding energy {:.1} MeV), width {:.1} MeV",
            r.pole_mass(), 1.0e3 * r.binding_energy(), 1.0e3 * r.width(),
        );
    }
    println!("\t* momentum distribution '{}', {} points, {:?} interpolation", config.model, config.table.len(), config.table.interpolation());
    if config.table.max_density() > 0.0 {
        let efficiency = config.table.integral_below(cutoff) / (cutoff * config.table.max_density());
        println!("\t* expected density acceptance ~{:.1}%", 100.0 * efficiency.min(1.0));
    }
    println!("\t* {} events x {} iteration(s), seed {}", config.num_events, config.iterations, config.seed);
    println!("\t* domain errors: {}, at most {} consecutive rejections", config.domain_policy, config.max_attempts);
    println!("\t* writing output to {}", config.output.directory.display());
    if config.parallel {
        println!("\t* running iterations in parallel on {} threads", rayon::current_num_threads());
    }

    let start = Instant::now();

    let print_summary = |result: &Result<IterationSummary, GenerationError>, iteration: usize| {
        match result {
            Ok(summary) => {
                println!(
                    "{} {}: {}, {}",
                    "Completed iteration".green(), summary.iteration, summary.stats,
                    PrettyDuration::from(summary.elapsed),
                );
                for file in summary.files.iter() {
                    println!("\t=> {}", file.display());
                }
            },
            Err(e) => {
                report!(Diagnostic::Error, true, "iteration {} failed: {}, no output written.", iteration, e);
            },
        }
    };

    let results: Vec<Result<IterationSummary, GenerationError>> = if config.parallel {
        (1..=config.iterations)
            .into_par_iter()
            .map(|k| {
                let result = run_iteration(&config, k, false);
                print_summary(&result, k);
                result
            })
            .collect()
    } else {
        (1..=config.iterations)
            .map(|k| {
                println!("Starting iteration {}...", k);
                let result = run_iteration(&config, k, true);
                print_summary(&result, k);
                result
            })
            .collect()
    };

    let mut total = RunStatistics::default();
    let mut failed = 0;
    for result in results.iter() {
        match result {
            Ok(summary) => total += summary.stats,
            Err(_) => failed += 1,
        }
    }

    println!(
        "Generated {} in total, {} elapsed.",
        total, PrettyDuration::from(start.elapsed()),
    );

    if failed > 0 {
        Err(format!("{} of {} iteration(s) failed", failed, config.iterations).into())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::DensityTable;
    use crate::constants::*;

    fn config(directory: PathBuf, iterations: usize) -> GeneratorConfig {
        GeneratorConfig {
            reaction: QuasiFree::new(BeamSettings::default(), FERMI_MOMENTUM_CUTOFF).into(),
            num_events: 50,
            iterations,
            seed: 12,
            max_attempts: 1000,
            domain_policy: DomainPolicy::Reject,
            parallel: false,
            model: "test".to_owned(),
            table: DensityTable::parse("0.0 0.0\n0.1 1.0\n0.4 0.0").unwrap(),
            output: OutputConfig {
                directory,
                ..Default::default()
            },
        }
    }

    #[test]
    fn serial_and_parallel_agree() {
        let base = std::env::temp_dir().join(format!("fermigen-iterations-{}", std::process::id()));
        let serial = config(base.join("serial"), 3);
        let parallel = config(base.join("parallel"), 3);

        for k in 1..=3 {
            run_iteration(&serial, k, false).unwrap();
        }
        let results: Vec<_> = (1..=3usize)
            .into_par_iter()
            .map(|k| run_iteration(&parallel, k, false))
            .collect();
        assert!(results.iter().all(|r| r.is_ok()));

        let mut outputs = Vec::new();
        for k in 1..=3 {
            let a = std::fs::read_to_string(serial.output.event_path("quasi-free", "test", k, "txt")).unwrap();
            let b = std::fs::read_to_string(parallel.output.event_path("quasi-free", "test", k, "txt")).unwrap();
            assert_eq!(a, b);
            outputs.push(a);
        }
        // independent streams
        assert_ne!(outputs[0], outputs[1]);
        assert_ne!(outputs[1], outputs[2]);

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn failed_iteration_is_reported() {
        let base = std::env::temp_dir().join(format!("fermigen-failure-{}", std::process::id()));
        let mut config = config(base.clone(), 1);
        config.table = DensityTable::parse("0.0 0.0\n0.4 0.0").unwrap();
        let result = run_iteration(&config, 1, false);
        assert!(matches!(result, Err(GenerationError::RetryLimit(1000, 0))));
        assert!(!config.output.event_path("quasi-free", "test", 1, "txt").exists());
        let _ = std::fs::remove_dir_all(&base);
    }
}
