//! Writes generated events to file.
//!
//! Every file belonging to an iteration is first written under a
//! temporary name and only moved into place when the iteration
//! completes, so a failed iteration leaves no output behind.

use std::path::PathBuf;

use crate::generator::{Reaction, ReactionKind};
use crate::input::{Config, InputError};
use crate::particle::Event;

mod error;
mod text;
#[cfg(feature = "hdf5-output")]
mod binary;

pub use error::*;
use text::*;
#[cfg(feature = "hdf5-output")]
use binary::*;

/// Destination for accepted events
pub trait EventSink {
    /// Records one event.
    fn append(&mut self, event: &Event) -> Result<(), OutputError>;

    /// Makes everything appended so far permanent.
    fn flush(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// A file-backed sink that is committed in two steps, so that the
/// files of one iteration can be committed together.
pub(crate) trait StagedSink: EventSink {
    /// Writes everything out under the temporary name.
    fn close(&mut self) -> Result<(), OutputError>;

    /// Moves the closed file to its final location.
    fn publish(&mut self) -> Result<(), OutputError>;

    /// Deletes the file again, if it was published.
    fn retract(&mut self);
}

impl EventSink for Vec<Event> {
    fn append(&mut self, event: &Event) -> Result<(), OutputError> {
        self.push(*event);
        Ok(())
    }
}

/// Which files are written, and where
#[derive(Clone, Debug, PartialEq)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub prefix: Option<String>,
    pub ascii: bool,
    pub hdf5: bool,
    pub diagnostics: bool,
    pub sidecar: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            directory: PathBuf::from("output"),
            prefix: None,
            ascii: true,
            hdf5: false,
            diagnostics: false,
            sidecar: true,
        }
    }
}

/// Describes the iteration a set of output files belongs to
pub struct RunInfo<'a> {
    pub reaction: &'a ReactionKind,
    pub model: &'a str,
    pub iteration: usize,
    #[allow(unused)]
    pub seed: u64,
    #[allow(unused)]
    pub num_events: usize,
}

impl OutputConfig {
    /// Reads the `output` section, falling back to the defaults for
    /// anything that is not specified.
    pub fn from_input(input: &Config) -> Result<Self, InputError> {
        let default = OutputConfig::default();
        let directory: String = input.read_or("output:directory", "output".to_owned())?;

        let prefix: Option<String> = match input.read::<String, _>("output:prefix") {
            Ok(s) => Some(s),
            Err(e) if e.kind() == crate::input::InputErrorKind::Location => None,
            Err(e) => return Err(e),
        };

        if let Some(s) = prefix.as_ref() {
            if s.is_empty() || s.contains(std::path::is_separator) {
                return Err(InputError::invalid("output:prefix", "must be a non-empty file name"));
            }
        }

        Ok(OutputConfig {
            directory: PathBuf::from(directory),
            prefix,
            ascii: input.read_or("output:ascii", default.ascii)?,
            hdf5: input.read_or("output:hdf5", default.hdf5)?,
            diagnostics: input.read_or("output:diagnostics", default.diagnostics)?,
            sidecar: input.read_or("output:sidecar", default.sidecar)?,
        })
    }

    fn stem(&self, reaction: &str, model: &str) -> String {
        match self.prefix.as_ref() {
            Some(prefix) => format!("{}-{}-{}", prefix, reaction, model),
            None => format!("{}-{}", reaction, model),
        }
    }

    /// Path of the event file for the given iteration, with the
    /// given `extension`
    pub fn event_path(&self, reaction: &str, model: &str, iteration: usize, extension: &str) -> PathBuf {
        self.directory.join(format!("{}-{}.{}", self.stem(reaction, model), iteration, extension))
    }

    pub fn diagnostics_path(&self, reaction: &str, model: &str, iteration: usize) -> PathBuf {
        self.directory.join(format!("{}-diagnostics-{}.txt", self.stem(reaction, model), iteration))
    }

    pub fn sidecar_path(&self, reaction: &str, model: &str, iteration: usize) -> PathBuf {
        self.directory.join(format!("{}-momentum_theta-{}.txt", self.stem(reaction, model), iteration))
    }

    /// Opens the output files for one iteration.
    pub fn open(&self, info: &RunInfo) -> Result<RunOutput, OutputError> {
        std::fs::create_dir_all(&self.directory)
            .map_err(|e| OutputError::open(&self.directory, e))?;

        let name = info.reaction.name();
        let mut sinks: Vec<Box<dyn StagedSink>> = Vec::new();
        let mut paths = Vec::new();

        if self.ascii {
            let path = self.event_path(name, info.model, info.iteration, "txt");
            sinks.push(Box::new(AsciiWriter::create(path.clone())?));
            paths.push(path);
        }

        if self.diagnostics {
            let path = self.diagnostics_path(name, info.model, info.iteration);
            sinks.push(Box::new(DiagnosticsWriter::create(path.clone(), info.reaction.diagnostic_names())?));
            paths.push(path);
        }

        if self.sidecar {
            let path = self.sidecar_path(name, info.model, info.iteration);
            sinks.push(Box::new(SidecarWriter::create(path.clone())?));
            paths.push(path);
        }

        #[cfg(feature = "hdf5-output")] {
            if self.hdf5 {
                let path = self.event_path(name, info.model, info.iteration, "h5");
                sinks.push(Box::new(Hdf5Writer::create(path.clone(), info)?));
                paths.push(path);
            }
        }

        Ok(RunOutput { sinks, paths })
    }
}

/// All the files written by one iteration
pub struct RunOutput {
    sinks: Vec<Box<dyn StagedSink>>,
    paths: Vec<PathBuf>,
}

impl RunOutput {
    /// Final locations of the files, valid once flushed
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl EventSink for RunOutput {
    fn append(&mut self, event: &Event) -> Result<(), OutputError> {
        for sink in self.sinks.iter_mut() {
            sink.append(event)?;
        }
        Ok(())
    }

    /// Closes every file before moving any into place. If one cannot be
    /// moved, those already published are deleted again.
    fn flush(&mut self) -> Result<(), OutputError> {
        for sink in self.sinks.iter_mut() {
            sink.close()?;
        }

        for i in 0..self.sinks.len() {
            if let Err(e) = self.sinks[i].publish() {
                for sink in self.sinks[..i].iter_mut() {
                    sink.retract();
                }
                return Err(e);
            }
        }

        Ok(())
    }
}
