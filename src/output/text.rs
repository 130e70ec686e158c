//! Plain-text output: event records, diagnostics and the sidecar

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::particle::Event;
use super::{EventSink, OutputError, StagedSink};

/// Tracks a file that is written under a temporary name and later
/// moved into place. Unless it has been published, the temporary file
/// is removed on drop.
pub(super) struct Staging {
    path: PathBuf,
    part: PathBuf,
    published: bool,
}

impl Staging {
    pub fn new(path: PathBuf) -> Self {
        let part = staging_path(&path);
        Staging { path, part, published: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn part(&self) -> &Path {
        &self.part
    }

    /// Moves the temporary file to its final location.
    pub fn publish(&mut self) -> Result<(), OutputError> {
        if !self.published {
            std::fs::rename(&self.part, &self.path)
                .map_err(|e| OutputError::commit(&self.path, e))?;
            self.published = true;
        }
        Ok(())
    }

    /// Deletes a published file.
    pub fn retract(&mut self) {
        if self.published {
            let _ = std::fs::remove_file(&self.path);
            self.published = false;
        }
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if !self.published {
            let _ = std::fs::remove_file(&self.part);
        }
    }
}

/// A text file written through a buffer under its temporary name
pub(super) struct StagedFile {
    staging: Staging,
    writer: Option<BufWriter<File>>,
}

impl StagedFile {
    pub fn create(path: PathBuf) -> Result<Self, OutputError> {
        let staging = Staging::new(path);
        let file = File::create(staging.part())
            .map_err(|e| OutputError::open(staging.part(), e))?;
        Ok(StagedFile {
            staging,
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn writer(&mut self) -> Result<&mut BufWriter<File>, OutputError> {
        let path = self.staging.path();
        self.writer.as_mut()
            .ok_or_else(|| OutputError::write(path, "file already closed"))
    }

    pub fn path(&self) -> &Path {
        self.staging.path()
    }

    /// Flushes and closes the temporary file, leaving it in place.
    pub fn close(&mut self) -> Result<(), OutputError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()
                .map_err(|e| OutputError::write(self.staging.part(), e))?;
        }
        Ok(())
    }

    pub fn publish(&mut self) -> Result<(), OutputError> {
        self.close()?;
        self.staging.publish()
    }

    pub fn retract(&mut self) {
        self.staging.retract()
    }
}

/// Temporary name under which `path` is written
pub(super) fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// One header line per event, `npart impact phi`, followed by
/// one line per particle, `species px py pz mass`.
pub(super) struct AsciiWriter {
    file: StagedFile,
}

impl AsciiWriter {
    pub fn create(path: PathBuf) -> Result<Self, OutputError> {
        Ok(AsciiWriter { file: StagedFile::create(path)? })
    }
}

impl EventSink for AsciiWriter {
    fn append(&mut self, event: &Event) -> Result<(), OutputError> {
        let writer = self.file.writer()?;
        writeln!(writer, "{}", event)
            .map_err(|e| OutputError::write(self.file.path(), e))
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.file.publish()
    }
}

impl StagedSink for AsciiWriter {
    fn close(&mut self) -> Result<(), OutputError> {
        self.file.close()
    }

    fn publish(&mut self) -> Result<(), OutputError> {
        self.file.publish()
    }

    fn retract(&mut self) {
        self.file.retract()
    }
}

/// Tab-separated table of the diagnostic quantities, one row per event,
/// headed by their names.
pub(super) struct DiagnosticsWriter {
    file: StagedFile,
}

impl DiagnosticsWriter {
    pub fn create(path: PathBuf, names: &[&str]) -> Result<Self, OutputError> {
        let mut file = StagedFile::create(path)?;
        let writer = file.writer()?;
        writeln!(writer, "{}", names.join("\t"))
            .map_err(|e| OutputError::write(file.path(), e))?;
        Ok(DiagnosticsWriter { file })
    }
}

impl EventSink for DiagnosticsWriter {
    fn append(&mut self, event: &Event) -> Result<(), OutputError> {
        let line = event.diagnostics().iter()
            .map(|v| format!("{:.9e}", v))
            .collect::<Vec<String>>()
            .join("\t");
        let writer = self.file.writer()?;
        writeln!(writer, "{}", line)
            .map_err(|e| OutputError::write(self.file.path(), e))
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.file.publish()
    }
}

impl StagedSink for DiagnosticsWriter {
    fn close(&mut self) -> Result<(), OutputError> {
        self.file.close()
    }

    fn publish(&mut self) -> Result<(), OutputError> {
        self.file.publish()
    }

    fn retract(&mut self) {
        self.file.retract()
    }
}

/// The pair of scalars recorded with each event, tab separated
pub(super) struct SidecarWriter {
    file: StagedFile,
}

impl SidecarWriter {
    pub fn create(path: PathBuf) -> Result<Self, OutputError> {
        Ok(SidecarWriter { file: StagedFile::create(path)? })
    }
}

impl EventSink for SidecarWriter {
    fn append(&mut self, event: &Event) -> Result<(), OutputError> {
        let (a, b) = event.pair();
        let writer = self.file.writer()?;
        writeln!(writer, "{}\t{}", a, b)
            .map_err(|e| OutputError::write(self.file.path(), e))
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.file.publish()
    }
}

impl StagedSink for SidecarWriter {
    fn close(&mut self) -> Result<(), OutputError> {
        self.file.close()
    }

    fn publish(&mut self) -> Result<(), OutputError> {
        self.file.publish()
    }

    fn retract(&mut self) {
        self.file.retract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_name() {
        let path = PathBuf::from("output/pd-quasi-free-paris-1.txt");
        assert_eq!(staging_path(&path), PathBuf::from("output/pd-quasi-free-paris-1.txt.part"));
    }

    #[test]
    fn staged_file_lifecycle() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("fermigen-staged-{}.txt", std::process::id()));

        {
            let mut file = StagedFile::create(path.clone()).unwrap();
            writeln!(file.writer().unwrap(), "discarded").unwrap();
            assert!(staging_path(&path).exists());
        }
        assert!(!staging_path(&path).exists());
        assert!(!path.exists());

        let mut file = StagedFile::create(path.clone()).unwrap();
        writeln!(file.writer().unwrap(), "kept").unwrap();
        file.close().unwrap();
        assert!(file.writer().is_err());
        assert!(staging_path(&path).exists() && !path.exists());
        file.publish().unwrap();
        drop(file);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "kept\n");
        assert!(!staging_path(&path).exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn retract_published_file() {
        let path = std::env::temp_dir().join(format!("fermigen-retract-{}.txt", std::process::id()));
        let mut file = StagedFile::create(path.clone()).unwrap();
        writeln!(file.writer().unwrap(), "retracted").unwrap();
        file.publish().unwrap();
        assert!(path.exists());
        file.retract();
        drop(file);
        assert!(!path.exists());
        assert!(!staging_path(&path).exists());
    }
}
