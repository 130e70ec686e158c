//! Output of binary-formatted event data

use std::path::PathBuf;

use crate::generator::Reaction;
use crate::particle::Event;
use super::{EventSink, OutputError, RunInfo, StagedSink};
use super::text::Staging;

/// Represents a file handle, to which raw numerical data can be written.
pub trait OutputHandle<'a, T: ?Sized, S> {
    type Error;
    /// Writes data (a scalar value `&T`, slice `&[T]`, table or string slice `&str`) to specified output handle.
    fn write(&'a self, name: S, data: &T) -> Result<&'a Self, Self::Error>;
}

impl<'a, T, S> OutputHandle<'a, T, S> for hdf5::Group
where
    T: AsHdf5Data<'a> + ?Sized,
    S: AsRef<str>
{
    type Error = hdf5::Error;

    fn write(&'a self, name: S, data: &T) -> Result<&'a Self, Self::Error> {
        data.write_into(self, name.as_ref())
    }
}

pub trait AsHdf5Data<'a> {
    fn write_into(&self, group: &'a hdf5::Group, name: &str) -> hdf5::Result<&'a hdf5::Group>;
}

impl<'a, T> AsHdf5Data<'a> for T where T: hdf5::types::H5Type {
    fn write_into(&self, group: &'a hdf5::Group, name: &str) -> hdf5::Result<&'a hdf5::Group> {
        group.new_dataset::<T>()
            .create(name)?
            .write_scalar(self)
            .map(|_| group)
    }
}

impl<'a> AsHdf5Data<'a> for str {
    fn write_into(&self, group: &'a hdf5::Group, name: &str) -> hdf5::Result<&'a hdf5::Group> {
        use std::str::FromStr;
        use hdf5::types::VarLenUnicode;
        match VarLenUnicode::from_str(self) {
            Ok(vlu) => {
                group.new_dataset::<VarLenUnicode>()
                    .create(name)?
                    .write_scalar(&vlu)
                    .map(|_| group)
            },
            Err(e) => Err(hdf5::Error::Internal(e.to_string()))
        }
    }
}

impl<'a, T> AsHdf5Data<'a> for [T] where T: hdf5::types::H5Type {
    fn write_into(&self, group: &'a hdf5::Group, name: &str) -> hdf5::Result<&'a hdf5::Group> {
        group.new_dataset_builder()
            .with_data(self)
            .create(name)
            .map(|_| group)
    }
}

/// Row-major data with a fixed number of columns
pub struct Table<'d, T> {
    data: &'d [T],
    columns: usize,
}

impl<'a, 'd, T> AsHdf5Data<'a> for Table<'d, T> where T: hdf5::types::H5Type {
    fn write_into(&self, group: &'a hdf5::Group, name: &str) -> hdf5::Result<&'a hdf5::Group> {
        let rows = if self.columns == 0 { 0 } else { self.data.len() / self.columns };
        group.new_dataset::<T>()
            .shape((rows, self.columns))
            .create(name)?
            .write_raw(self.data)
            .map(|_| group)
    }
}

/// Collects the events of an iteration and writes them to a single
/// HDF5 file when flushed.
pub(super) struct Hdf5Writer {
    staging: Staging,
    closed: bool,
    reaction: &'static str,
    model: String,
    iteration: u64,
    seed: u64,
    requested: u64,
    npart: usize,
    diagnostic_names: &'static [&'static str],
    pair_names: [&'static str; 2],
    species: Vec<i32>,
    momentum: [Vec<f64>; 4],
    diagnostics: Vec<f64>,
    pair: [Vec<f64>; 2],
}

impl Hdf5Writer {
    pub fn create(path: PathBuf, info: &RunInfo) -> Result<Self, OutputError> {
        let n = info.num_events;
        let npart = info.reaction.final_state_size();
        let capacity = n * npart;
        Ok(Hdf5Writer {
            staging: Staging::new(path),
            closed: false,
            reaction: info.reaction.name(),
            model: info.model.to_owned(),
            iteration: info.iteration as u64,
            seed: info.seed,
            requested: n as u64,
            npart,
            diagnostic_names: info.reaction.diagnostic_names(),
            pair_names: info.reaction.pair_names(),
            species: Vec::with_capacity(capacity),
            momentum: [
                Vec::with_capacity(capacity),
                Vec::with_capacity(capacity),
                Vec::with_capacity(capacity),
                Vec::with_capacity(capacity),
            ],
            diagnostics: Vec::with_capacity(n * info.reaction.diagnostic_names().len()),
            pair: [Vec::with_capacity(n), Vec::with_capacity(n)],
        })
    }

    fn events(&self) -> usize {
        self.pair[0].len()
    }

    fn write_file(&self, path: &std::path::Path) -> hdf5::Result<()> {
        let file = hdf5::File::create(path)?;
        let n = self.events();

        let config = file.create_group("config")?;
        config
            .write("reaction", self.reaction)?
            .write("model", self.model.as_str())?
            .write("iteration", &self.iteration)?
            .write("seed", &self.seed)?
            .write("events", &self.requested)?
            .write("version", env!("CARGO_PKG_VERSION"))?;

        let npart = vec![self.npart as i32; n];
        let zeros = vec![0.0f32; n];
        let fs = file.create_group("final-state")?;
        fs.write("npart", &npart[..])?
            .write("impact", &zeros[..])?
            .write("phi", &zeros[..])?
            .write("species", &Table { data: &self.species, columns: self.npart })?
            .write("px", &Table { data: &self.momentum[0], columns: self.npart })?
            .write("py", &Table { data: &self.momentum[1], columns: self.npart })?
            .write("pz", &Table { data: &self.momentum[2], columns: self.npart })?
            .write("mass", &Table { data: &self.momentum[3], columns: self.npart })?;

        let diagnostics = file.create_group("diagnostics")?;
        let k = self.diagnostic_names.len();
        for (j, name) in self.diagnostic_names.iter().enumerate() {
            let column: Vec<f64> = (0..n).map(|i| self.diagnostics[i * k + j]).collect();
            diagnostics.write(*name, &column[..])?;
        }

        let sidecar = file.create_group("sidecar")?;
        sidecar
            .write(self.pair_names[0], &self.pair[0][..])?
            .write(self.pair_names[1], &self.pair[1][..])?;

        file.close()
    }
}

impl EventSink for Hdf5Writer {
    fn append(&mut self, event: &Event) -> Result<(), OutputError> {
        for pt in event.particles() {
            let p = pt.momentum();
            self.species.push(pt.species().pdg_code());
            self.momentum[0].push(p.px());
            self.momentum[1].push(p.py());
            self.momentum[2].push(p.pz());
            self.momentum[3].push(p.mass());
        }
        let k = self.diagnostic_names.len();
        let values = event.diagnostics();
        self.diagnostics.extend((0..k).map(|j| values.get(j).copied().unwrap_or(f64::NAN)));
        let (a, b) = event.pair();
        self.pair[0].push(a);
        self.pair[1].push(b);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.publish()
    }
}

impl StagedSink for Hdf5Writer {
    fn close(&mut self) -> Result<(), OutputError> {
        if !self.closed {
            self.write_file(self.staging.part())
                .map_err(|e| OutputError::write(self.staging.part(), e))?;
            self.closed = true;
        }
        Ok(())
    }

    fn publish(&mut self) -> Result<(), OutputError> {
        self.close()?;
        self.staging.publish()
    }

    fn retract(&mut self) {
        self.staging.retract()
    }
}
