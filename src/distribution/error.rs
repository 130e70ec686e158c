//! Errors raised while loading a momentum distribution

use std::fmt;
use std::error::Error;

pub enum DistributionError {
    /// The file could not be opened or read
    File(String),
    /// Fewer than two valid points were found
    TooFewPoints(String, usize),
    /// Momenta must be strictly increasing, but were not at this line
    Unordered(String, usize),
    /// No tabulated distribution is associated with the model name
    UnknownModel(String),
    /// A tabulated function was not finite at this momentum
    NotFinite(String, f64),
}

impl fmt::Display for DistributionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DistributionError::File(s) => write!(f, "unable to read momentum distribution from '{}'", s),
            DistributionError::TooFewPoints(s, n) => write!(f, "momentum distribution '{}' has {} valid point(s), at least 2 are required", s, n),
            DistributionError::Unordered(s, line) => write!(f, "momenta in '{}' are not strictly increasing (line {})", s, line),
            DistributionError::UnknownModel(s) => write!(f, "no momentum distribution associated with model '{}', available models are {}", s, super::DensityModel::names()),
            DistributionError::NotFinite(s, p) => write!(f, "momentum distribution '{}' is not finite at p = {:.3e} GeV/c", s, p),
        }
    }
}

impl fmt::Debug for DistributionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Error for DistributionError {}
