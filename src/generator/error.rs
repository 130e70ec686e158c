//! Errors that end an iteration

use std::fmt;
use std::error::Error;

use crate::kinematics::DomainError;
use crate::output::OutputError;

pub enum GenerationError {
    /// No momentum distribution was supplied
    MissingTable,
    /// Too many consecutive candidates were rejected: (attempts, events accepted so far)
    RetryLimit(u64, usize),
    /// A kinematic formula failed and the policy is to abort
    Domain(DomainError),
    /// The event could not be handed to the sink
    Output(OutputError),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GenerationError::MissingTable => write!(f, "no momentum distribution was loaded, no event can be evaluated"),
            GenerationError::RetryLimit(n, k) => write!(f, "{} consecutive candidates rejected after {} accepted event(s), is the momentum distribution zero everywhere?", n, k),
            GenerationError::Domain(e) => write!(f, "numerical domain violation: {}", e),
            GenerationError::Output(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Debug for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Error for GenerationError {}

impl From<DomainError> for GenerationError {
    fn from(e: DomainError) -> Self {
        GenerationError::Domain(e)
    }
}

impl From<OutputError> for GenerationError {
    fn from(e: OutputError) -> Self {
        GenerationError::Output(e)
    }
}
