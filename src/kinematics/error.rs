//! Numerical domain errors

use std::fmt;
use std::error::Error;

/// Returned when a kinematic formula is evaluated outside its domain,
/// e.g. when the argument of a square root is negative. This happens
/// near the kinematic boundary, at extreme sampled momenta.
#[derive(Copy, Clone, PartialEq)]
pub struct DomainError {
    formula: &'static str,
    value: f64,
}

impl DomainError {
    pub fn new(formula: &'static str, value: f64) -> Self {
        DomainError { formula, value }
    }

    /// The offending value (a radicand, velocity or mass)
    #[allow(unused)]
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl fmt::Debug for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} is undefined for argument {:e}", self.formula, self.value)
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for DomainError {}
