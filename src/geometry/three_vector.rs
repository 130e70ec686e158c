//! Defines a spatial 3-vector: (x, y, z)

use super::{FourVector, normalize_azimuth};

/// A three-vector
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThreeVector {
    x: f64,
    y: f64,
    z: f64,
}

impl ThreeVector {
    /// Creates a new three-vector with the specified components.
    pub fn new(x: f64, y: f64, z: f64) -> ThreeVector {
        ThreeVector{x: x, y: y, z: z}
    }

    /// Creates a new three-vector from its magnitude, polar angle `theta`
    /// (measured from the z-axis) and azimuthal angle `phi`.
    pub fn from_spherical(mag: f64, theta: f64, phi: f64) -> ThreeVector {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        ThreeVector {
            x: mag * sin_theta * cos_phi,
            y: mag * sin_theta * sin_phi,
            z: mag * cos_theta,
        }
    }

    /// Returns the squared magnitude of the three-vector.
    pub fn norm_sqr(self) -> f64 {
        self * self
    }

    /// Returns the magnitude of the three-vector.
    pub fn norm(self) -> f64 {
        self.norm_sqr().sqrt()
    }

    /// Polar angle, in [0, pi]. Zero for the null vector.
    pub fn theta(self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 && self.z == 0.0 {
            0.0
        } else {
            self.x.hypot(self.y).atan2(self.z)
        }
    }

    /// Azimuthal angle, in [-pi, pi). Zero if the vector lies along the z-axis.
    pub fn phi(self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 {
            0.0
        } else {
            normalize_azimuth(self.y.atan2(self.x))
        }
    }

    /// Returns the unsigned angle between `self` and `other`, in [0, pi].
    /// The cosine is clamped to [-1, 1] so that rounding cannot push
    /// `acos` out of its domain. Zero if either vector is null.
    pub fn angle_to(self, other: ThreeVector) -> f64 {
        let denom = (self.norm_sqr() * other.norm_sqr()).sqrt();
        if denom == 0.0 {
            0.0
        } else {
            (self * other / denom).max(-1.0).min(1.0).acos()
        }
    }
}

impl std::ops::Index<i32> for ThreeVector {
    type Output = f64;
    fn index(&self, index: i32) -> &Self::Output {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("index out of bounds: a three vector has 3 components but the index is {}", index)
        }
    }
}

impl std::convert::From<FourVector> for ThreeVector {
    fn from(fv: FourVector) -> Self {
        ThreeVector {
            x: fv[1],
            y: fv[2],
            z: fv[3],
        }
    }
}

impl std::fmt::Display for ThreeVector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

impl std::ops::Add for ThreeVector {
    type Output = ThreeVector;
    fn add(self, other: ThreeVector) -> ThreeVector {
        ThreeVector {x: self.x + other.x, y: self.y + other.y, z: self.z + other.z}
    }
}

impl std::ops::Sub for ThreeVector {
    type Output = ThreeVector;
    fn sub(self, other: ThreeVector) -> ThreeVector {
        ThreeVector {x: self.x - other.x, y: self.y - other.y, z: self.z - other.z}
    }
}

// Dot product
impl std::ops::Mul for ThreeVector {
    type Output = f64;
    fn mul(self, other: ThreeVector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl std::ops::Mul<f64> for ThreeVector {
    type Output = ThreeVector;
    fn mul(self, other: f64) -> ThreeVector {
        ThreeVector{x: self.x * other, y: self.y * other, z: self.z * other}
    }
}

impl std::ops::Mul<ThreeVector> for f64 {
    type Output = ThreeVector;
    fn mul(self, other: ThreeVector) -> ThreeVector {
        ThreeVector{x: self * other.x, y: self * other.y, z: self * other.z}
    }
}

impl std::ops::Neg for ThreeVector {
    type Output = ThreeVector;
    fn neg(self) -> ThreeVector {
        -1.0 * self
    }
}

impl std::ops::Div<f64> for ThreeVector {
    type Output = ThreeVector;
    fn div(self, other: f64) -> ThreeVector {
        ThreeVector{x: self.x / other, y: self.y / other, z: self.z / other}
    }
}
