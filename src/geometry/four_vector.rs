//! Defines a relativistic 4-vector: (E, px, py, pz)

use super::ThreeVector;
use crate::kinematics::DomainError;

/// A four-momentum, with the energy as the zeroth component
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct FourVector(f64, f64, f64, f64);

impl FourVector {
    /// Creates a new four-vector with the specified components.
    pub fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        FourVector {0: e, 1: px, 2: py, 3: pz}
    }

    /// Creates the four-momentum of a particle with spatial momentum `p`
    /// and mass `m`, i.e. with energy `sqrt(|p|^2 + m^2)`.
    pub fn from_vector_and_mass(p: ThreeVector, m: f64) -> Self {
        FourVector {
            0: (p.norm_sqr() + m * m).sqrt(),
            1: p[0],
            2: p[1],
            3: p[2],
        }
    }

    /// Returns the squared norm of the four-vector, E^2 - |p|^2
    pub fn norm_sqr(self) -> f64 {
        self * self
    }

    /// Returns the invariant mass. A spacelike vector, which can only
    /// arise from rounding or an explicit mass substitution, gives a
    /// negative result.
    pub fn mass(self) -> f64 {
        let m2 = self.norm_sqr();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    pub fn energy(self) -> f64 {
        self.0
    }

    pub fn px(self) -> f64 {
        self.1
    }

    pub fn py(self) -> f64 {
        self.2
    }

    pub fn pz(self) -> f64 {
        self.3
    }

    /// Magnitude of the spatial momentum
    pub fn momentum(self) -> f64 {
        ThreeVector::from(self).norm()
    }

    /// Polar angle of the spatial momentum, in [0, pi]
    pub fn theta(self) -> f64 {
        ThreeVector::from(self).theta()
    }

    /// Azimuthal angle of the spatial momentum, in [-pi, pi)
    pub fn phi(self) -> f64 {
        ThreeVector::from(self).phi()
    }

    /// Returns the velocity p/E of the frame in which `self` is at rest.
    pub fn boost_vector(self) -> ThreeVector {
        ThreeVector::from(self) / self.0
    }

    /// Applies an active Lorentz boost with velocity `beta`: a four-vector
    /// at rest acquires velocity `beta`. Boosting by `p.boost_vector()`
    /// takes a four-vector from the rest frame of `p` to the frame in
    /// which `p` was specified, and boosting by its negative goes back.
    /// Fails unless `beta` is strictly subluminal.
    pub fn boost(self, beta: ThreeVector) -> Result<Self, DomainError> {
        let b2 = beta.norm_sqr();
        if !(b2 < 1.0) {
            return Err(DomainError::new("Lorentz boost", b2.sqrt()));
        }
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let p = ThreeVector::from(self);
        let bp = beta * p;
        let gamma2 = if b2 > 0.0 { (gamma - 1.0) / b2 } else { 0.0 };
        let p = p + (gamma2 * bp + gamma * self.0) * beta;
        Ok(FourVector {
            0: gamma * (self.0 + bp),
            1: p[0],
            2: p[1],
            3: p[2],
        })
    }
}

// Index into four vector
impl std::ops::Index<i32> for FourVector {
    type Output = f64;
    fn index(&self, index: i32) -> &Self::Output {
        match index {
            0 => &self.0,
            1 => &self.1,
            2 => &self.2,
            3 => &self.3,
            _ => panic!("index out of bounds: a four vector has 4 components but the index is {}", index)
        }
    }
}

// Add two four vectors together
impl std::ops::Add for FourVector {
    type Output = FourVector;
    fn add(self, other: FourVector) -> FourVector {
        FourVector {
            0: self.0 + other.0,
            1: self.1 + other.1,
            2: self.2 + other.2,
            3: self.3 + other.3
        }
    }
}

// Subtract two four vectors
impl std::ops::Sub for FourVector {
    type Output = FourVector;
    fn sub(self, other: FourVector) -> FourVector {
        FourVector {
            0: self.0 - other.0,
            1: self.1 - other.1,
            2: self.2 - other.2,
            3: self.3 - other.3
        }
    }
}

// Minkowski product, metric (+, -, -, -)
impl std::ops::Mul for FourVector {
    type Output = f64;
    fn mul(self, other: FourVector) -> f64 {
        self.0 * other.0 - self.1 * other.1 - self.2 * other.2 - self.3 * other.3
    }
}

impl std::fmt::Display for FourVector {
    fn fmt(&self, f : &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.0, self.1, self.2, self.3)
    }
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256StarStar;
    use super::*;

    fn max_difference(a: FourVector, b: FourVector) -> f64 {
        (0..4).map(|i| (a[i] - b[i]).abs()).fold(0.0, f64::max)
    }

    #[test]
    fn mass_from_components() {
        let p = FourVector::from_vector_and_mass(ThreeVector::new(0.3, -0.1, 1.2), 0.938272);
        let err = (p.mass() - 0.938272).abs() / 0.938272;
        println!("p = [{}], m = {}, err = {:e}", p, p.mass(), err);
        assert!(err < 1.0e-9);

        let spacelike = FourVector::new(1.0, 0.0, 0.0, 2.0);
        assert!(spacelike.mass() < 0.0);
    }

    #[test]
    fn boost_preserves_norm() {
        let p = FourVector::from_vector_and_mass(ThreeVector::new(0.0, 0.2, 0.0), 1.875613);
        let beta = ThreeVector::new(0.1, 0.0, 0.65);
        let p_prime = p.boost(beta).unwrap();
        let err = (p.norm_sqr() - p_prime.norm_sqr()).abs();
        println!("p_prime = [{}], p_prime^2 = [{}], err = {:e}", p_prime, p_prime.norm_sqr(), err);
        assert!(err < 1.0e-9);
    }

    #[test]
    fn boost_there_and_back() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(11);
        for _i in 0..1000 {
            let p = FourVector::from_vector_and_mass(
                ThreeVector::new(rng.gen_range(-2.0, 2.0), rng.gen_range(-2.0, 2.0), rng.gen_range(-2.0, 2.0)),
                rng.gen_range(0.0, 2.0),
            );
            let speed = 0.999 * rng.gen::<f64>();
            let beta = ThreeVector::from_spherical(speed, (2.0 * rng.gen::<f64>() - 1.0).acos(), rng.gen_range(-3.14, 3.14));
            let q = p.boost(beta).unwrap().boost(-beta).unwrap();
            let err = max_difference(p, q);
            assert!(err < 1.0e-9 * (1.0 + p.energy()) / (1.0 - speed), "p = [{}], q = [{}], err = {:e}", p, q, err);
        }
    }

    #[test]
    fn boost_to_rest_frame() {
        let p = FourVector::from_vector_and_mass(ThreeVector::new(0.5, -0.3, 1.5), 2.0);
        let rest = p.boost(-p.boost_vector()).unwrap();
        println!("rest = [{}]", rest);
        assert!(rest.momentum() < 1.0e-12);
        assert!((rest.energy() - 2.0).abs() < 1.0e-12);

        // and a particle at rest picks up the velocity of the boost
        let q = FourVector::new(2.0, 0.0, 0.0, 0.0).boost(p.boost_vector()).unwrap();
        assert!(max_difference(p, q) < 1.0e-12);
    }

    #[test]
    fn add_fv() {
        let a = FourVector::new(5.0, 3.0, 4.0, 0.0);
        let b = FourVector::new(15.0, 14.0, 5.0, 2.0);
        assert_eq!(a + b, FourVector::new(20.0, 17.0, 9.0, 2.0));
        assert_eq!(b - a, FourVector::new(10.0, 11.0, 1.0, 2.0));
    }

    #[test]
    fn superluminal_boost() {
        let p = FourVector::new(1.0, 0.0, 0.0, 0.0);
        let err = p.boost(ThreeVector::new(0.0, 0.6, 0.8)).unwrap_err();
        println!("{}", err);
        assert!((err.value() - 1.0).abs() < 1.0e-12);
        assert!(p.boost(ThreeVector::new(f64::NAN, 0.0, 0.0)).is_err());

        // a spacelike four-vector has no rest frame
        let spacelike = FourVector::new(1.0, 0.0, 0.0, 2.0);
        assert!(p.boost(-spacelike.boost_vector()).is_err());
    }
}
