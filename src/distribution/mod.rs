//! Tabulated nucleon momentum distributions, used as the target density
//! of the rejection sampling

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

mod error;
mod pwmci;

pub use error::*;

/// How the density is evaluated between tabulated points
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Interpolation {
    Linear,
    MonotoneCubic,
}

impl FromStr for Interpolation {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Interpolation::Linear),
            "cubic" | "monotone-cubic" => Ok(Interpolation::MonotoneCubic),
            _ => Err(()),
        }
    }
}

/// Theoretical models for which a momentum distribution is tabulated
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DensityModel {
    /// Nucleon in the deuteron, Paris potential
    Paris,
    /// Nucleon in the deuteron, CD-Bonn potential
    CdBonn,
    /// Nucleon in the deuteron, CD-Bonn potential (alternative tabulation)
    CdBonnSk,
    /// Nucleon in the deuteron, chiral effective field theory
    Chiral,
    /// Proton in helium-3, Argonne v18 potential
    Av18,
}

impl DensityModel {
    const ALL: [DensityModel; 5] = [
        DensityModel::Paris,
        DensityModel::CdBonn,
        DensityModel::CdBonnSk,
        DensityModel::Chiral,
        DensityModel::Av18,
    ];

    /// Name of the file holding the tabulated distribution
    pub fn file_name(&self) -> &'static str {
        match self {
            DensityModel::Paris => "paris_momentum_distribution.txt",
            DensityModel::CdBonn => "cdbonn_momentum_distribution.txt",
            DensityModel::CdBonnSk => "cdbonn_sk_momentum_distribution.txt",
            DensityModel::Chiral => "chiral_momentum_distribution.txt",
            DensityModel::Av18 => "av18_3he_momentum_distribution.txt",
        }
    }

    /// Location of the tabulated distribution inside `directory`
    pub fn path<P: AsRef<Path>>(&self, directory: P) -> PathBuf {
        directory.as_ref().join(self.file_name())
    }

    /// Comma-separated list of the recognised model names
    pub fn names() -> String {
        Self::ALL.iter()
            .map(|m| format!("'{}'", m))
            .collect::<Vec<String>>()
            .join(", ")
    }
}

impl fmt::Display for DensityModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DensityModel::Paris => "paris",
            DensityModel::CdBonn => "cdbonn",
            DensityModel::CdBonnSk => "cdbonn-sk",
            DensityModel::Chiral => "chiral",
            DensityModel::Av18 => "av18",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DensityModel {
    type Err = DistributionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.iter()
            .find(|m| m.to_string() == s.to_lowercase())
            .copied()
            .ok_or_else(|| DistributionError::UnknownModel(s.to_owned()))
    }
}

/// A momentum distribution, tabulated as (momentum, density) pairs
/// with strictly increasing momenta. Read-only once loaded, so it can
/// be shared between concurrent runs.
#[derive(Clone, Debug)]
pub struct DensityTable {
    points: Vec<[f64; 2]>,
    interpolation: Interpolation,
    max: f64,
}

impl DensityTable {
    /// Parses a table from text, where each line holds a momentum
    /// and a density separated by whitespace. Blank lines are skipped
    /// and reading stops at the first malformed line.
    pub fn parse(text: &str) -> Result<Self, DistributionError> {
        Self::parse_with_source(text, "<string>")
    }

    /// Loads a table from a text file, see [DensityTable::parse].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DistributionError> {
        let name = path.as_ref().display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|_| DistributionError::File(name.clone()))?;
        Self::parse_with_source(&text, &name)
    }

    /// Tabulates `f` at `n` equally spaced momenta in `[lo, hi]`.
    pub fn from_function<F: Fn(f64) -> f64>(f: F, lo: f64, hi: f64, n: usize) -> Result<Self, DistributionError> {
        let n = n.max(2);
        let points = (0..n)
            .map(|i| {
                let p = lo + (hi - lo) * (i as f64) / ((n - 1) as f64);
                [p, f(p)]
            })
            .collect::<Vec<_>>();

        if let Some(i) = points.iter().position(|pt| !pt[1].is_finite()) {
            return Err(DistributionError::NotFinite("<function>".to_owned(), points[i][0]));
        }

        Self::validated(points, "<function>")
    }

    fn parse_with_source(text: &str, source: &str) -> Result<Self, DistributionError> {
        let mut points = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let mut tokens = line.split_whitespace()
                .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()));
            match (tokens.next().flatten(), tokens.next().flatten()) {
                (Some(p), Some(f)) => points.push([p, f]),
                _ => break,
            }
        }

        Self::validated(points, source)
    }

    fn validated(points: Vec<[f64; 2]>, source: &str) -> Result<Self, DistributionError> {
        if points.len() < 2 {
            return Err(DistributionError::TooFewPoints(source.to_owned(), points.len()));
        }

        if let Some(i) = points.windows(2).position(|w| !(w[1][0] > w[0][0])) {
            return Err(DistributionError::Unordered(source.to_owned(), i + 2));
        }

        let max = points.iter().map(|pt| pt[1]).fold(0.0, f64::max);

        Ok(DensityTable {
            points,
            interpolation: Interpolation::Linear,
            max,
        })
    }

    pub fn with_interpolation(self, interpolation: Interpolation) -> Self {
        DensityTable {
            interpolation,
            ..self
        }
    }

    /// The density at momentum `p`, interpolated between tabulated points.
    /// Vanishes outside the tabulated range, and is never negative.
    pub fn evaluate(&self, p: f64) -> f64 {
        let table = &self.points;
        let f = match self.interpolation {
            Interpolation::Linear => {
                pwmci::locate(p, table).map(|i| {
                    let t = (p - table[i-1][0]) / (table[i][0] - table[i-1][0]);
                    (1.0 - t) * table[i-1][1] + t * table[i][1]
                })
            },
            Interpolation::MonotoneCubic => pwmci::evaluate(p, table),
        };
        f.unwrap_or(0.0).max(0.0)
    }

    /// The largest tabulated density, which bounds `evaluate` from above
    /// for both interpolation schemes.
    pub fn max_density(&self) -> f64 {
        self.max
    }

    /// The smallest and largest tabulated momenta
    pub fn support(&self) -> (f64, f64) {
        (self.points[0][0], self.points[self.points.len() - 1][0])
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Integral of the (linearly interpolated) density over the part
    /// of the support below `p_max`
    pub fn integral_below(&self, p_max: f64) -> f64 {
        self.points.windows(2)
            .filter(|w| w[0][0] < p_max)
            .map(|w| {
                let (p0, f0) = (w[0][0], w[0][1].max(0.0));
                let (p1, f1) = if w[1][0] > p_max {
                    let t = (p_max - p0) / (w[1][0] - p0);
                    (p_max, f0 + t * (w[1][1].max(0.0) - f0))
                } else {
                    (w[1][0], w[1][1].max(0.0))
                };
                0.5 * (p1 - p0) * (f0 + f1)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "0.00 0.0
        0.05 2.0
        0.10 3.5

        0.20 2.5
        0.30 1.0
        0.40 0.2
        not a number
        0.50 7.0
        ";

    #[test]
    fn parse_table() {
        let table = DensityTable::parse(TABLE).unwrap();
        println!("{:?}", table);
        // blank line skipped, reading stopped at the malformed line
        assert_eq!(table.len(), 6);
        assert_eq!(table.support(), (0.0, 0.4));
        assert_eq!(table.max_density(), 3.5);
        assert!((table.evaluate(0.15) - 3.0).abs() < 1.0e-12);
        assert!((table.evaluate(0.025) - 1.0).abs() < 1.0e-12);
    }

    #[test]
    fn outside_support() {
        let table = DensityTable::parse("0.1 1.0\n0.2 2.0\n").unwrap();
        assert_eq!(table.evaluate(0.05), 0.0);
        assert_eq!(table.evaluate(0.25), 0.0);
        assert_eq!(table.evaluate(f64::NAN), 0.0);
        assert_eq!(table.evaluate(0.2), 2.0);
    }

    #[test]
    fn malformed_tables() {
        assert!(matches!(DensityTable::parse("0.1 1.0\n"), Err(DistributionError::TooFewPoints(_, 1))));
        assert!(matches!(DensityTable::parse("0.1\n0.2 1.0\n0.3 1.0"), Err(DistributionError::TooFewPoints(_, 0))));
        assert!(matches!(DensityTable::parse("0.1 1.0\n0.3 1.0\n0.2 1.0"), Err(DistributionError::Unordered(_, 3))));
        assert!(matches!(DensityTable::from_file("does/not/exist.txt"), Err(DistributionError::File(_))));
    }

    #[test]
    fn cubic_is_bounded_by_maximum() {
        let table = DensityTable::parse(TABLE).unwrap()
            .with_interpolation(Interpolation::MonotoneCubic);
        for k in 0..=1000 {
            let p = 0.4 * (k as f64) / 1000.0;
            let f = table.evaluate(p);
            assert!(f >= 0.0 && f <= table.max_density(), "p = {}, f = {}", p, f);
        }
    }

    #[test]
    fn model_names() {
        assert_eq!("paris".parse::<DensityModel>().unwrap(), DensityModel::Paris);
        assert_eq!("CDBONN".parse::<DensityModel>().unwrap(), DensityModel::CdBonn);
        assert_eq!("av18".parse::<DensityModel>().unwrap(), DensityModel::Av18);
        let err = "bonn".parse::<DensityModel>().unwrap_err();
        println!("{}", err);
        assert!(err.to_string().contains("'cdbonn-sk'"));
        let path = DensityModel::Chiral.path("momentum_distributions");
        assert_eq!(path, PathBuf::from("momentum_distributions/chiral_momentum_distribution.txt"));
    }

    #[test]
    fn trapezium_integral() {
        let table = DensityTable::parse("0.0 0.0\n0.1 1.0\n0.2 1.0\n0.3 0.0").unwrap();
        assert!((table.integral_below(0.3) - 0.2).abs() < 1.0e-12);
        assert!((table.integral_below(1.0) - 0.2).abs() < 1.0e-12);
        // part way along a falling edge
        assert!((table.integral_below(0.25) - 0.1875).abs() < 1.0e-12);
        assert!((table.integral_below(0.15) - 0.1).abs() < 1.0e-12);
        assert_eq!(table.integral_below(0.0), 0.0);
    }

    #[test]
    fn tabulated_function() {
        let table = DensityTable::from_function(|p| p * p * (-p / 0.05).exp(), 0.0, 0.4, 401).unwrap();
        assert_eq!(table.len(), 401);
        assert_eq!(table.support(), (0.0, 0.4));
        // maximum of p^2 exp(-p/a) is at p = 2a
        let expected = 0.01 * (-2.0f64).exp();
        assert!((table.max_density() - expected).abs() < 1.0e-12);
        assert!((table.evaluate(0.1) - expected).abs() < 1.0e-12);

        let table = DensityTable::from_function(|p| 1.0 / p, 0.0, 0.4, 10);
        assert!(matches!(table, Err(DistributionError::NotFinite(_, _))));
    }
}
