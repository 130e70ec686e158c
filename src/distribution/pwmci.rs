//! Piecewise monotonic cubic interpolation

#[derive(Copy,Clone,Debug)]
struct FitParameters {
    x: [f64; 2],
    f: [f64; 2],
    m: [f64; 2],
}

impl FitParameters {
    /// Hermite parameters on the interval [x_{i-1}, x_i], for 1 <= i < table.len()
    fn construct(i: usize, table: &[[f64; 2]]) -> FitParameters {
        let len = table.len();
        let slope = |k: usize| (table[k][1] - table[k-1][1]) / (table[k][0] - table[k-1][0]);

        // Slopes of the secant lines between x_{i-2}, x_{i-1}, x_i and x_{i+1},
        // repeating the central one at either end of the table
        let secant = [
            if i >= 2 { slope(i-1) } else { slope(i) },
            slope(i),
            if i + 1 < len { slope(i+1) } else { slope(i) },
        ];

        // Tangent slopes at x_{i-1} and x_i are calculated using the average
        // of the secant slopes UNLESS they have different signs (i.e. that point
        // is a local extremum) or one is zero (the curve is flat).
        let mut tangent = [0.0; 2];
        tangent[0] = if secant[0] * secant[1] > 0.0 {
            0.5 * (secant[0] + secant[1])
        } else {
            0.0
        };
        tangent[1] = if secant[1] * secant[2] > 0.0 {
            0.5 * (secant[1] + secant[2])
        } else {
            0.0
        };

        // Correct tangent slopes to ensure monotonicity
        if secant[1] != 0.0 {
            if tangent[0] / secant[1] > 3.0 {tangent[0] = 3.0 * secant[1];}
            if tangent[1] / secant[1] > 3.0 {tangent[1] = 3.0 * secant[1];}
        }

        FitParameters {
            x: [table[i-1][0], table[i][0]],
            f: [table[i-1][1], table[i][1]],
            m: tangent
        }
    }

    fn evaluate(&self, x: f64) -> f64 {
        let t = (x - self.x[0]) / (self.x[1] - self.x[0]);
        let h00 = (1.0 + 2.0 * t) * (1.0 - t).powi(2);
        let h10 = t * (1.0 - t).powi(2);
        let h01 = t.powi(2) * (3.0 - 2.0 * t);
        let h11 = t.powi(2) * (t - 1.0);
        self.f[0] * h00 + self.f[1] * h01 + (self.x[1] - self.x[0]) * (self.m[0] * h10 + self.m[1] * h11)
    }
}

/// Returns the index i such that x lies in [table[i-1][0], table[i][0]],
/// or None if x is outside the tabulated range.
/// The abscissae must be strictly increasing and there must be at least two points.
pub fn locate(x: f64, table: &[[f64; 2]]) -> Option<usize> {
    let first = table.first()?[0];
    let last = table.last()?[0];
    if table.len() < 2 || !(x >= first && x <= last) {
        return None;
    }
    let i = table.partition_point(|pt| pt[0] < x);
    Some(i.max(1))
}

/// Evaluates the monotone cubic interpolant of `table` at `x`.
pub fn evaluate(x: f64, table: &[[f64; 2]]) -> Option<f64> {
    let i = locate(x, table)?;
    let fit_pars = FitParameters::construct(i, table);
    Some(fit_pars.evaluate(x))
}
