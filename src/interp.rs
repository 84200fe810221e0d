//! One-dimensional interpolants over strictly increasing knots.
//!
//! The shape fitter evaluates these on dense sample grids; the seam corrector
//! evaluates them between a handful of anchor samples on either side of a
//! segment.
/// Piecewise-linear interpolation with flat extrapolation outside the knots.
pub fn interp_linear(xs: &[f64], ys: &[f64], queries: &[f64]) -> Vec<f64> {
    queries.iter().map(|&x| linear_at(xs, ys, x)).collect()
}
fn linear_at(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    match xs.len() {
        0 => 0.0,
        1 => ys[0],
        n => {
            if x <= xs[0] {
                return ys[0];
            }
            if x >= xs[n - 1] {
                return ys[n - 1];
            }
            let i = interval(xs, x);
            let t = (x - xs[i]) / (xs[i + 1] - xs[i]);
            ys[i] + (ys[i + 1] - ys[i]) * t
        }
    }
}
/// Index `i` of the knot interval `[xs[i], xs[i + 1]]` holding `x`, clamped to the end intervals.
fn interval(xs: &[f64], x: f64) -> usize {
    let upper = xs.partition_point(|&k| k <= x);
    upper.saturating_sub(1).min(xs.len().saturating_sub(2))
}
/// Natural cubic spline (zero second derivative at both ends).
#[derive(Clone, Debug)]
pub struct NaturalSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    second: Vec<f64>,
}
impl NaturalSpline {
    pub fn fit(xs: &[f64], ys: &[f64]) -> Self {
        let n = xs.len().min(ys.len());
        let mut second = vec![0.0; n];
        if n >= 3 {
            // Thomas algorithm on the interior equations.
            let m = n - 2;
            let mut diag = vec![0.0; m];
            let mut upper = vec![0.0; m];
            let mut rhs = vec![0.0; m];
            for k in 0..m {
                let i = k + 1;
                let h0 = xs[i] - xs[i - 1];
                let h1 = xs[i + 1] - xs[i];
                diag[k] = 2.0 * (h0 + h1);
                upper[k] = h1;
                rhs[k] = 6.0 * ((ys[i + 1] - ys[i]) / h1 - (ys[i] - ys[i - 1]) / h0);
            }
            for k in 1..m {
                let lower = xs[k + 1] - xs[k];
                let w = lower / diag[k - 1];
                diag[k] -= w * upper[k - 1];
                rhs[k] -= w * rhs[k - 1];
            }
            second[m] = rhs[m - 1] / diag[m - 1];
            for k in (0..m - 1).rev() {
                second[k + 1] = (rhs[k] - upper[k] * second[k + 2]) / diag[k];
            }
        }
        Self {
            xs: xs[..n].to_vec(),
            ys: ys[..n].to_vec(),
            second,
        }
    }
    pub fn eval(&self, x: f64) -> f64 {
        match self.xs.len() {
            0 => 0.0,
            1 => self.ys[0],
            _ => {
                let i = interval(&self.xs, x);
                let h = self.xs[i + 1] - self.xs[i];
                let a = (self.xs[i + 1] - x) / h;
                let b = (x - self.xs[i]) / h;
                a * self.ys[i]
                    + b * self.ys[i + 1]
                    + ((a * a * a - a) * self.second[i] + (b * b * b - b) * self.second[i + 1]) * h
                        * h
                        / 6.0
            }
        }
    }
    pub fn eval_many(&self, queries: &[f64]) -> Vec<f64> {
        queries.iter().map(|&x| self.eval(x)).collect()
    }
}
/// Shape-preserving piecewise cubic Hermite interpolant (Fritsch–Carlson slopes).
#[derive(Clone, Debug)]
pub struct Pchip {
    xs: Vec<f64>,
    ys: Vec<f64>,
    slopes: Vec<f64>,
}
impl Pchip {
    pub fn fit(xs: &[f64], ys: &[f64]) -> Self {
        let n = xs.len().min(ys.len());
        let mut slopes = vec![0.0; n];
        if n == 2 {
            let delta = (ys[1] - ys[0]) / (xs[1] - xs[0]);
            slopes = vec![delta, delta];
        } else if n > 2 {
            let h: Vec<f64> = (0..n - 1).map(|i| xs[i + 1] - xs[i]).collect();
            let delta: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();
            for i in 1..n - 1 {
                if delta[i - 1] * delta[i] > 0.0 {
                    let w1 = 2.0 * h[i] + h[i - 1];
                    let w2 = h[i] + 2.0 * h[i - 1];
                    slopes[i] = (w1 + w2) / (w1 / delta[i - 1] + w2 / delta[i]);
                }
            }
            slopes[0] = end_slope(h[0], h[1], delta[0], delta[1]);
            slopes[n - 1] = end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
        }
        Self {
            xs: xs[..n].to_vec(),
            ys: ys[..n].to_vec(),
            slopes,
        }
    }
    pub fn eval(&self, x: f64) -> f64 {
        match self.xs.len() {
            0 => 0.0,
            1 => self.ys[0],
            _ => {
                let i = interval(&self.xs, x);
                let h = self.xs[i + 1] - self.xs[i];
                let t = (x - self.xs[i]) / h;
                let t2 = t * t;
                let t3 = t2 * t;
                (2.0 * t3 - 3.0 * t2 + 1.0) * self.ys[i]
                    + (t3 - 2.0 * t2 + t) * h * self.slopes[i]
                    + (-2.0 * t3 + 3.0 * t2) * self.ys[i + 1]
                    + (t3 - t2) * h * self.slopes[i + 1]
            }
        }
    }
    pub fn eval_many(&self, queries: &[f64]) -> Vec<f64> {
        queries.iter().map(|&x| self.eval(x)).collect()
    }
}
fn end_slope(h0: f64, h1: f64, delta0: f64, delta1: f64) -> f64 {
    let slope = ((2.0 * h0 + h1) * delta0 - h0 * delta1) / (h0 + h1);
    if slope.signum() != delta0.signum() {
        0.0
    } else if delta0.signum() != delta1.signum() && slope.abs() > 3.0 * delta0.abs() {
        3.0 * delta0
    } else {
        slope
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn linear_hits_knots_and_midpoints() {
        let xs = [0.0, 2.0, 4.0];
        let ys = [0.0, 4.0, 0.0];
        let out = interp_linear(&xs, &ys, &[-1.0, 0.0, 1.0, 2.0, 3.0, 5.0]);
        assert_eq!(out, vec![0.0, 0.0, 2.0, 4.0, 2.0, 0.0]);
    }
    #[test]
    fn natural_spline_reproduces_lines() {
        let xs = [0.0, 1.0, 3.0, 7.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x - 1.0).collect();
        let spline = NaturalSpline::fit(&xs, &ys);
        for x in [0.5, 2.0, 5.5] {
            assert!((spline.eval(x) - (2.0 * x - 1.0)).abs() < 1e-9);
        }
    }
    #[test]
    fn natural_spline_passes_through_knots() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 1.0, 0.0, -1.0, 0.0];
        let spline = NaturalSpline::fit(&xs, &ys);
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert!((spline.eval(*x) - y).abs() < 1e-9);
        }
    }
    #[test]
    fn pchip_does_not_overshoot_steps() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 0.0, 1.0, 1.0];
        let pchip = Pchip::fit(&xs, &ys);
        for k in 0..=30 {
            let v = pchip.eval(k as f64 / 10.0);
            assert!((-1e-12..=1.0 + 1e-12).contains(&v), "overshoot {v}");
        }
    }
}
