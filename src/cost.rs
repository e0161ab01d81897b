//! Cost functions
//!
//! Like the activation functions, cost functions are stateful:
//! `calculate_from_inputs` consumes the predicted and expected output vectors
//! and caches the scalar loss plus the per-output derivative inputs, after
//! which `total_cost` and `derivative(i)` are pure lookups.

/// A stateful cost (loss) function shared by one network.
///
/// `calculate_from_inputs` must be called before `total_cost` or
/// `derivative` report values for a given sample; the state always reflects
/// the most recently evaluated sample.
pub trait Cost {
    /// Evaluate the loss of `predicted` against `expected`, reading every
    /// `stride`-th element of both, and cache the per-output derivatives.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero or the two vectors disagree in (strided)
    /// length.
    fn calculate_from_inputs(&mut self, predicted: &[f64], expected: &[f64], stride: usize);

    /// Scalar loss from the most recent `calculate_from_inputs` call.
    fn total_cost(&self) -> f64;

    /// Derivative of the loss with respect to prediction `index`.
    fn derivative(&self, index: usize) -> f64;
}

fn strided_pair_len(predicted: &[f64], expected: &[f64], stride: usize) -> usize {
    assert!(stride > 0, "cost stride must be at least 1");
    let n = predicted.len().div_ceil(stride);
    let m = expected.len().div_ceil(stride);
    assert_eq!(
        n, m,
        "predicted and expected output vectors must have the same length"
    );
    n
}

fn check_index(index: usize, len: usize) {
    assert!(
        index < len,
        "cost derivative index {} out of range (cached {} values; was calculate_from_inputs called?)",
        index,
        len
    );
}

/// Mean squared error: cost = ½ Σ (p_i − e_i)².
///
/// The derivative with respect to prediction `i` is simply `p_i − e_i`,
/// which is what the ½ factor is for.
pub struct MeanSquaredError {
    diffs: Vec<f64>,
    total: f64,
    len: usize,
}

impl MeanSquaredError {
    pub fn new() -> Self {
        Self {
            diffs: Vec::new(),
            total: 0.0,
            len: 0,
        }
    }
}

impl Default for MeanSquaredError {
    fn default() -> Self {
        Self::new()
    }
}

impl Cost for MeanSquaredError {
    fn calculate_from_inputs(&mut self, predicted: &[f64], expected: &[f64], stride: usize) {
        let n = strided_pair_len(predicted, expected, stride);
        if n > self.diffs.len() {
            self.diffs.resize(n, 0.0);
        }
        let mut total = 0.0;
        for ((cache, &p), &e) in self
            .diffs
            .iter_mut()
            .zip(predicted.iter().step_by(stride))
            .zip(expected.iter().step_by(stride))
        {
            let diff = p - e;
            total += diff * diff;
            *cache = diff;
        }
        self.total = 0.5 * total;
        self.len = n;
    }

    fn total_cost(&self) -> f64 {
        self.total
    }

    fn derivative(&self, index: usize) -> f64 {
        check_index(index, self.len);
        self.diffs[index]
    }
}

/// Cross entropy over independent outputs.
///
/// cost = Σ [ −ln(p_i) if e_i ≥ 1, else −ln(1 − p_i) ]. Degenerate
/// predictions (p_i of exactly 0 or 1) produce NaN terms which are clamped
/// to 0 rather than propagated through the batch total; the derivative at
/// those points is likewise defined as 0.
pub struct CrossEntropy {
    derivatives: Vec<f64>,
    total: f64,
    len: usize,
}

impl CrossEntropy {
    pub fn new() -> Self {
        Self {
            derivatives: Vec::new(),
            total: 0.0,
            len: 0,
        }
    }
}

impl Default for CrossEntropy {
    fn default() -> Self {
        Self::new()
    }
}

impl Cost for CrossEntropy {
    fn calculate_from_inputs(&mut self, predicted: &[f64], expected: &[f64], stride: usize) {
        let n = strided_pair_len(predicted, expected, stride);
        if n > self.derivatives.len() {
            self.derivatives.resize(n, 0.0);
        }
        let mut total = 0.0;
        for ((cache, &p), &e) in self
            .derivatives
            .iter_mut()
            .zip(predicted.iter().step_by(stride))
            .zip(expected.iter().step_by(stride))
        {
            let term = if e >= 1.0 { -p.ln() } else { -(1.0 - p).ln() };
            if !term.is_nan() {
                total += term;
            }
            let x = p * (1.0 - p);
            *cache = if x == 0.0 { 0.0 } else { (p - e) / x };
        }
        self.total = total;
        self.len = n;
    }

    fn total_cost(&self) -> f64 {
        self.total
    }

    fn derivative(&self, index: usize) -> f64 {
        check_index(index, self.len);
        self.derivatives[index]
    }
}
