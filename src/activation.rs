//! Activation functions with per-batch result caches
//!
//! Each activation function is a stateful unit: `calculate_from_inputs`
//! consumes a whole vector of pre-activation (weighted-sum) values and caches
//! what it needs, after which `activate(i)` and `derivative(i)` are pure
//! lookups. The cache grows to the largest call seen so far and never
//! shrinks, so repeated forward passes over a fixed network shape do not
//! reallocate.
//!
//! Calling `activate`/`derivative` before `calculate_from_inputs`, or with an
//! out-of-range index, is a programming error and panics.

/// A stateful activation function.
///
/// The contract is call-order sensitive: `calculate_from_inputs` must run
/// before any `activate`/`derivative` lookup for the same batch of values.
/// Each layer owns its own instance, so caches filled during a forward sweep
/// stay valid for the backward sweep of the same sample.
pub trait Activation {
    /// Consume a vector of weighted-input values, reading every `stride`-th
    /// element, and cache activations and derivative inputs.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero.
    fn calculate_from_inputs(&mut self, weighted_inputs: &[f64], stride: usize);

    /// Activated value for node `index`, from the most recent
    /// `calculate_from_inputs` call.
    fn activate(&self, index: usize) -> f64;

    /// Derivative of the activation with respect to its weighted input, for
    /// node `index`.
    fn derivative(&self, index: usize) -> f64;
}

// Number of elements a strided pass over `values` yields.
fn strided_len(values: &[f64], stride: usize) -> usize {
    assert!(stride > 0, "activation stride must be at least 1");
    values.len().div_ceil(stride)
}

fn check_index(index: usize, len: usize) {
    assert!(
        index < len,
        "activation lookup index {} out of range (cached {} values; was calculate_from_inputs called?)",
        index,
        len
    );
}

/// Sigmoid activation: a = 1 / (1 + e^-x).
///
/// Caches the activated values; the derivative a(1 - a) is computed from the
/// cached activation.
pub struct Sigmoid {
    activations: Vec<f64>,
    len: usize,
}

impl Sigmoid {
    pub fn new() -> Self {
        Self {
            activations: Vec::new(),
            len: 0,
        }
    }
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self::new()
    }
}

impl Activation for Sigmoid {
    fn calculate_from_inputs(&mut self, weighted_inputs: &[f64], stride: usize) {
        let n = strided_len(weighted_inputs, stride);
        if n > self.activations.len() {
            self.activations.resize(n, 0.0);
        }
        for (cache, &x) in self
            .activations
            .iter_mut()
            .zip(weighted_inputs.iter().step_by(stride))
        {
            *cache = 1.0 / (1.0 + (-x).exp());
        }
        self.len = n;
    }

    fn activate(&self, index: usize) -> f64 {
        check_index(index, self.len);
        self.activations[index]
    }

    fn derivative(&self, index: usize) -> f64 {
        check_index(index, self.len);
        let a = self.activations[index];
        a * (1.0 - a)
    }
}

/// Rectified linear unit with an optional floor ("inflection") parameter.
///
/// Activation is `max(inflection, x)`; the derivative is 1 where
/// `x >= inflection` and 0 elsewhere. The default inflection of 0 gives the
/// standard ReLU. Caches the raw weighted inputs.
pub struct Relu {
    inflection: f64,
    weighted_inputs: Vec<f64>,
    len: usize,
}

impl Relu {
    /// Standard ReLU with a floor at zero.
    pub fn new() -> Self {
        Self::with_inflection(0.0)
    }

    /// ReLU whose output never drops below `inflection`.
    pub fn with_inflection(inflection: f64) -> Self {
        Self {
            inflection,
            weighted_inputs: Vec::new(),
            len: 0,
        }
    }
}

impl Default for Relu {
    fn default() -> Self {
        Self::new()
    }
}

impl Activation for Relu {
    fn calculate_from_inputs(&mut self, weighted_inputs: &[f64], stride: usize) {
        let n = strided_len(weighted_inputs, stride);
        if n > self.weighted_inputs.len() {
            self.weighted_inputs.resize(n, 0.0);
        }
        for (cache, &x) in self
            .weighted_inputs
            .iter_mut()
            .zip(weighted_inputs.iter().step_by(stride))
        {
            *cache = x;
        }
        self.len = n;
    }

    fn activate(&self, index: usize) -> f64 {
        check_index(index, self.len);
        self.weighted_inputs[index].max(self.inflection)
    }

    fn derivative(&self, index: usize) -> f64 {
        check_index(index, self.len);
        if self.weighted_inputs[index] >= self.inflection {
            1.0
        } else {
            0.0
        }
    }
}

/// SoftMax activation: a_i = e^{x_i} / Σ_j e^{x_j}.
///
/// Exponentials use the max-subtraction trick for numerical stability; both
/// the activation and the derivative below are invariant under that shared
/// rescaling.
///
/// The derivative is the uncoupled diagonal term `(e_i·S − e_i²)/S²`, not the
/// full Jacobian. This is a known simplification carried from the original
/// design: the textbook SoftMax + cross-entropy gradient would combine to
/// `prediction − target`, but here SoftMax's own derivative is computed
/// independently of the cost function.
pub struct SoftMax {
    exps: Vec<f64>,
    sum: f64,
    len: usize,
}

impl SoftMax {
    pub fn new() -> Self {
        Self {
            exps: Vec::new(),
            sum: 0.0,
            len: 0,
        }
    }
}

impl Default for SoftMax {
    fn default() -> Self {
        Self::new()
    }
}

impl Activation for SoftMax {
    fn calculate_from_inputs(&mut self, weighted_inputs: &[f64], stride: usize) {
        let n = strided_len(weighted_inputs, stride);
        if n > self.exps.len() {
            self.exps.resize(n, 0.0);
        }
        let max = weighted_inputs
            .iter()
            .step_by(stride)
            .fold(f64::NEG_INFINITY, |m, &x| m.max(x));
        let mut sum = 0.0;
        for (cache, &x) in self
            .exps
            .iter_mut()
            .zip(weighted_inputs.iter().step_by(stride))
        {
            *cache = (x - max).exp();
            sum += *cache;
        }
        self.sum = sum;
        self.len = n;
    }

    fn activate(&self, index: usize) -> f64 {
        check_index(index, self.len);
        self.exps[index] / self.sum
    }

    fn derivative(&self, index: usize) -> f64 {
        check_index(index, self.len);
        let e = self.exps[index];
        (e * self.sum - e * e) / (self.sum * self.sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_sigmoid_zero() {
        let mut f = Sigmoid::new();
        f.calculate_from_inputs(&[0.0], 1);
        assert!((f.activate(0) - 0.5).abs() < EPSILON);
        assert!((f.derivative(0) - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_relu_inflection() {
        let mut f = Relu::with_inflection(0.5);
        f.calculate_from_inputs(&[0.2, 0.5, 2.0], 1);
        assert_eq!(f.activate(0), 0.5);
        assert_eq!(f.activate(1), 0.5);
        assert_eq!(f.activate(2), 2.0);
        assert_eq!(f.derivative(0), 0.0);
        assert_eq!(f.derivative(1), 1.0);
        assert_eq!(f.derivative(2), 1.0);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let mut f = SoftMax::new();
        f.calculate_from_inputs(&[1.0, 2.0, 3.0], 1);
        let sum: f64 = (0..3).map(|i| f.activate(i)).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let mut f = SoftMax::new();
        f.calculate_from_inputs(&[1000.0, 1001.0, 1002.0], 1);
        for i in 0..3 {
            assert!(f.activate(i).is_finite());
            assert!(f.derivative(i).is_finite());
        }
    }

    #[test]
    fn test_strided_read() {
        let mut f = Sigmoid::new();
        f.calculate_from_inputs(&[0.0, 99.0, 0.0, 99.0], 2);
        assert!((f.activate(0) - 0.5).abs() < EPSILON);
        assert!((f.activate(1) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_cache_grows_never_shrinks() {
        let mut f = Sigmoid::new();
        f.calculate_from_inputs(&[0.0, 0.0, 0.0], 1);
        f.calculate_from_inputs(&[1.0], 1);
        assert!(f.activations.len() >= 3);
        assert_eq!(f.len, 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_lookup_before_calculate_panics() {
        let f = Sigmoid::new();
        f.activate(0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_lookup_out_of_range_panics() {
        let mut f = Relu::new();
        f.calculate_from_inputs(&[1.0, 2.0], 1);
        f.derivative(2);
    }
}
