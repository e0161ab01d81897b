//! Fully connected layer with flat weight storage
//!
//! The weight matrix is stored as one flat array, row-major by output node:
//! the weight connecting input node `i` to output node `j` lives at index
//! `j * num_nodes_in + i`. `weight_index` is the single source of truth for
//! that mapping; the forward pass, the backward pass, and the snapshot
//! transpose all go through it.

use crate::activation::Activation;
use crate::learn_data::LayerLearnData;
use crate::utils::rng::SimpleRng;

/// One fully connected layer: weights, biases, their momentum velocities,
/// and the gradient accumulators filled during backpropagation.
///
/// Each layer owns its own activation function instance, since the
/// activation caches per-call results that the backward sweep reads.
pub struct Layer {
    num_nodes_in: usize,
    weights: Vec<f64>,
    weight_velocities: Vec<f64>,
    cost_gradient_w: Vec<f64>,
    biases: Vec<f64>,
    bias_velocities: Vec<f64>,
    cost_gradient_b: Vec<f64>,
    activation: Box<dyn Activation>,
}

impl Layer {
    /// Create a layer with `num_nodes_in * num_nodes_out` weights drawn
    /// uniformly from `[-1/sqrt(num_nodes_in), +1/sqrt(num_nodes_in)]` and
    /// biases drawn uniformly from `[-1, +1]`.
    ///
    /// The RNG is caller-supplied so construction is deterministic and
    /// independent across networks.
    pub fn new(
        num_nodes_in: usize,
        num_nodes_out: usize,
        activation: Box<dyn Activation>,
        rng: &mut SimpleRng,
    ) -> Self {
        assert!(
            num_nodes_in > 0 && num_nodes_out > 0,
            "layer dimensions must be greater than 0"
        );
        let size_w = num_nodes_in * num_nodes_out;
        let limit = 1.0 / (num_nodes_in as f64).sqrt();

        let mut weights = vec![0.0f64; size_w];
        for value in &mut weights {
            *value = rng.gen_range_f64(-limit, limit);
        }
        let mut biases = vec![0.0f64; num_nodes_out];
        for value in &mut biases {
            *value = rng.gen_range_f64(-1.0, 1.0);
        }

        Self {
            num_nodes_in,
            weights,
            weight_velocities: vec![0.0; size_w],
            cost_gradient_w: vec![0.0; size_w],
            biases,
            bias_velocities: vec![0.0; num_nodes_out],
            cost_gradient_b: vec![0.0; num_nodes_out],
            activation,
        }
    }

    /// Input and output dimension of the layer.
    pub fn dims(&self) -> (usize, usize) {
        (self.num_nodes_in, self.biases.len())
    }

    /// Flat index of the weight connecting input node `node_in` to output
    /// node `node_out`.
    #[inline]
    pub fn weight_index(&self, node_in: usize, node_out: usize) -> usize {
        node_out * self.num_nodes_in + node_in
    }

    /// Weight connecting input node `node_in` to output node `node_out`.
    pub fn weight(&self, node_in: usize, node_out: usize) -> f64 {
        self.weights[self.weight_index(node_in, node_out)]
    }

    /// The bias vector, one entry per output node.
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// Total count of trainable parameters (weights plus biases).
    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    pub(crate) fn set_weight(&mut self, node_in: usize, node_out: usize, value: f64) {
        let idx = self.weight_index(node_in, node_out);
        self.weights[idx] = value;
    }

    pub(crate) fn set_biases(&mut self, biases: Vec<f64>) {
        assert_eq!(biases.len(), self.biases.len(), "bias vector length mismatch");
        self.biases = biases;
    }

    pub(crate) fn activation(&self) -> &dyn Activation {
        self.activation.as_ref()
    }

    /// Forward evaluation: for each output node compute bias + Σ
    /// weight·input, feed the whole vector through the activation function,
    /// and read back the per-node activations.
    ///
    /// # Panics
    ///
    /// Panics if any buffer length disagrees with the layer dimensions, or
    /// if a weighted sum or activation comes out NaN or infinite. Diverged
    /// parameters must never propagate silently.
    pub fn store_outputs(
        &mut self,
        inputs: &[f64],
        weighted_inputs: &mut [f64],
        activations: &mut [f64],
    ) {
        let (num_nodes_in, num_nodes_out) = self.dims();
        assert_eq!(inputs.len(), num_nodes_in, "input vector length mismatch");
        assert_eq!(
            weighted_inputs.len(),
            num_nodes_out,
            "weighted input buffer length mismatch"
        );
        assert_eq!(
            activations.len(),
            num_nodes_out,
            "activation buffer length mismatch"
        );

        for node_out in 0..num_nodes_out {
            let mut weighted = self.biases[node_out];
            for (node_in, &input) in inputs.iter().enumerate() {
                weighted += input * self.weights[self.weight_index(node_in, node_out)];
            }
            if !weighted.is_finite() {
                panic!("NaN/Inf weighted input at output node {}", node_out);
            }
            weighted_inputs[node_out] = weighted;
        }

        self.activation.calculate_from_inputs(weighted_inputs, 1);
        for (node_out, slot) in activations.iter_mut().enumerate() {
            let activation = self.activation.activate(node_out);
            if !activation.is_finite() {
                panic!("NaN/Inf activation at output node {}", node_out);
            }
            *slot = activation;
        }
    }

    /// Accumulate this sample's gradient contributions from the node values
    /// (∂cost/∂weighted-input) recorded in `learn_data`.
    ///
    /// Contributions are added, not overwritten, so repeated calls across a
    /// mini-batch sum up before `apply_gradients` averages them.
    pub fn update_gradients(&mut self, learn_data: &LayerLearnData) {
        let (num_nodes_in, num_nodes_out) = self.dims();
        for node_out in 0..num_nodes_out {
            let node_value = learn_data.node_values[node_out];
            // d(weighted input)/d(bias) is 1.
            self.cost_gradient_b[node_out] += node_value;
            for node_in in 0..num_nodes_in {
                // d(cost)/d(weight) = input * node value.
                let idx = self.weight_index(node_in, node_out);
                self.cost_gradient_w[idx] += learn_data.inputs[node_in] * node_value;
            }
        }
    }

    /// Apply the accumulated gradients with momentum and L2 weight decay,
    /// then zero the accumulators for the next batch.
    ///
    /// For each weight: `velocity = velocity*momentum − gradient*learn_rate`
    /// and `weight = weight*(1 − regularization*learn_rate) + velocity`.
    /// Biases use the same velocity update without the decay factor;
    /// regularization applies to weights only.
    pub fn apply_gradients(&mut self, learn_rate: f64, regularization: f64, momentum: f64) {
        let weight_decay = 1.0 - regularization * learn_rate;

        for (i, weight) in self.weights.iter_mut().enumerate() {
            let velocity = self.weight_velocities[i] * momentum - self.cost_gradient_w[i] * learn_rate;
            self.weight_velocities[i] = velocity;
            *weight = *weight * weight_decay + velocity;
            // Zero the gradient to prepare for the next learn iteration.
            self.cost_gradient_w[i] = 0.0;
        }

        for (i, bias) in self.biases.iter_mut().enumerate() {
            let velocity = self.bias_velocities[i] * momentum - self.cost_gradient_b[i] * learn_rate;
            self.bias_velocities[i] = velocity;
            *bias += velocity;
            self.cost_gradient_b[i] = 0.0;
        }
    }
}
