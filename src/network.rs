//! Network: an ordered stack of fully connected layers
//!
//! The network owns its layers, one shared cost function, and the per-batch
//! learn-data scratch grid. Training follows the classic mini-batch loop:
//! for each sample a forward sweep records inputs, weighted sums, and
//! activations per layer, a backward sweep turns cost derivatives into
//! per-node error signals via the chain rule, and each layer accumulates
//! gradient contributions; after the whole batch, gradients are applied once
//! per layer with the learn rate scaled by `1/batch_len` so contributions
//! are averaged rather than summed.

use crate::activation::Activation;
use crate::cost::Cost;
use crate::layer::Layer;
use crate::learn_data::LayerLearnData;
use crate::utils::rng::SimpleRng;

/// One training sample: an input vector sized to the first layer and an
/// expected output vector (one-hot or soft target) sized to the last layer.
#[derive(Debug, Clone)]
pub struct DataPoint {
    pub input: Vec<f64>,
    pub expected_output: Vec<f64>,
}

/// A feed-forward neural network of fully connected layers.
pub struct Network {
    pub(crate) layers: Vec<Layer>,
    cost: Box<dyn Cost>,
    /// Scratch buffers indexed by (batch slot, layer index); reallocated
    /// only when the batch size changes.
    batch_learn_data: Vec<Vec<LayerLearnData>>,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("layers", &self.layers.len())
            .finish_non_exhaustive()
    }
}

impl Network {
    /// Create a network from an ordered list of layer sizes.
    ///
    /// `layer_sizes` must hold at least two entries (input and output
    /// dimension); each consecutive pair becomes one layer. The activation
    /// factory is called once per layer, since every layer needs its own
    /// stateful instance. Weight initialization draws from the supplied RNG
    /// so construction is reproducible.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two layer sizes are given.
    pub fn new(
        layer_sizes: &[usize],
        activation: impl Fn() -> Box<dyn Activation>,
        cost: Box<dyn Cost>,
        rng: &mut SimpleRng,
    ) -> Self {
        assert!(
            layer_sizes.len() >= 2,
            "a network needs at least an input and an output layer size"
        );
        let layers = layer_sizes
            .windows(2)
            .map(|pair| Layer::new(pair[0], pair[1], activation(), rng))
            .collect();
        Self {
            layers,
            cost,
            batch_learn_data: Vec::new(),
        }
    }

    pub(crate) fn from_layers(layers: Vec<Layer>, cost: Box<dyn Cost>) -> Self {
        Self {
            layers,
            cost,
            batch_learn_data: Vec::new(),
        }
    }

    /// Input and output dimension of the whole network.
    pub fn dims(&self) -> (usize, usize) {
        let (num_in, _) = self.layers[0].dims();
        let (_, num_out) = self.layers[self.layers.len() - 1].dims();
        (num_in, num_out)
    }

    /// Run `input` through every layer and return the output activations.
    ///
    /// # Panics
    ///
    /// Panics if the input length mismatches the first layer's expected
    /// input length, or on numerical divergence inside a layer.
    pub fn calculate_outputs(&mut self, input: &[f64]) -> Vec<f64> {
        let (num_in, _) = self.dims();
        assert_eq!(
            input.len(),
            num_in,
            "input length mismatches first layer expected input length"
        );
        let mut activations = input.to_vec();
        for layer in self.layers.iter_mut() {
            let (_, num_out) = layer.dims();
            let mut weighted_inputs = vec![0.0; num_out];
            let mut next = vec![0.0; num_out];
            layer.store_outputs(&activations, &mut weighted_inputs, &mut next);
            activations = next;
        }
        activations
    }

    /// Run `input` through the network and return the index of the output
    /// node with the highest activation, along with the full output vector.
    ///
    /// Ties break toward the lowest index: the comparison is a strict `>`
    /// against the running maximum.
    pub fn classify(&mut self, input: &[f64]) -> (usize, Vec<f64>) {
        let outputs = self.calculate_outputs(input);
        (max_index(&outputs), outputs)
    }

    /// Run one mini-batch learning step.
    ///
    /// Accumulates gradients over every sample via backpropagation, then
    /// applies them once per layer with the learn rate scaled by
    /// `1/batch_len`. The caller chooses and supplies the batches; the
    /// network does not shuffle or partition data itself.
    ///
    /// # Panics
    ///
    /// Panics on an empty batch, on sample vectors whose lengths disagree
    /// with the network dimensions, or on numerical divergence.
    pub fn learn(
        &mut self,
        training_data: &[DataPoint],
        learn_rate: f64,
        regularization: f64,
        momentum: f64,
    ) {
        assert!(!training_data.is_empty(), "cannot learn from an empty batch");
        if self.batch_learn_data.len() != training_data.len() {
            self.batch_learn_data = (0..training_data.len())
                .map(|_| {
                    self.layers
                        .iter()
                        .map(|layer| {
                            let (num_in, num_out) = layer.dims();
                            LayerLearnData::new(num_in, num_out)
                        })
                        .collect()
                })
                .collect();
        }

        let Network {
            layers,
            cost,
            batch_learn_data,
        } = self;
        for (sample, learn_data) in training_data.iter().zip(batch_learn_data.iter_mut()) {
            update_gradients(layers, cost.as_mut(), sample, learn_data);
        }

        // Scale so gradients are averaged over the batch, not summed.
        let scaled_learn_rate = learn_rate / training_data.len() as f64;
        for layer in self.layers.iter_mut() {
            layer.apply_gradients(scaled_learn_rate, regularization, momentum);
        }
    }

    /// Cost of the most recently evaluated sample.
    ///
    /// After `learn` this reports the last sample of the batch; after
    /// `evaluate_cost` it reports the last sample of that dataset.
    pub fn total_cost(&self) -> f64 {
        self.cost.total_cost()
    }

    /// Mean cost over a dataset, without touching any gradients.
    pub fn evaluate_cost(&mut self, data: &[DataPoint]) -> f64 {
        assert!(!data.is_empty(), "cannot evaluate the cost of an empty dataset");
        let mut total = 0.0;
        for sample in data {
            let outputs = self.calculate_outputs(&sample.input);
            self.cost
                .calculate_from_inputs(&outputs, &sample.expected_output, 1);
            total += self.cost.total_cost();
        }
        total / data.len() as f64
    }
}

/// Index of the highest value under strict `>`, ties toward lower indices.
fn max_index(outputs: &[f64]) -> usize {
    let mut max_value = f64::NEG_INFINITY;
    let mut index = 0;
    for (i, &value) in outputs.iter().enumerate() {
        if value > max_value {
            max_value = value;
            index = i;
        }
    }
    index
}

/// Forward/backward pass for one sample, accumulating into every layer's
/// gradient buffers.
fn update_gradients(
    layers: &mut [Layer],
    cost: &mut dyn Cost,
    sample: &DataPoint,
    learn_data: &mut [LayerLearnData],
) {
    // Forward sweep: feed the sample through the layers in order, recording
    // each layer's inputs, weighted sums, and activations.
    for i in 0..layers.len() {
        if i == 0 {
            let ld = &mut learn_data[0];
            assert_eq!(
                sample.input.len(),
                ld.inputs.len(),
                "training input length mismatches first layer expected input length"
            );
            ld.inputs.copy_from_slice(&sample.input);
        } else {
            let (prev, rest) = learn_data.split_at_mut(i);
            rest[0].inputs.copy_from_slice(&prev[i - 1].activations);
        }
        let ld = &mut learn_data[i];
        layers[i].store_outputs(&ld.inputs, &mut ld.weighted_inputs, &mut ld.activations);
    }

    // Output layer error: cost derivative times activation derivative gives
    // the node values (∂cost/∂weighted-input) of the last layer.
    let output_idx = layers.len() - 1;
    {
        let ld = &mut learn_data[output_idx];
        cost.calculate_from_inputs(&ld.activations, &sample.expected_output, 1);
        let output_layer = &layers[output_idx];
        for node in 0..ld.node_values.len() {
            ld.node_values[node] =
                cost.derivative(node) * output_layer.activation().derivative(node);
        }
    }
    layers[output_idx].update_gradients(&learn_data[output_idx]);

    // Backward sweep: propagate the error signal from the second-to-last
    // layer down to the first. Each node's value is the weighted sum of the
    // next layer's node values through the connecting weights, times this
    // layer's activation derivative.
    for i in (0..output_idx).rev() {
        let (head, tail) = layers.split_at_mut(i + 1);
        let layer = &mut head[i];
        let next_layer = &tail[0];
        let (ld_head, ld_tail) = learn_data.split_at_mut(i + 1);
        let ld = &mut ld_head[i];
        let next_node_values = &ld_tail[0].node_values;

        let (_, num_nodes_out) = layer.dims();
        for node in 0..num_nodes_out {
            let mut node_value = 0.0;
            for (next_node, &next_value) in next_node_values.iter().enumerate() {
                node_value += next_layer.weight(node, next_node) * next_value;
            }
            node_value *= layer.activation().derivative(node);
            ld.node_values[node] = node_value;
        }
        layer.update_gradients(ld);
    }
}
