//! Per-sample, per-layer scratch buffers for backpropagation
//!
//! One `LayerLearnData` records everything the backward sweep needs about
//! one layer's forward evaluation of one sample. The network keeps a
//! (batch-slot × layer) grid of these, allocated once per distinct batch
//! size and overwritten every sample; contents are never read across
//! samples.

/// Transient per-layer training record for a single sample.
pub struct LayerLearnData {
    /// Copy of the activations fed into this layer.
    pub inputs: Vec<f64>,
    /// Pre-activation sums (bias + Σ weight·input) per output node.
    pub weighted_inputs: Vec<f64>,
    /// Post-activation outputs per output node.
    pub activations: Vec<f64>,
    /// ∂cost/∂weighted-input per output node, the error signal
    /// propagated backward through the network.
    pub node_values: Vec<f64>,
}

impl LayerLearnData {
    /// Allocate zeroed buffers sized for a layer with the given dimensions.
    pub fn new(num_nodes_in: usize, num_nodes_out: usize) -> Self {
        Self {
            inputs: vec![0.0; num_nodes_in],
            weighted_inputs: vec![0.0; num_nodes_out],
            activations: vec![0.0; num_nodes_out],
            node_values: vec![0.0; num_nodes_out],
        }
    }
}
