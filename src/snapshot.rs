//! Parameter snapshot / transfer format
//!
//! A snapshot is a layer-by-layer, row/column-addressable export of weights
//! and biases, independent of the network's internal flat packing: snapshot
//! weights are addressed `[node_in][node_out]`, the transpose of the
//! internal row-major-by-output-node layout, which reads naturally in JSON.
//! Export and import are exact round-trips modulo that transpose.

use crate::activation::Activation;
use crate::cost::Cost;
use crate::layer::Layer;
use crate::network::Network;
use crate::utils::rng::SimpleRng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;

/// Portable parameters of one layer.
///
/// `weights[node_in][node_out]` connects input node `node_in` to output
/// node `node_out`; `biases[node_out]` is that output node's bias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

impl LayerSnapshot {
    /// Input and output dimension described by this snapshot.
    pub fn dims(&self) -> (usize, usize) {
        (self.weights.len(), self.biases.len())
    }
}

fn invalid_data(message: String) -> Box<dyn Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    ))
}

/// Validates a list of layer snapshots.
///
/// Checks that the list is non-empty, every weight matrix is rectangular
/// with column count matching the bias vector, and consecutive layers chain
/// (output size of layer i equals input size of layer i+1).
fn validate_snapshots(snapshots: &[LayerSnapshot]) -> Result<(), Box<dyn Error>> {
    if snapshots.is_empty() {
        return Err(invalid_data("snapshot must have at least one layer".to_string()));
    }
    for (i, snapshot) in snapshots.iter().enumerate() {
        let (num_in, num_out) = snapshot.dims();
        if num_in == 0 || num_out == 0 {
            return Err(invalid_data(format!(
                "layer {}: snapshot dimensions must be greater than 0",
                i
            )));
        }
        for (node_in, row) in snapshot.weights.iter().enumerate() {
            if row.len() != num_out {
                return Err(invalid_data(format!(
                    "layer {}: weight row {} has {} entries, expected {} (bias count)",
                    i,
                    node_in,
                    row.len(),
                    num_out
                )));
            }
        }
    }
    for i in 0..snapshots.len() - 1 {
        let (_, num_out) = snapshots[i].dims();
        let (next_in, _) = snapshots[i + 1].dims();
        if num_out != next_in {
            return Err(invalid_data(format!(
                "layer connection mismatch: layer {} output size ({}) does not match layer {} input size ({})",
                i,
                num_out,
                i + 1,
                next_in
            )));
        }
    }
    Ok(())
}

impl Network {
    /// Export every layer's parameters as row/column-addressable snapshots.
    pub fn export(&self) -> Vec<LayerSnapshot> {
        self.layers
            .iter()
            .map(|layer| {
                let (num_in, num_out) = layer.dims();
                let weights = (0..num_in)
                    .map(|node_in| {
                        (0..num_out)
                            .map(|node_out| layer.weight(node_in, node_out))
                            .collect()
                    })
                    .collect();
                LayerSnapshot {
                    weights,
                    biases: layer.biases().to_vec(),
                }
            })
            .collect()
    }

    /// Reconstruct a network from exported snapshots.
    ///
    /// The activation factory is called once per layer, as in `Network::new`.
    /// Returns an error when the snapshots are malformed (empty, ragged
    /// weight rows, or mismatched layer chaining); snapshots come from
    /// outside the process, so this is an integration error rather than a
    /// programming error.
    pub fn import(
        snapshots: &[LayerSnapshot],
        activation: impl Fn() -> Box<dyn Activation>,
        cost: Box<dyn Cost>,
    ) -> Result<Network, Box<dyn Error>> {
        validate_snapshots(snapshots)?;
        let mut layers = Vec::with_capacity(snapshots.len());
        // The randomized parameters are overwritten below; the seed only
        // needs to be deterministic.
        let mut rng = SimpleRng::new(1);
        for snapshot in snapshots {
            let (num_in, num_out) = snapshot.dims();
            let mut layer = Layer::new(num_in, num_out, activation(), &mut rng);
            for (node_in, row) in snapshot.weights.iter().enumerate() {
                for (node_out, &weight) in row.iter().enumerate() {
                    layer.set_weight(node_in, node_out, weight);
                }
            }
            layer.set_biases(snapshot.biases.clone());
            layers.push(layer);
        }
        Ok(Network::from_layers(layers, cost))
    }
}

/// Saves layer snapshots to a JSON file.
pub fn save_snapshot(path: &str, snapshots: &[LayerSnapshot]) -> Result<(), Box<dyn Error>> {
    let contents = serde_json::to_string_pretty(snapshots)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Loads layer snapshots from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents, and validates
/// the snapshot shapes.
///
/// # Returns
///
/// `Ok(Vec<LayerSnapshot>)` on success, or an error if the file cannot be
/// read, the JSON is invalid, or the snapshot shapes are inconsistent.
pub fn load_snapshot(path: &str) -> Result<Vec<LayerSnapshot>, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let snapshots: Vec<LayerSnapshot> = serde_json::from_str(&contents)?;
    validate_snapshots(&snapshots)?;
    Ok(snapshots)
}
