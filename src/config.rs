//! Hyperparameter configuration
//!
//! This module provides the training hyperparameter record, JSON loading
//! with validation, and network construction from a configuration. It keeps
//! experimentation out of code: layer sizes, activation/cost selection, and
//! the optimizer constants can all come from a JSON file.

use crate::activation::{Activation, Relu, Sigmoid, SoftMax};
use crate::cost::{Cost, CrossEntropy, MeanSquaredError};
use crate::network::Network;
use crate::utils::rng::SimpleRng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;

/// Activation function selector for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    Sigmoid,
    Relu,
    Softmax,
}

impl ActivationKind {
    /// Create a fresh activation instance of this kind.
    pub fn instantiate(&self) -> Box<dyn Activation> {
        match self {
            ActivationKind::Sigmoid => Box::new(Sigmoid::new()),
            ActivationKind::Relu => Box::new(Relu::new()),
            ActivationKind::Softmax => Box::new(SoftMax::new()),
        }
    }
}

/// Cost function selector for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostKind {
    MeanSquaredError,
    CrossEntropy,
}

impl CostKind {
    /// Create a fresh cost function instance of this kind.
    pub fn instantiate(&self) -> Box<dyn Cost> {
        match self {
            CostKind::MeanSquaredError => Box::new(MeanSquaredError::new()),
            CostKind::CrossEntropy => Box::new(CrossEntropy::new()),
        }
    }
}

/// Training hyperparameters.
///
/// All fields except `layer_sizes` carry defaults, so a minimal JSON config
/// only names the network shape:
///
/// ```json
/// {
///   "layer_sizes": [784, 100, 10],
///   "activation": "relu",
///   "cost": "cross_entropy",
///   "learn_rate_initial": 0.05,
///   "mini_batch_size": 32
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Hyperparameters {
    /// Ordered layer sizes, input dimension first (at least two entries).
    pub layer_sizes: Vec<usize>,

    /// Activation function used by every layer.
    #[serde(default = "default_activation")]
    pub activation: ActivationKind,

    /// Cost function shared by the network.
    #[serde(default = "default_cost")]
    pub cost: CostKind,

    /// Learn rate at epoch zero.
    #[serde(default = "default_learn_rate_initial")]
    pub learn_rate_initial: f64,

    /// Per-epoch hyperbolic decay factor for the learn rate.
    #[serde(default = "default_learn_rate_decay")]
    pub learn_rate_decay: f64,

    /// Number of samples per mini-batch.
    #[serde(default = "default_mini_batch_size")]
    pub mini_batch_size: usize,

    /// Momentum coefficient for velocity updates, in [0, 1].
    #[serde(default = "default_momentum")]
    pub momentum: f64,

    /// L2 weight decay coefficient (applied to weights only).
    #[serde(default = "default_regularization")]
    pub regularization: f64,
}

fn default_activation() -> ActivationKind {
    ActivationKind::Relu
}

fn default_cost() -> CostKind {
    CostKind::CrossEntropy
}

fn default_learn_rate_initial() -> f64 {
    0.05
}

fn default_learn_rate_decay() -> f64 {
    0.075
}

fn default_mini_batch_size() -> usize {
    32
}

fn default_momentum() -> f64 {
    0.9
}

fn default_regularization() -> f64 {
    0.1
}

impl Hyperparameters {
    /// Default hyperparameters for the given network shape.
    pub fn new(layer_sizes: Vec<usize>) -> Self {
        Self {
            layer_sizes,
            activation: default_activation(),
            cost: default_cost(),
            learn_rate_initial: default_learn_rate_initial(),
            learn_rate_decay: default_learn_rate_decay(),
            mini_batch_size: default_mini_batch_size(),
            momentum: default_momentum(),
            regularization: default_regularization(),
        }
    }

    /// Decayed learn rate for the given epoch:
    /// `learn_rate_initial / (1 + learn_rate_decay * epoch)`.
    pub fn learn_rate_at(&self, epoch: usize) -> f64 {
        self.learn_rate_initial / (1.0 + self.learn_rate_decay * epoch as f64)
    }
}

/// Loads training hyperparameters from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents, and validates
/// the parameter values.
///
/// # Returns
///
/// `Ok(Hyperparameters)` on success, or an error if the file cannot be read,
/// the JSON is invalid, or a parameter is out of range.
pub fn load_hyperparameters(path: &str) -> Result<Hyperparameters, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let params: Hyperparameters = serde_json::from_str(&contents)?;
    validate_hyperparameters(&params)?;
    Ok(params)
}

fn invalid_data(message: String) -> Box<dyn Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    ))
}

fn validate_hyperparameters(params: &Hyperparameters) -> Result<(), Box<dyn Error>> {
    if params.layer_sizes.len() < 2 {
        return Err(invalid_data(
            "layer_sizes must have at least two entries (input and output)".to_string(),
        ));
    }
    if let Some(i) = params.layer_sizes.iter().position(|&size| size == 0) {
        return Err(invalid_data(format!(
            "layer_sizes[{}] must be greater than 0",
            i
        )));
    }
    if params.learn_rate_initial <= 0.0 {
        return Err(invalid_data(
            "learn_rate_initial must be positive".to_string(),
        ));
    }
    if params.learn_rate_decay < 0.0 {
        return Err(invalid_data(
            "learn_rate_decay must be non-negative".to_string(),
        ));
    }
    if params.mini_batch_size == 0 {
        return Err(invalid_data(
            "mini_batch_size must be greater than 0".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&params.momentum) {
        return Err(invalid_data(
            "momentum must be in range [0.0, 1.0]".to_string(),
        ));
    }
    if params.regularization < 0.0 {
        return Err(invalid_data(
            "regularization must be non-negative".to_string(),
        ));
    }
    Ok(())
}

/// Builds a network from hyperparameters.
///
/// Validates the configuration and constructs the layer stack with the
/// selected activation and cost functions, using the provided RNG for
/// weight initialization.
pub fn build_network(
    params: &Hyperparameters,
    rng: &mut SimpleRng,
) -> Result<Network, Box<dyn Error>> {
    validate_hyperparameters(params)?;
    Ok(Network::new(
        &params.layer_sizes,
        || params.activation.instantiate(),
        params.cost.instantiate(),
        rng,
    ))
}
