//! Feed-forward neural network trainer
//!
//! This library provides a from-scratch fully-connected network trainer:
//! forward evaluation through stacked dense layers, analytic backpropagation
//! for gradient computation, and parameter updates with momentum and L2
//! weight decay.
//!
//! # Modules
//!
//! - `activation`: Activation functions with per-batch result caches (Sigmoid, ReLU, SoftMax)
//! - `cost`: Cost functions (mean squared error, cross entropy)
//! - `layer`: Fully-connected layer with flat weight storage and gradient accumulators
//! - `learn_data`: Per-sample, per-layer scratch buffers reused across a mini-batch
//! - `network`: Layer stack, classification, and the batched learning loop
//! - `snapshot`: Row/column-addressable parameter export/import (JSON)
//! - `config`: Hyperparameter structures and network construction from config
//! - `utils`: Shared utilities (deterministic RNG)

pub mod activation;
pub mod config;
pub mod cost;
pub mod layer;
pub mod learn_data;
pub mod network;
pub mod snapshot;
pub mod utils;

pub use activation::{Activation, Relu, Sigmoid, SoftMax};
pub use config::{build_network, load_hyperparameters, ActivationKind, CostKind, Hyperparameters};
pub use cost::{Cost, CrossEntropy, MeanSquaredError};
pub use layer::Layer;
pub use learn_data::LayerLearnData;
pub use network::{DataPoint, Network};
pub use snapshot::{load_snapshot, save_snapshot, LayerSnapshot};
pub use utils::rng::SimpleRng;
