//! Shared utilities for the network trainer
//!
//! This module provides the deterministic random number generator used for
//! weight initialization.

pub mod rng;

pub use rng::SimpleRng;
