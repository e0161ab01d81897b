// Tests for the gradient application step: momentum velocity carry-over
// across batches and L2 weight decay on weights but not biases.

use approx::assert_relative_eq;
use feedforward::{Layer, LayerLearnData, Sigmoid, SimpleRng};

// A 1x1 layer plus learn data producing a known gradient: with input x and
// node value nv the weight gradient is x*nv and the bias gradient is nv.
fn layer_with_gradient(x: f64, nv: f64) -> (Layer, LayerLearnData) {
    let mut rng = SimpleRng::new(3);
    let layer = Layer::new(1, 1, Box::new(Sigmoid::new()), &mut rng);
    let mut learn_data = LayerLearnData::new(1, 1);
    learn_data.inputs[0] = x;
    learn_data.node_values[0] = nv;
    (layer, learn_data)
}

#[test]
fn test_momentum_carries_velocity_across_applications() {
    let (x, nv, lr, momentum) = (0.5, 2.0, 0.1, 0.9);
    let (mut layer, learn_data) = layer_with_gradient(x, nv);
    let w0 = layer.weight(0, 0);
    let b0 = layer.biases()[0];

    let grad_w = x * nv;
    let grad_b = nv;

    // First application starts from zero velocity.
    layer.update_gradients(&learn_data);
    layer.apply_gradients(lr, 0.0, momentum);
    let v1_w = -grad_w * lr;
    let v1_b = -grad_b * lr;
    assert_relative_eq!(layer.weight(0, 0), w0 + v1_w, epsilon = 1e-12);
    assert_relative_eq!(layer.biases()[0], b0 + v1_b, epsilon = 1e-12);

    // Second application with the same gradient: the previous velocity is
    // scaled by the momentum coefficient before the new gradient is added.
    layer.update_gradients(&learn_data);
    layer.apply_gradients(lr, 0.0, momentum);
    let v2_w = v1_w * momentum - grad_w * lr;
    let v2_b = v1_b * momentum - grad_b * lr;
    assert_relative_eq!(layer.weight(0, 0), w0 + v1_w + v2_w, epsilon = 1e-12);
    assert_relative_eq!(layer.biases()[0], b0 + v1_b + v2_b, epsilon = 1e-12);
}

#[test]
fn test_weight_decay_shrinks_weights_but_not_biases() {
    let (lr, regularization) = (0.1, 0.5);
    // Zero gradient: only the decay factor acts on the weight.
    let (mut layer, _) = layer_with_gradient(0.0, 0.0);
    let w0 = layer.weight(0, 0);
    let b0 = layer.biases()[0];

    layer.apply_gradients(lr, regularization, 0.9);

    assert_relative_eq!(
        layer.weight(0, 0),
        w0 * (1.0 - regularization * lr),
        epsilon = 1e-12
    );
    // Biases are exempt from L2 decay.
    assert_eq!(layer.biases()[0], b0);
}

#[test]
fn test_zero_momentum_zero_decay_is_plain_sgd() {
    let (x, nv, lr) = (1.5, -0.4, 0.25);
    let (mut layer, learn_data) = layer_with_gradient(x, nv);
    let w0 = layer.weight(0, 0);
    let b0 = layer.biases()[0];

    layer.update_gradients(&learn_data);
    layer.apply_gradients(lr, 0.0, 0.0);

    assert_relative_eq!(layer.weight(0, 0), w0 - lr * x * nv, epsilon = 1e-12);
    assert_relative_eq!(layer.biases()[0], b0 - lr * nv, epsilon = 1e-12);

    // Repeating without momentum must not compound: the velocity from the
    // previous step is discarded.
    let w1 = layer.weight(0, 0);
    layer.update_gradients(&learn_data);
    layer.apply_gradients(lr, 0.0, 0.0);
    assert_relative_eq!(layer.weight(0, 0), w1 - lr * x * nv, epsilon = 1e-12);
}
