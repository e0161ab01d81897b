// Tests for the backpropagation pass: hand-derived single-layer gradients
// and a numerical gradient check against central finite differences.

use approx::assert_relative_eq;
use feedforward::{DataPoint, LayerSnapshot, MeanSquaredError, Network, Sigmoid, SimpleRng};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn sigmoid_network(snapshots: &[LayerSnapshot]) -> Network {
    Network::import(
        snapshots,
        || Box::new(Sigmoid::new()),
        Box::new(MeanSquaredError::new()),
    )
    .unwrap()
}

#[test]
fn test_single_layer_gradient_by_hand() {
    // One 1x1 sigmoid layer trained on one sample with MSE. The analytic
    // update is fully derivable by hand:
    //   a = sigmoid(w*x + b)
    //   node value = (a - e) * a * (1 - a)
    //   delta w = -lr * x * node_value, delta b = -lr * node_value
    let (w, b, x, e, lr) = (0.8, -0.3, 0.6, 1.0, 0.25);
    let snapshots = vec![LayerSnapshot {
        weights: vec![vec![w]],
        biases: vec![b],
    }];
    let mut nn = sigmoid_network(&snapshots);

    let batch = vec![DataPoint {
        input: vec![x],
        expected_output: vec![e],
    }];
    // Momentum and regularization zeroed so only the raw gradient acts.
    nn.learn(&batch, lr, 0.0, 0.0);

    let a = sigmoid(w * x + b);
    let node_value = (a - e) * a * (1.0 - a);
    let exported = nn.export();
    assert_relative_eq!(exported[0].weights[0][0], w - lr * x * node_value, epsilon = 1e-12);
    assert_relative_eq!(exported[0].biases[0], b - lr * node_value, epsilon = 1e-12);
}

#[test]
fn test_gradients_match_finite_differences() {
    // Analytic gradients from one learn step (momentum 0, regularization 0,
    // batch of one) must match central finite differences of the cost with
    // respect to every weight and bias of a [2, 3, 2] network.
    let mut rng = SimpleRng::new(42);
    let reference = Network::new(
        &[2, 3, 2],
        || Box::new(Sigmoid::new()),
        Box::new(MeanSquaredError::new()),
        &mut rng,
    );
    let snapshots = reference.export();
    let sample = DataPoint {
        input: vec![0.35, -0.8],
        expected_output: vec![1.0, 0.0],
    };

    const LR: f64 = 1e-3;
    const EPS: f64 = 1e-5;

    let mut trained = sigmoid_network(&snapshots);
    let batch = [sample];
    trained.learn(&batch, LR, 0.0, 0.0);
    let after = trained.export();

    for layer in 0..snapshots.len() {
        let (num_in, num_out) = snapshots[layer].dims();
        for node_in in 0..num_in {
            for node_out in 0..num_out {
                let analytic =
                    (snapshots[layer].weights[node_in][node_out] - after[layer].weights[node_in][node_out]) / LR;

                let mut plus = snapshots.to_vec();
                plus[layer].weights[node_in][node_out] += EPS;
                let mut minus = snapshots.to_vec();
                minus[layer].weights[node_in][node_out] -= EPS;
                let cost_plus = sigmoid_network(&plus).evaluate_cost(&batch);
                let cost_minus = sigmoid_network(&minus).evaluate_cost(&batch);
                let numeric = (cost_plus - cost_minus) / (2.0 * EPS);

                assert_relative_eq!(analytic, numeric, max_relative = 1e-4, epsilon = 1e-8);
            }
        }
        for node_out in 0..num_out {
            let analytic = (snapshots[layer].biases[node_out] - after[layer].biases[node_out]) / LR;

            let mut plus = snapshots.to_vec();
            plus[layer].biases[node_out] += EPS;
            let mut minus = snapshots.to_vec();
            minus[layer].biases[node_out] -= EPS;
            let cost_plus = sigmoid_network(&plus).evaluate_cost(&batch);
            let cost_minus = sigmoid_network(&minus).evaluate_cost(&batch);
            let numeric = (cost_plus - cost_minus) / (2.0 * EPS);

            assert_relative_eq!(analytic, numeric, max_relative = 1e-4, epsilon = 1e-8);
        }
    }
}

#[test]
fn test_batch_gradients_are_averaged() {
    // Learning from a batch of two identical samples must produce exactly
    // the same update as learning from that sample alone: the 1/batch_len
    // scaling averages the summed contributions.
    let mut rng = SimpleRng::new(7);
    let reference = Network::new(
        &[2, 4, 2],
        || Box::new(Sigmoid::new()),
        Box::new(MeanSquaredError::new()),
        &mut rng,
    );
    let snapshots = reference.export();
    let sample = DataPoint {
        input: vec![0.2, 0.9],
        expected_output: vec![0.0, 1.0],
    };

    let mut single = sigmoid_network(&snapshots);
    single.learn(&[sample.clone()], 0.1, 0.0, 0.0);

    let mut doubled = sigmoid_network(&snapshots);
    doubled.learn(&[sample.clone(), sample], 0.1, 0.0, 0.0);

    let exported_single = single.export();
    let exported_doubled = doubled.export();
    for (a, b) in exported_single.iter().zip(exported_doubled.iter()) {
        for (row_a, row_b) in a.weights.iter().zip(b.weights.iter()) {
            for (wa, wb) in row_a.iter().zip(row_b.iter()) {
                assert_relative_eq!(*wa, *wb, epsilon = 1e-12);
            }
        }
        for (ba, bb) in a.biases.iter().zip(b.biases.iter()) {
            assert_relative_eq!(*ba, *bb, epsilon = 1e-12);
        }
    }
}
