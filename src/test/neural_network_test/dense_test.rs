use super::*;

#[test]
fn test_dense_forward_is_affine() {
    let mut dense = Dense::new(2, 3, &mut seeded_rng(0)).unwrap();
    dense.weights = array![[1.0, 0.0, -1.0], [2.0, 1.0, 0.5]];
    dense.bias = array![0.1, 0.2, 0.3];

    let y = dense.forward(array![1.0, 2.0].view()).unwrap();
    assert_abs_diff_eq!(y, array![5.1, 2.2, 0.3], epsilon = 1e-6);
}

#[test]
fn test_dense_backward_gradients() {
    let mut dense = Dense::new(2, 3, &mut seeded_rng(0)).unwrap();
    dense.weights = array![[1.0, 0.0, -1.0], [2.0, 1.0, 0.5]];

    let x = array![1.0, 2.0];
    let grad_out = array![1.0, -1.0, 2.0];
    let (grad_input, grads) = dense.backward(x.view(), grad_out.view()).unwrap();

    // W · grad_out
    assert_abs_diff_eq!(grad_input, array![-1.0, 2.0], epsilon = 1e-6);
    assert_abs_diff_eq!(
        grads.weights,
        array![[1.0, -1.0, 2.0], [2.0, -2.0, 4.0]],
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(grads.bias, grad_out, epsilon = 1e-6);
}

#[test]
fn test_dense_initialization_and_validation() {
    let dense = Dense::new(16, 8, &mut seeded_rng(4)).unwrap();
    assert_eq!(dense.weights().dim(), (16, 8));
    assert!(dense.bias().iter().all(|&b| b == 0.0));
    // standard normal scaled by 0.1
    assert!(dense.weights().iter().all(|w| w.abs() < 1.0));

    assert!(Dense::new(0, 8, &mut seeded_rng(4)).is_err());
    assert!(dense.forward(Array1::zeros(3).view()).is_err());
    assert!(
        dense
            .backward(Array1::zeros(16).view(), Array1::zeros(7).view())
            .is_err()
    );
}

#[test]
fn test_dense_gradients_accumulate() {
    let mut total = DenseGradients::zeros(2, 2);
    let step = DenseGradients {
        weights: array![[1.0, 2.0], [3.0, 4.0]],
        bias: array![0.5, -0.5],
    };
    total.accumulate(&step);
    total.accumulate(&step);
    assert_abs_diff_eq!(total.weights, array![[2.0, 4.0], [6.0, 8.0]]);
    assert_abs_diff_eq!(total.bias, array![1.0, -1.0]);
}
