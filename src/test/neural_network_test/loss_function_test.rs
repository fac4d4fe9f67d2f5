use super::*;

#[test]
fn test_sparse_categorical_cross_entropy_uniform_logits() {
    let loss_fn = SparseCategoricalCrossEntropy::new();
    let (loss, grad) = loss_fn
        .loss_and_grad(Array1::zeros(4).view(), 2)
        .unwrap();

    assert_abs_diff_eq!(loss, 4.0_f32.ln(), epsilon = 1e-5);
    assert_abs_diff_eq!(grad, array![0.25, 0.25, -0.75, 0.25], epsilon = 1e-6);
    assert_abs_diff_eq!(grad.sum(), 0.0, epsilon = 1e-6);
}

#[test]
fn test_sparse_categorical_cross_entropy_large_logits_are_stable() {
    let loss_fn = SparseCategoricalCrossEntropy::new();
    let (loss, grad) = loss_fn
        .loss_and_grad(array![1000.0, 0.0, -1000.0].view(), 0)
        .unwrap();

    assert!(loss.is_finite());
    assert_abs_diff_eq!(loss, 0.0, epsilon = 1e-5);
    assert!(grad.iter().all(|g| g.is_finite()));

    // probability underflows to zero, the epsilon keeps the log finite
    let (loss, _) = loss_fn
        .loss_and_grad(array![1000.0, 0.0, -1000.0].view(), 2)
        .unwrap();
    assert_abs_diff_eq!(loss, -(1e-9_f32).ln(), epsilon = 1e-3);
}

#[test]
fn test_sparse_categorical_cross_entropy_rejects_bad_target() {
    let loss_fn = SparseCategoricalCrossEntropy::new();
    assert!(matches!(
        loss_fn.loss_and_grad(Array1::zeros(3).view(), 3),
        Err(ModelError::InputValidationError(_))
    ));
}
