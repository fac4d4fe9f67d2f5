use super::*;

#[test]
fn test_sgd_clips_each_element_then_updates() {
    let mut value = array![[1.0_f32, 1.0], [1.0, 1.0]].into_dyn();
    let mut grad = array![[12.0_f32, -0.25], [-5.5, 5.0]].into_dyn();

    let mut sgd = SGD::new(0.5).unwrap();
    sgd.step(vec![ParamGrad {
        name: "w",
        value: value.view_mut(),
        grad: grad.view_mut(),
    }])
    .unwrap();

    let expected_grad = array![[5.0_f32, -0.25], [-5.0, 5.0]].into_dyn();
    assert_abs_diff_eq!(grad, expected_grad, epsilon = 1e-7);
    let expected_value = array![[-1.5_f32, 1.125], [3.5, -1.5]].into_dyn();
    assert_abs_diff_eq!(value, expected_value, epsilon = 1e-6);
}

#[test]
fn test_sgd_clipping_is_per_tensor_not_global_norm() {
    let mut a = array![100.0_f32].into_dyn();
    let mut grad_a = array![100.0_f32].into_dyn();
    let mut b = array![0.0_f32].into_dyn();
    let mut grad_b = array![1.0_f32].into_dyn();

    let mut sgd = SGD::with_clip_value(1.0, 5.0).unwrap();
    sgd.step(vec![
        ParamGrad {
            name: "a",
            value: a.view_mut(),
            grad: grad_a.view_mut(),
        },
        ParamGrad {
            name: "b",
            value: b.view_mut(),
            grad: grad_b.view_mut(),
        },
    ])
    .unwrap();

    // a global-norm rescale would have shrunk b's gradient as well
    assert_abs_diff_eq!(b.as_slice().unwrap()[0], -1.0);
    assert_abs_diff_eq!(a.as_slice().unwrap()[0], 95.0);
}

#[test]
fn test_sgd_rejects_shape_mismatch_before_updating() {
    let mut first = array![1.0_f32, 1.0].into_dyn();
    let mut first_grad = array![1.0_f32, 1.0].into_dyn();
    let mut second = array![1.0_f32, 1.0].into_dyn();
    let mut second_grad = array![1.0_f32, 1.0, 1.0].into_dyn();

    let mut sgd = SGD::new(0.1).unwrap();
    let result = sgd.step(vec![
        ParamGrad {
            name: "first",
            value: first.view_mut(),
            grad: first_grad.view_mut(),
        },
        ParamGrad {
            name: "second",
            value: second.view_mut(),
            grad: second_grad.view_mut(),
        },
    ]);

    assert!(matches!(result, Err(ModelError::InputValidationError(_))));
    assert_eq!(first, array![1.0_f32, 1.0].into_dyn());
}

#[test]
fn test_sgd_hyperparameter_validation() {
    assert!(SGD::new(0.01).is_ok());
    assert!(SGD::new(0.0).is_err());
    assert!(SGD::new(-0.1).is_err());
    assert!(SGD::new(f32::NAN).is_err());
    assert!(SGD::with_clip_value(0.01, 0.0).is_err());
    assert!(SGD::with_clip_value(0.01, f32::INFINITY).is_err());

    let sgd = SGD::new(0.01).unwrap();
    assert_eq!(sgd.clip_value(), DEFAULT_CLIP_VALUE);
    assert_eq!(sgd.learning_rate(), 0.01);
}
