use super::*;

#[test]
fn test_decoder_forward_shapes_and_trajectory() {
    let mut decoder = Decoder::new(7, 3, 4, &mut seeded_rng(2)).unwrap();
    let (logits, state) = decoder.forward(SOS_INDEX, &LSTMState::zeros(4)).unwrap();
    assert_eq!(logits.len(), 7);
    assert_eq!(state.units(), 4);

    decoder.forward(5, &state).unwrap();
    assert_eq!(decoder.pending_steps(), 2);
    // each step's cell cache moves onto the trajectory
    assert!(decoder.cell().cache().is_empty());

    decoder.reset();
    assert_eq!(decoder.pending_steps(), 0);
}

#[test]
fn test_decoder_backward_consumes_steps_in_reverse_order() {
    let mut decoder = Decoder::new(7, 3, 4, &mut seeded_rng(2)).unwrap();
    let start = LSTMState {
        h: array![0.1, -0.2, 0.3, 0.0],
        c: array![0.5, 0.0, -0.5, 0.2],
    };
    let (_, s1) = decoder.forward(SOS_INDEX, &start).unwrap();
    let (_, _) = decoder.forward(5, &s1).unwrap();

    let d_logits = Array1::from_elem(7, 0.1);
    let zero = LSTMState::zeros(4);

    // the first backward call must replay the second forward step
    let (second, _) = decoder.backward(d_logits.view(), &zero).unwrap();
    assert_eq!(second.token, 5);
    let (first, _) = decoder.backward(d_logits.view(), &zero).unwrap();
    assert_eq!(first.token, SOS_INDEX);

    let mut reference = decoder.clone();
    reference.reset();
    let (_, expected_s1) = reference.forward(SOS_INDEX, &start).unwrap();
    assert_eq!(expected_s1, s1);
    let (expected_second, _) = {
        reference.forward(5, &s1).unwrap();
        reference.backward(d_logits.view(), &zero).unwrap()
    };
    assert_abs_diff_eq!(second.cell.kernel, expected_second.cell.kernel, epsilon = 1e-7);
    assert_abs_diff_eq!(second.embedding_row, expected_second.embedding_row, epsilon = 1e-7);
}

#[test]
fn test_decoder_backward_without_forward_is_an_error() {
    let mut decoder = Decoder::new(7, 3, 4, &mut seeded_rng(2)).unwrap();
    let d_logits = Array1::zeros(7);
    let zero = LSTMState::zeros(4);

    assert!(matches!(
        decoder.backward(d_logits.view(), &zero),
        Err(ModelError::ProcessingError(_))
    ));

    decoder.forward(SOS_INDEX, &zero).unwrap();
    assert!(decoder.backward(d_logits.view(), &zero).is_ok());
    // more backward calls than forward steps
    assert!(matches!(
        decoder.backward(d_logits.view(), &zero),
        Err(ModelError::ProcessingError(_))
    ));
}

#[test]
fn test_decoder_backward_validates_sizes() {
    let mut decoder = Decoder::new(7, 3, 4, &mut seeded_rng(2)).unwrap();
    decoder.forward(SOS_INDEX, &LSTMState::zeros(4)).unwrap();

    assert!(matches!(
        decoder.backward(Array1::zeros(6).view(), &LSTMState::zeros(4)),
        Err(ModelError::InputValidationError(_))
    ));
    assert!(matches!(
        decoder.backward(Array1::zeros(7).view(), &LSTMState::zeros(3)),
        Err(ModelError::InputValidationError(_))
    ));
    // a rejected call does not consume the step
    assert_eq!(decoder.pending_steps(), 1);
}

#[test]
fn test_decoder_projection_gradient_is_outer_product() {
    let mut decoder = Decoder::new(7, 3, 4, &mut seeded_rng(2)).unwrap();
    let (_, state) = decoder.forward(EOS_INDEX, &LSTMState::zeros(4)).unwrap();

    let d_logits = Array1::from_shape_fn(7, |i| i as f32 - 3.0);
    let (grads, _) = decoder
        .backward(d_logits.view(), &LSTMState::zeros(4))
        .unwrap();

    for r in 0..4 {
        for c in 0..7 {
            assert_abs_diff_eq!(
                grads.dense.weights[[r, c]],
                state.h[r] * d_logits[c],
                epsilon = 1e-6
            );
        }
    }
    assert_abs_diff_eq!(grads.dense.bias, d_logits, epsilon = 1e-7);
}
