use super::*;
use ndarray_rand::rand::Rng;

const EPS: f32 = 1e-2;
const INPUT: [usize; 3] = [4, 5, 4];
const TARGET: [usize; 3] = [6, 6, EOS_INDEX];

/// Loss summed over target positions, the quantity `compute_gradients` differentiates
fn summed_loss(model: &mut Seq2Seq) -> f32 {
    compute_loss(model, &INPUT, &TARGET).unwrap() * TARGET.len() as f32
}

fn shifted_loss(model: &Seq2Seq, direction: &Seq2SeqGradients, scale: f32) -> f32 {
    let mut shifted = model.clone();
    for ((_, mut p), (_, d)) in shifted
        .parameters_mut()
        .into_iter()
        .zip(direction.tensors())
    {
        p.scaled_add(scale, &d);
    }
    summed_loss(&mut shifted)
}

fn coordinate_loss(model: &Seq2Seq, tensor: usize, index: usize, delta: f32) -> f32 {
    let mut shifted = model.clone();
    {
        let mut params = shifted.parameters_mut();
        let (_, p) = &mut params[tensor];
        p.as_slice_mut().unwrap()[index] += delta;
    }
    summed_loss(&mut shifted)
}

fn normalized(mut direction: Seq2SeqGradients) -> Seq2SeqGradients {
    let norm = direction.dot(&direction).unwrap().sqrt();
    for (_, mut t) in direction.tensors_mut() {
        t.mapv_inplace(|v| v / norm);
    }
    direction
}

#[test]
fn test_full_gradient_matches_directional_derivative() {
    let model = small_model(21);
    let (loss, grads) = compute_gradients(&mut model.clone(), &INPUT, &TARGET).unwrap();
    assert_abs_diff_eq!(
        loss,
        compute_loss(&mut model.clone(), &INPUT, &TARGET).unwrap(),
        epsilon = 1e-6
    );

    // along the gradient itself the slope is the gradient norm
    let direction = normalized(grads.clone());
    let analytic = grads.dot(&direction).unwrap();
    let numeric =
        (shifted_loss(&model, &direction, EPS) - shifted_loss(&model, &direction, -EPS)) / (2.0 * EPS);
    assert_gradient_close(numeric, analytic, "gradient direction");

    // and along a random direction
    let mut rng = seeded_rng(100);
    let mut random = model.zero_gradients();
    for (_, mut t) in random.tensors_mut() {
        t.mapv_inplace(|_| rng.sample::<f32, _>(StandardNormal));
    }
    let direction = normalized(random);
    let analytic = grads.dot(&direction).unwrap();
    let numeric =
        (shifted_loss(&model, &direction, EPS) - shifted_loss(&model, &direction, -EPS)) / (2.0 * EPS);
    assert_gradient_close(numeric, analytic, "random direction");
}

#[test]
fn test_full_gradient_matches_finite_differences_per_tensor() {
    let model = small_model(8);
    let (_, grads) = compute_gradients(&mut model.clone(), &INPUT, &TARGET).unwrap();
    let analytic = grads.tensors();

    for (tensor, (name, values)) in analytic.iter().enumerate() {
        let values = values.as_slice().unwrap();
        for index in (0..values.len()).step_by(7) {
            let numeric = (coordinate_loss(&model, tensor, index, EPS)
                - coordinate_loss(&model, tensor, index, -EPS))
                / (2.0 * EPS);
            assert_gradient_close(numeric, values[index], name);
        }
    }
}

#[test]
fn test_projection_bias_gradient_sums_over_positions() {
    let mut model = small_model(12);
    let logits = model.teacher_forced_logits(&INPUT, &TARGET).unwrap();
    let (_, grads) = compute_gradients(&mut model, &INPUT, &TARGET).unwrap();

    // d/db of the summed loss is the sum of (softmax - onehot) over positions
    let mut expected = Array1::<f32>::zeros(model.config().output_vocab_size);
    for (step_logits, &token) in logits.iter().zip(TARGET.iter()) {
        expected += &crate::math::softmax(step_logits);
        expected[token] -= 1.0;
    }
    assert_abs_diff_eq!(grads.decoder.dense.bias, expected, epsilon = 1e-5);
}

#[test]
fn test_repeated_decoder_input_token_gradient() {
    // token 6 is the decoder input at steps 2 and 3, so its embedding row collects both
    let model = small_model(33);
    let (_, grads) = compute_gradients(&mut model.clone(), &INPUT, &TARGET).unwrap();
    let embed = model.config().embed_size;

    for k in 0..embed {
        let index = 6 * embed + k;
        let numeric =
            (coordinate_loss(&model, 4, index, EPS) - coordinate_loss(&model, 4, index, -EPS))
                / (2.0 * EPS);
        assert_gradient_close(numeric, grads.decoder.embedding[[6, k]], "dec_emb_w row 6");
    }
    // the final target token is never fed back
    assert!(grads.decoder.embedding.row(EOS_INDEX).iter().all(|&v| v == 0.0));
}

#[test]
fn test_compute_gradients_leaves_parameters_and_caches_untouched() {
    let mut model = small_model(4);
    let before = model.clone();

    compute_gradients(&mut model, &INPUT, &TARGET).unwrap();

    for ((_, a), (_, b)) in model.parameters().iter().zip(before.parameters().iter()) {
        assert_eq!(a, b);
    }
    assert_eq!(model.decoder().pending_steps(), 0);
    assert!(model.encoder().cell().cache().is_empty());
}

#[test]
fn test_compute_gradients_rejects_invalid_targets() {
    let mut model = small_model(4);

    assert!(matches!(
        compute_gradients(&mut model, &INPUT, &[]),
        Err(ModelError::InputValidationError(_))
    ));

    // 10 is outside the target vocabulary
    assert!(matches!(
        compute_gradients(&mut model, &INPUT, &[6, 10]),
        Err(ModelError::InputValidationError(_))
    ));
    assert_eq!(model.decoder().pending_steps(), 0);

    assert!(compute_gradients(&mut model, &INPUT, &TARGET).is_ok());
}

#[test]
fn test_train_iteration_applies_one_update() {
    let mut model = small_model(4);
    let before = model.clone();
    let mut sgd = SGD::new(0.5).unwrap();

    let expected_loss = compute_loss(&mut model.clone(), &INPUT, &TARGET).unwrap();
    let loss = train_iteration(&mut model, &mut sgd, &INPUT, &TARGET).unwrap();
    assert_abs_diff_eq!(loss, expected_loss, epsilon = 1e-6);

    let (_, mut grads) = compute_gradients(&mut before.clone(), &INPUT, &TARGET).unwrap();
    for (_, mut g) in grads.tensors_mut() {
        g.mapv_inplace(|v| v.clamp(-DEFAULT_CLIP_VALUE, DEFAULT_CLIP_VALUE));
    }
    for (((_, after), (_, start)), (_, g)) in model
        .parameters()
        .iter()
        .zip(before.parameters().iter())
        .zip(grads.tensors().iter())
    {
        let expected = start - &(g * 0.5);
        assert_abs_diff_eq!(after.to_owned(), expected, epsilon = 1e-6);
    }
}

#[test]
fn test_params_and_grads_follow_parameter_names() {
    let mut model = small_model(4);
    let mut grads = model.zero_gradients();
    let pairs = model.params_and_grads(&mut grads);

    assert_eq!(pairs.len(), PARAMETER_NAMES.len());
    for (pair, name) in pairs.iter().zip(PARAMETER_NAMES) {
        assert_eq!(pair.name, name);
        assert_eq!(pair.value.shape(), pair.grad.shape());
    }
    assert_eq!(pairs[0].value.shape(), &[9, 4]);
    assert_eq!(pairs[5].value.shape(), &[4, 20]);
    assert_eq!(pairs[8].value.shape(), &[5, 10]);
}

#[test]
fn test_seeded_models_are_identical() {
    let a = small_model(42);
    let b = small_model(42);
    let c = small_model(43);

    for ((_, x), (_, y)) in a.parameters().iter().zip(b.parameters().iter()) {
        assert_eq!(x, y);
    }
    assert_ne!(a.parameters()[0].1, c.parameters()[0].1);

    let mut a = a;
    let mut b = b;
    assert_eq!(
        a.teacher_forced_logits(&INPUT, &TARGET).unwrap(),
        b.teacher_forced_logits(&INPUT, &TARGET).unwrap()
    );
}

#[test]
fn test_translate_stops_at_end_token() {
    let mut model = small_model(5);
    model.decoder.dense.bias[EOS_INDEX] = 1.0e3;
    assert!(model.translate(&INPUT, 10).unwrap().is_empty());

    let mut model = small_model(5);
    model.decoder.dense.bias[7] = 1.0e3;
    assert_eq!(model.translate(&INPUT, 3).unwrap(), vec![7, 7, 7]);
    assert_eq!(model.decoder().pending_steps(), 0);

    assert!(model.translate(&[9], 3).is_err());
}

#[test]
fn test_seq2seq_config_validation() {
    let config = Seq2SeqConfig {
        input_vocab_size: 9,
        output_vocab_size: 10,
        embed_size: 0,
        hidden_size: 5,
    };
    assert!(Seq2Seq::new(config, Some(1)).is_err());

    let config = Seq2SeqConfig {
        output_vocab_size: 2,
        embed_size: 4,
        ..config
    };
    assert!(Seq2Seq::new(config, Some(1)).is_err());
    assert!(Seq2Seq::new(Seq2SeqConfig { output_vocab_size: 3, ..config }, None).is_ok());
}
