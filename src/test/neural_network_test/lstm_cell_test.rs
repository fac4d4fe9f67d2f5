use super::*;

const EPS: f32 = 1e-2;

/// Weighted sum of the next state, so that `dL/dh_next = wh` and `dL/dc_next = wc`
fn weighted_output(
    cell: &mut LSTMCell,
    x: &Array1<f32>,
    state: &LSTMState,
    wh: &Array1<f32>,
    wc: &Array1<f32>,
) -> f32 {
    let next = cell.step(x.view(), state).unwrap();
    cell.reset_cache();
    (&next.h * wh).sum() + (&next.c * wc).sum()
}

struct Fixture {
    cell: LSTMCell,
    x: Array1<f32>,
    state: LSTMState,
    wh: Array1<f32>,
    wc: Array1<f32>,
}

fn fixture() -> Fixture {
    let mut rng = seeded_rng(3);
    let cell = LSTMCell::new(2, 3, &mut rng).unwrap();
    Fixture {
        cell,
        x: Array::random_using(2, StandardNormal, &mut rng),
        state: LSTMState {
            h: Array::random_using(3, StandardNormal, &mut rng) * 0.5,
            c: Array::random_using(3, StandardNormal, &mut rng) * 0.5,
        },
        wh: Array::random_using(3, StandardNormal, &mut rng),
        wc: Array::random_using(3, StandardNormal, &mut rng),
    }
}

fn analytic_gradients(f: &mut Fixture) -> LSTMStepGradients {
    f.cell.step(f.x.view(), &f.state).unwrap();
    let steps = f.cell.take_cache();
    f.cell
        .step_backward(f.wh.view(), f.wc.view(), &steps[0])
        .unwrap()
}

#[test]
fn test_lstm_cell_parameter_gradients_match_finite_differences() {
    let mut f = fixture();
    let grads = analytic_gradients(&mut f);

    let (rows, cols) = f.cell.kernel.dim();
    for r in 0..rows {
        for c in 0..cols {
            let mut plus = f.cell.clone();
            plus.kernel[[r, c]] += EPS;
            let mut minus = f.cell.clone();
            minus.kernel[[r, c]] -= EPS;
            let numeric = (weighted_output(&mut plus, &f.x, &f.state, &f.wh, &f.wc)
                - weighted_output(&mut minus, &f.x, &f.state, &f.wh, &f.wc))
                / (2.0 * EPS);
            assert_gradient_close(numeric, grads.params.kernel[[r, c]], "kernel");
        }
    }

    let (rows, cols) = f.cell.recurrent_kernel.dim();
    for r in 0..rows {
        for c in 0..cols {
            let mut plus = f.cell.clone();
            plus.recurrent_kernel[[r, c]] += EPS;
            let mut minus = f.cell.clone();
            minus.recurrent_kernel[[r, c]] -= EPS;
            let numeric = (weighted_output(&mut plus, &f.x, &f.state, &f.wh, &f.wc)
                - weighted_output(&mut minus, &f.x, &f.state, &f.wh, &f.wc))
                / (2.0 * EPS);
            assert_gradient_close(
                numeric,
                grads.params.recurrent_kernel[[r, c]],
                "recurrent_kernel",
            );
        }
    }

    for k in 0..f.cell.bias.len() {
        let mut plus = f.cell.clone();
        plus.bias[k] += EPS;
        let mut minus = f.cell.clone();
        minus.bias[k] -= EPS;
        let numeric = (weighted_output(&mut plus, &f.x, &f.state, &f.wh, &f.wc)
            - weighted_output(&mut minus, &f.x, &f.state, &f.wh, &f.wc))
            / (2.0 * EPS);
        assert_gradient_close(numeric, grads.params.bias[k], "bias");
    }
}

#[test]
fn test_lstm_cell_input_and_state_gradients_match_finite_differences() {
    let mut f = fixture();
    let grads = analytic_gradients(&mut f);
    let mut cell = f.cell.clone();

    for k in 0..f.x.len() {
        let mut x_plus = f.x.clone();
        x_plus[k] += EPS;
        let mut x_minus = f.x.clone();
        x_minus[k] -= EPS;
        let numeric = (weighted_output(&mut cell, &x_plus, &f.state, &f.wh, &f.wc)
            - weighted_output(&mut cell, &x_minus, &f.state, &f.wh, &f.wc))
            / (2.0 * EPS);
        assert_gradient_close(numeric, grads.dx[k], "dx");
    }

    for k in 0..f.state.units() {
        let mut plus = f.state.clone();
        plus.h[k] += EPS;
        let mut minus = f.state.clone();
        minus.h[k] -= EPS;
        let numeric = (weighted_output(&mut cell, &f.x, &plus, &f.wh, &f.wc)
            - weighted_output(&mut cell, &f.x, &minus, &f.wh, &f.wc))
            / (2.0 * EPS);
        assert_gradient_close(numeric, grads.dh_prev[k], "dh_prev");

        let mut plus = f.state.clone();
        plus.c[k] += EPS;
        let mut minus = f.state.clone();
        minus.c[k] -= EPS;
        let numeric = (weighted_output(&mut cell, &f.x, &plus, &f.wh, &f.wc)
            - weighted_output(&mut cell, &f.x, &minus, &f.wh, &f.wc))
            / (2.0 * EPS);
        assert_gradient_close(numeric, grads.dc_prev[k], "dc_prev");
    }
}

#[test]
fn test_lstm_cell_forward_equations() {
    let mut rng = seeded_rng(0);
    let mut cell = LSTMCell::new(1, 1, &mut rng).unwrap();
    // gates: forget, input, candidate, output
    cell.kernel = array![[0.0, 0.0, 0.0, 0.0]];
    cell.recurrent_kernel = array![[0.0, 0.0, 0.0, 0.0]];
    cell.bias = array![0.0, 0.0, 1.0, 0.0];

    let state = LSTMState {
        h: array![0.0],
        c: array![2.0],
    };
    let next = cell.step(array![1.0].view(), &state).unwrap();

    // f = i = o = 0.5, g = tanh(1)
    let expected_c = 0.5 * 2.0 + 0.5 * 1.0_f32.tanh();
    assert_abs_diff_eq!(next.c[0], expected_c, epsilon = 1e-6);
    assert_abs_diff_eq!(next.h[0], 0.5 * expected_c.tanh(), epsilon = 1e-6);

    let cache = &cell.cache()[0];
    assert_abs_diff_eq!(cache.forget_gate[0], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(cache.candidate[0], 1.0_f32.tanh(), epsilon = 1e-6);
}

#[test]
fn test_lstm_cell_initialization() {
    let mut rng = seeded_rng(11);
    let cell = LSTMCell::new(6, 4, &mut rng).unwrap();
    let limit = (6.0_f32 / 10.0).sqrt();

    assert_eq!(cell.kernel().dim(), (6, 16));
    assert_eq!(cell.recurrent_kernel().dim(), (4, 16));
    assert!(cell.kernel().iter().all(|w| w.abs() <= limit));
    assert!(cell.recurrent_kernel().iter().all(|w| w.abs() <= limit));
    assert!(cell.bias().iter().all(|&b| b == 0.0));

    assert!(LSTMCell::new(0, 4, &mut rng).is_err());
    assert!(LSTMCell::new(3, 0, &mut rng).is_err());
}

#[test]
fn test_lstm_cell_is_deterministic_for_a_seed() {
    let mut a = LSTMCell::new(3, 4, &mut seeded_rng(5)).unwrap();
    let mut b = LSTMCell::new(3, 4, &mut seeded_rng(5)).unwrap();
    let x = array![0.3, -1.2, 0.7];
    let state = LSTMState::zeros(4);

    assert_eq!(
        a.step(x.view(), &state).unwrap(),
        b.step(x.view(), &state).unwrap()
    );
}

#[test]
fn test_lstm_cell_cache_lifecycle() {
    let mut cell = LSTMCell::new(2, 2, &mut seeded_rng(1)).unwrap();
    let x = array![1.0, -1.0];

    let s1 = cell.step(x.view(), &LSTMState::zeros(2)).unwrap();
    cell.step(x.view(), &s1).unwrap();
    assert_eq!(cell.cache().len(), 2);
    assert_eq!(cell.cache()[1].h_prev, s1.h);

    let taken = cell.take_cache();
    assert_eq!(taken.len(), 2);
    assert!(cell.cache().is_empty());

    cell.step(x.view(), &LSTMState::zeros(2)).unwrap();
    cell.reset_cache();
    assert!(cell.cache().is_empty());
}

#[test]
fn test_lstm_cell_rejects_mismatched_sizes() {
    let mut cell = LSTMCell::new(2, 3, &mut seeded_rng(1)).unwrap();

    let result = cell.step(array![1.0, 2.0, 3.0].view(), &LSTMState::zeros(3));
    assert!(matches!(result, Err(ModelError::InputValidationError(_))));

    let result = cell.step(array![1.0, 2.0].view(), &LSTMState::zeros(2));
    assert!(matches!(result, Err(ModelError::InputValidationError(_))));
    assert!(cell.cache().is_empty());

    cell.step(array![1.0, 2.0].view(), &LSTMState::zeros(3))
        .unwrap();
    let steps = cell.take_cache();
    let result = cell.step_backward(Array1::zeros(2).view(), Array1::zeros(3).view(), &steps[0]);
    assert!(result.is_err());
}

#[test]
fn test_sigmoid_clipping_keeps_extreme_inputs_finite() {
    let mut cell = LSTMCell::new(1, 1, &mut seeded_rng(2)).unwrap();
    cell.kernel.fill(1.0e4);

    let next = cell
        .step(array![-1.0e3].view(), &LSTMState::zeros(1))
        .unwrap();
    assert!(next.h.iter().all(|v| v.is_finite()));
    assert!(next.c.iter().all(|v| v.is_finite()));
}

#[test]
fn test_sigmoid_clip_keeps_exp_finite() {
    use crate::math::{SIGMOID_CLIP, sigmoid};

    assert!(SIGMOID_CLIP.exp().is_finite());
    assert!((-SIGMOID_CLIP).exp().is_finite());
    // the bound sits past the point where f32 sigmoid saturates
    assert_eq!(sigmoid(SIGMOID_CLIP), 1.0);
    assert_eq!(sigmoid(1.0e6), 1.0);
    assert!(sigmoid(-1.0e6) >= 0.0 && sigmoid(-1.0e6) < 1e-30);
}
