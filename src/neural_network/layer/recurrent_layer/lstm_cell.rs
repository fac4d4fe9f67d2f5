use super::*;

/// Threshold on `units` above which gate activations and gate derivatives are
/// evaluated with `rayon::join`.
///
/// Below this size rayon's scheduling overhead outweighs the element work of a
/// single time step.
const LSTM_PARALLEL_THRESHOLD: usize = 1024;

/// Hidden/cell state pair threaded from one time step to the next.
///
/// `h` is the exposed recurrent output, `c` the internal memory. Every encode starts
/// from [`LSTMState::zeros`]. The same type carries the pair of state gradients
/// `(dh, dc)` during the backward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LSTMState {
    pub h: Array1<f32>,
    pub c: Array1<f32>,
}

impl LSTMState {
    /// Zero state (or zero state gradient) for a cell with `units` units.
    pub fn zeros(units: usize) -> Self {
        Self {
            h: Array1::zeros(units),
            c: Array1::zeros(units),
        }
    }

    pub fn units(&self) -> usize {
        self.h.len()
    }
}

/// Everything one forward step saw, kept so its backward step is exact.
///
/// All gate vectors are post-activation values.
#[derive(Debug, Clone)]
pub struct LSTMStepCache {
    pub x: Array1<f32>,
    pub h_prev: Array1<f32>,
    pub c_prev: Array1<f32>,
    pub forget_gate: Array1<f32>,
    pub input_gate: Array1<f32>,
    pub candidate: Array1<f32>,
    pub output_gate: Array1<f32>,
    pub c_next: Array1<f32>,
}

/// Gradients of the three parameter tensors of an [`LSTMCell`]
///
/// # Fields
///
/// - `kernel` - Gradient of the input-to-gates matrix, shape (input_dim, 4 * units)
/// - `recurrent_kernel` - Gradient of the hidden-to-gates matrix, shape (units, 4 * units)
/// - `bias` - Gradient of the gate bias, shape (4 * units)
#[derive(Debug, Clone, PartialEq)]
pub struct LSTMCellGradients {
    pub kernel: Array2<f32>,
    pub recurrent_kernel: Array2<f32>,
    pub bias: Array1<f32>,
}

impl LSTMCellGradients {
    pub fn zeros(input_dim: usize, units: usize) -> Self {
        Self {
            kernel: Array2::zeros((input_dim, 4 * units)),
            recurrent_kernel: Array2::zeros((units, 4 * units)),
            bias: Array1::zeros(4 * units),
        }
    }

    /// Adds `other` into `self` element-wise.
    pub fn accumulate(&mut self, other: &LSTMCellGradients) {
        self.kernel += &other.kernel;
        self.recurrent_kernel += &other.recurrent_kernel;
        self.bias += &other.bias;
    }
}

/// Result of [`LSTMCell::step_backward`] for one time step
///
/// # Fields
///
/// - `dx` - Gradient with respect to the step input
/// - `params` - Gradients of the cell parameters contributed by this step
/// - `dh_prev` - Gradient with respect to the previous hidden state
/// - `dc_prev` - Gradient with respect to the previous cell state
#[derive(Debug, Clone)]
pub struct LSTMStepGradients {
    pub dx: Array1<f32>,
    pub params: LSTMCellGradients,
    pub dh_prev: Array1<f32>,
    pub dc_prev: Array1<f32>,
}

/// Long Short-Term Memory cell with hand-written forward and backward passes.
///
/// The four gates share one input-to-gates matrix and one hidden-to-gates matrix; their
/// pre-activations are computed in a single product of width `4 * units` and split in
/// the fixed order forget, input, candidate, output.
///
/// # Mathematical Operations
///
/// For each step:
/// 1. z = x · W_xh + h_prev · W_hh + b, split into \[z_f, z_i, z_g, z_o\]
/// 2. f = σ(z_f), i = σ(z_i), g = tanh(z_g), o = σ(z_o)
/// 3. c_next = f ⊙ c_prev + i ⊙ g
/// 4. h_next = o ⊙ tanh(c_next)
///
/// Every call to [`LSTMCell::step`] appends an [`LSTMStepCache`] to the running cache.
/// [`LSTMCell::step_backward`] is pure: the caller chooses which cache entry to replay,
/// normally after moving the whole trajectory out with [`LSTMCell::take_cache`].
///
/// # Example
/// ```rust
/// use ndarray::Array1;
/// use ndarray_rand::rand::SeedableRng;
/// use ndarray_rand::rand::rngs::StdRng;
/// use rustynmt::neural_network::{LSTMCell, LSTMState};
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut cell = LSTMCell::new(3, 2, &mut rng).unwrap();
///
/// let state = cell.step(Array1::ones(3).view(), &LSTMState::zeros(2)).unwrap();
/// assert_eq!(state.h.len(), 2);
///
/// let steps = cell.take_cache();
/// let grads = cell
///     .step_backward(Array1::ones(2).view(), Array1::zeros(2).view(), &steps[0])
///     .unwrap();
/// assert_eq!(grads.params.kernel.dim(), (3, 8));
/// ```
#[derive(Debug, Clone)]
pub struct LSTMCell {
    input_dim: usize,
    units: usize,
    /// Input-to-gates weights with shape (input_dim, 4 * units)
    pub(crate) kernel: Array2<f32>,
    /// Hidden-to-gates weights with shape (units, 4 * units)
    pub(crate) recurrent_kernel: Array2<f32>,
    /// Gate bias with shape (4 * units)
    pub(crate) bias: Array1<f32>,
    cache: Vec<LSTMStepCache>,
}

impl LSTMCell {
    /// Creates a cell with Xavier/Glorot-uniform weights and zero bias.
    ///
    /// Both weight matrices are drawn from `U(-limit, limit)` with
    /// `limit = sqrt(6 / (input_dim + units))`.
    ///
    /// # Parameters
    ///
    /// - `input_dim` - Dimensionality of the step input
    /// - `units` - Hidden dimension `H`
    /// - `rng` - Random source for weight initialization
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `input_dim` or `units` is 0
    pub fn new<R: Rng + ?Sized>(
        input_dim: usize,
        units: usize,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        validate_recurrent_dimensions(input_dim, units)?;

        let limit = (6.0 / (input_dim + units) as f32).sqrt();
        let kernel = Array::random_using((input_dim, 4 * units), Uniform::new(-limit, limit), rng);
        let recurrent_kernel =
            Array::random_using((units, 4 * units), Uniform::new(-limit, limit), rng);
        let bias = Array1::zeros(4 * units);

        Ok(Self {
            input_dim,
            units,
            kernel,
            recurrent_kernel,
            bias,
            cache: Vec::new(),
        })
    }

    /// Runs one time step and records its cache entry.
    ///
    /// # Parameters
    ///
    /// - `x` - Step input with `input_dim` elements
    /// - `state` - Previous state pair
    ///
    /// # Returns
    ///
    /// - `Ok(LSTMState)` - The next state pair
    /// - `Err(ModelError::InputValidationError)` - If `x` or `state` has the wrong size
    pub fn step(&mut self, x: ArrayView1<f32>, state: &LSTMState) -> Result<LSTMState, ModelError> {
        validate_vector_len(x.len(), self.input_dim, "step input")?;
        validate_state_len(state.h.len(), state.c.len(), self.units)?;

        let z = x.dot(&self.kernel) + state.h.dot(&self.recurrent_kernel) + &self.bias;

        let h = self.units;
        let z_f = z.slice(s![0..h]);
        let z_i = z.slice(s![h..2 * h]);
        let z_g = z.slice(s![2 * h..3 * h]);
        let z_o = z.slice(s![3 * h..4 * h]);

        let (forget_gate, input_gate, candidate, output_gate) =
            if self.units >= LSTM_PARALLEL_THRESHOLD {
                let ((f, i), (g, o)) = rayon::join(
                    || rayon::join(|| sigmoid_vec(&z_f), || sigmoid_vec(&z_i)),
                    || rayon::join(|| tanh_vec(&z_g), || sigmoid_vec(&z_o)),
                );
                (f, i, g, o)
            } else {
                (
                    sigmoid_vec(&z_f),
                    sigmoid_vec(&z_i),
                    tanh_vec(&z_g),
                    sigmoid_vec(&z_o),
                )
            };

        let c_next = &forget_gate * &state.c + &input_gate * &candidate;
        let h_next = &output_gate * &tanh_vec(&c_next);

        self.cache.push(LSTMStepCache {
            x: x.to_owned(),
            h_prev: state.h.clone(),
            c_prev: state.c.clone(),
            forget_gate,
            input_gate,
            candidate,
            output_gate,
            c_next: c_next.clone(),
        });

        Ok(LSTMState {
            h: h_next,
            c: c_next,
        })
    }

    /// Backward pass for one cached step.
    ///
    /// Never reads or modifies the running cache; `cache` selects the step to replay.
    ///
    /// # Parameters
    ///
    /// - `dh_next` - Gradient of the loss with respect to this step's `h_next`
    /// - `dc_next` - Gradient of the loss with respect to this step's `c_next` arriving from the later step
    /// - `cache` - The entry recorded by the matching forward step
    ///
    /// # Returns
    ///
    /// - `Ok(LSTMStepGradients)` - Input, parameter and previous-state gradients
    /// - `Err(ModelError::InputValidationError)` - If a gradient or the cache entry has the wrong size
    pub fn step_backward(
        &self,
        dh_next: ArrayView1<f32>,
        dc_next: ArrayView1<f32>,
        cache: &LSTMStepCache,
    ) -> Result<LSTMStepGradients, ModelError> {
        validate_state_len(dh_next.len(), dc_next.len(), self.units)?;
        validate_vector_len(cache.x.len(), self.input_dim, "cached step input")?;
        validate_state_len(cache.h_prev.len(), cache.c_next.len(), self.units)?;

        let LSTMStepCache {
            x,
            h_prev,
            c_prev,
            forget_gate: f,
            input_gate: i,
            candidate: g,
            output_gate: o,
            c_next,
        } = cache;

        let tanh_c = tanh_vec(c_next);

        let d_o = &dh_next * &tanh_c;
        let d_c = &dh_next * o * &tanh_c.mapv(|t| 1.0 - t * t) + &dc_next;

        let d_f = &d_c * c_prev;
        let d_i = &d_c * g;
        let d_g = &d_c * i;
        let dc_prev = &d_c * f;

        let sigmoid_grad = |d: &Array1<f32>, a: &Array1<f32>| d * &a.mapv(|v| v * (1.0 - v));
        let tanh_grad = |d: &Array1<f32>, a: &Array1<f32>| d * &a.mapv(|v| 1.0 - v * v);

        let (dz_f, dz_i, dz_g, dz_o) = if self.units >= LSTM_PARALLEL_THRESHOLD {
            let ((dz_f, dz_i), (dz_g, dz_o)) = rayon::join(
                || rayon::join(|| sigmoid_grad(&d_f, f), || sigmoid_grad(&d_i, i)),
                || rayon::join(|| tanh_grad(&d_g, g), || sigmoid_grad(&d_o, o)),
            );
            (dz_f, dz_i, dz_g, dz_o)
        } else {
            (
                sigmoid_grad(&d_f, f),
                sigmoid_grad(&d_i, i),
                tanh_grad(&d_g, g),
                sigmoid_grad(&d_o, o),
            )
        };

        // same gate order as the forward split
        let h = self.units;
        let mut dz = Array1::<f32>::zeros(4 * h);
        dz.slice_mut(s![0..h]).assign(&dz_f);
        dz.slice_mut(s![h..2 * h]).assign(&dz_i);
        dz.slice_mut(s![2 * h..3 * h]).assign(&dz_g);
        dz.slice_mut(s![3 * h..4 * h]).assign(&dz_o);

        let grad_kernel = outer(x, &dz);
        let grad_recurrent_kernel = outer(h_prev, &dz);
        let dx = self.kernel.dot(&dz);
        let dh_prev = self.recurrent_kernel.dot(&dz);

        Ok(LSTMStepGradients {
            dx,
            params: LSTMCellGradients {
                kernel: grad_kernel,
                recurrent_kernel: grad_recurrent_kernel,
                bias: dz,
            },
            dh_prev,
            dc_prev,
        })
    }

    /// Drops every recorded step. Called at the start of each sequence.
    pub fn reset_cache(&mut self) {
        self.cache.clear();
    }

    /// Moves the recorded trajectory out, leaving the running cache empty.
    pub fn take_cache(&mut self) -> Vec<LSTMStepCache> {
        std::mem::take(&mut self.cache)
    }

    /// Steps recorded since the last reset, oldest first.
    pub fn cache(&self) -> &[LSTMStepCache] {
        &self.cache
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn units(&self) -> usize {
        self.units
    }

    /// Input-to-gates weights with shape (input_dim, 4 * units)
    pub fn kernel(&self) -> &Array2<f32> {
        &self.kernel
    }

    /// Hidden-to-gates weights with shape (units, 4 * units)
    pub fn recurrent_kernel(&self) -> &Array2<f32> {
        &self.recurrent_kernel
    }

    /// Gate bias with shape (4 * units)
    pub fn bias(&self) -> &Array1<f32> {
        &self.bias
    }
}
