use super::*;

/// Dense (fully connected) projection used by the decoder to map a hidden state to vocabulary logits.
///
/// Performs the affine transformation `output = input · weights + bias` on a single
/// vector. The layer keeps no per-call cache: the caller hands the forward input back
/// to [`Dense::backward`], which lets the decoder keep one record per time step.
///
/// Weights start from a standard normal scaled by 0.1, bias starts at zero.
///
/// # Dimensions
///
/// - Input shape: (input_dim)
/// - Output shape: (output_dim)
///
/// # Example
/// ```rust
/// use ndarray::Array1;
/// use ndarray_rand::rand::SeedableRng;
/// use ndarray_rand::rand::rngs::StdRng;
/// use rustynmt::neural_network::Dense;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let dense = Dense::new(4, 3, &mut rng).unwrap();
/// let x = Array1::<f32>::ones(4);
/// let y = dense.forward(x.view()).unwrap();
/// assert_eq!(y.len(), 3);
///
/// let (grad_input, grads) = dense.backward(x.view(), Array1::ones(3).view()).unwrap();
/// assert_eq!(grad_input.len(), 4);
/// assert_eq!(grads.weights.dim(), (4, 3));
/// ```
#[derive(Debug, Clone)]
pub struct Dense {
    input_dim: usize,
    output_dim: usize,
    /// Weight matrix with shape (input_dim, output_dim)
    pub(crate) weights: Array2<f32>,
    /// Bias vector with shape (output_dim)
    pub(crate) bias: Array1<f32>,
}

/// Parameter gradients of a [`Dense`] layer
///
/// # Fields
///
/// - `weights` - Gradient of the weight matrix with shape (input_dim, output_dim)
/// - `bias` - Gradient of the bias vector with shape (output_dim)
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGradients {
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
}

impl DenseGradients {
    /// All-zero gradients for a layer of the given size.
    pub fn zeros(input_dim: usize, output_dim: usize) -> Self {
        Self {
            weights: Array2::zeros((input_dim, output_dim)),
            bias: Array1::zeros(output_dim),
        }
    }

    /// Adds `other` into `self` element-wise.
    pub fn accumulate(&mut self, other: &DenseGradients) {
        self.weights += &other.weights;
        self.bias += &other.bias;
    }
}

impl Dense {
    /// Creates a new dense layer.
    ///
    /// # Parameters
    ///
    /// - `input_dim` - Size of the input vector
    /// - `output_dim` - Size of the output vector
    /// - `rng` - Random source for weight initialization
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new Dense layer instance
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If either dimension is 0
    pub fn new<R: Rng + ?Sized>(
        input_dim: usize,
        output_dim: usize,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        validate_dimension_greater_than_zero(input_dim, "input_dim")?;
        validate_dimension_greater_than_zero(output_dim, "output_dim")?;

        let weights = Array::random_using((input_dim, output_dim), StandardNormal, rng) * 0.1;
        let bias = Array1::zeros(output_dim);

        Ok(Self {
            input_dim,
            output_dim,
            weights,
            bias,
        })
    }

    /// Computes `input · weights + bias`.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `input` does not have `input_dim` elements
    pub fn forward(&self, input: ArrayView1<f32>) -> Result<Array1<f32>, ModelError> {
        validate_vector_len(input.len(), self.input_dim, "dense input")?;
        Ok(input.dot(&self.weights) + &self.bias)
    }

    /// Backward pass for one forward call.
    ///
    /// # Parameters
    ///
    /// - `input` - The input that was given to the matching [`Dense::forward`] call
    /// - `grad_output` - Gradient of the loss with respect to the output
    ///
    /// # Returns
    ///
    /// - `Ok((grad_input, gradients))` - Gradient with respect to the input and the parameter gradients
    /// - `Err(ModelError)` - If either vector has the wrong length
    pub fn backward(
        &self,
        input: ArrayView1<f32>,
        grad_output: ArrayView1<f32>,
    ) -> Result<(Array1<f32>, DenseGradients), ModelError> {
        validate_vector_len(input.len(), self.input_dim, "dense input")?;
        validate_vector_len(grad_output.len(), self.output_dim, "dense output gradient")?;

        let grad_weights = outer(&input, &grad_output);
        let grad_bias = grad_output.to_owned();
        let grad_input = self.weights.dot(&grad_output);

        Ok((
            grad_input,
            DenseGradients {
                weights: grad_weights,
                bias: grad_bias,
            },
        ))
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    /// Weight matrix with shape (input_dim, output_dim)
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Bias vector with shape (output_dim)
    pub fn bias(&self) -> &Array1<f32> {
        &self.bias
    }
}
