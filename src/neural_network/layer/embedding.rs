use super::*;

/// Trainable lookup table mapping a token index to a dense row vector.
///
/// The table size is fixed at construction from the vocabulary size. Rows start from a
/// standard normal scaled by 0.1.
///
/// The backward pass scatters row gradients into a table-shaped gradient. A token that
/// appears several times in one sequence receives the **sum** of its contributions.
///
/// # Example
/// ```rust
/// use ndarray::array;
/// use ndarray_rand::rand::SeedableRng;
/// use ndarray_rand::rand::rngs::StdRng;
/// use rustynmt::neural_network::Embedding;
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let embedding = Embedding::new(10, 2, &mut rng).unwrap();
/// assert_eq!(embedding.forward(3).unwrap().len(), 2);
///
/// // token 3 appears twice: its gradient row is the sum of both rows
/// let grad = embedding
///     .backward(&[3, 5, 3], array![[1.0, 1.0], [2.0, 2.0], [0.5, -1.0]].view())
///     .unwrap();
/// assert_eq!(grad.row(3).to_vec(), vec![1.5, 0.0]);
/// assert_eq!(grad.row(5).to_vec(), vec![2.0, 2.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Embedding {
    vocab_size: usize,
    embed_dim: usize,
    /// Embedding table with shape (vocab_size, embed_dim)
    pub(crate) weights: Array2<f32>,
}

impl Embedding {
    /// Creates a new embedding table.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `vocab_size` or `embed_dim` is 0
    pub fn new<R: Rng + ?Sized>(
        vocab_size: usize,
        embed_dim: usize,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        validate_dimension_greater_than_zero(vocab_size, "vocab_size")?;
        validate_dimension_greater_than_zero(embed_dim, "embed_dim")?;

        let weights = Array::random_using((vocab_size, embed_dim), StandardNormal, rng) * 0.1;

        Ok(Self {
            vocab_size,
            embed_dim,
            weights,
        })
    }

    /// Looks up the row for `index`.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `index >= vocab_size`
    pub fn forward(&self, index: usize) -> Result<ArrayView1<'_, f32>, ModelError> {
        validate_index(index, self.vocab_size, "token index")?;
        Ok(self.weights.row(index))
    }

    /// Gradient of the table for a sequence of lookups.
    ///
    /// # Parameters
    ///
    /// - `indices` - Token indices in the order they were looked up
    /// - `grad_output` - One gradient row per lookup, shape (indices.len(), embed_dim)
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f32>)` - Table-shaped gradient; repeated indices are summed
    /// - `Err(ModelError)` - If shapes disagree or an index is out of range
    pub fn backward(
        &self,
        indices: &[usize],
        grad_output: ArrayView2<f32>,
    ) -> Result<Array2<f32>, ModelError> {
        validate_vector_len(grad_output.nrows(), indices.len(), "embedding gradient rows")?;
        validate_vector_len(grad_output.ncols(), self.embed_dim, "embedding gradient row")?;

        let mut grad = Array2::zeros((self.vocab_size, self.embed_dim));
        for (&index, row) in indices.iter().zip(grad_output.axis_iter(Axis(0))) {
            Self::accumulate_grad(&mut grad, index, row)?;
        }
        Ok(grad)
    }

    /// Adds one lookup's gradient row into a table-shaped gradient.
    pub fn accumulate_grad(
        grad: &mut Array2<f32>,
        index: usize,
        grad_row: ArrayView1<f32>,
    ) -> Result<(), ModelError> {
        validate_index(index, grad.nrows(), "token index")?;
        validate_vector_len(grad_row.len(), grad.ncols(), "embedding gradient row")?;
        grad.row_mut(index).scaled_add(1.0, &grad_row);
        Ok(())
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn embed_dim(&self) -> usize {
        self.embed_dim
    }

    /// Embedding table with shape (vocab_size, embed_dim)
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }
}
