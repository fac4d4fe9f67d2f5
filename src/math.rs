use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1};

/// Bound applied to sigmoid arguments before exponentiation.
///
/// Kept below `ln(f32::MAX) ≈ 88.72` so `exp` of the clamped argument stays finite.
/// The `f32` sigmoid already saturates to `0.0`/`1.0` near ±17, so outputs are unaffected.
pub const SIGMOID_CLIP: f32 = 88.0;

/// Computes the logistic sigmoid for a scalar input.
///
/// The argument is clamped to `[-SIGMOID_CLIP, SIGMOID_CLIP]` before `exp`.
///
/// # Parameters
///
/// - `z` - Input value to transform
///
/// # Returns
///
/// - `f32` - Sigmoid output in the range \[0, 1\]
///
/// # Examples
/// ```rust
/// use rustynmt::math::sigmoid;
///
/// let value = sigmoid(0.0);
/// assert!((value - 0.5).abs() < 1e-6);
/// // extreme inputs do not overflow
/// assert!(sigmoid(-1.0e6).is_finite());
/// ```
#[inline]
pub fn sigmoid(z: f32) -> f32 {
    let clipped = z.clamp(-SIGMOID_CLIP, SIGMOID_CLIP);
    1.0 / (1.0 + (-clipped).exp())
}

/// Applies [`sigmoid`] element-wise.
#[inline]
pub fn sigmoid_vec<S>(z: &ArrayBase<S, Ix1>) -> Array1<f32>
where
    S: Data<Elem = f32>,
{
    z.mapv(sigmoid)
}

/// Applies `tanh` element-wise.
#[inline]
pub fn tanh_vec<S>(z: &ArrayBase<S, Ix1>) -> Array1<f32>
where
    S: Data<Elem = f32>,
{
    z.mapv(f32::tanh)
}

/// Converts logits into a probability distribution.
///
/// The maximum logit is subtracted before exponentiating, so large logits
/// cannot overflow.
///
/// # Parameters
///
/// - `logits` - Unnormalized scores
///
/// # Returns
///
/// - `Array1<f32>` - Probabilities summing to 1
///
/// # Examples
/// ```rust
/// use ndarray::array;
/// use rustynmt::math::softmax;
///
/// let p = softmax(&array![1000.0_f32, 1000.0]);
/// assert!((p[0] - 0.5).abs() < 1e-6);
/// assert!((p.sum() - 1.0).abs() < 1e-6);
/// ```
pub fn softmax<S>(logits: &ArrayBase<S, Ix1>) -> Array1<f32>
where
    S: Data<Elem = f32>,
{
    let max_val = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let mut out = logits.mapv(|x| (x - max_val).exp());
    let sum = out.sum();
    out.mapv_inplace(|x| x / sum);
    out
}

/// Outer product `a^T · b` of two vectors, shape `(a.len(), b.len())`.
///
/// # Examples
/// ```rust
/// use ndarray::array;
/// use rustynmt::math::outer;
///
/// let m = outer(&array![1.0_f32, 2.0], &array![3.0_f32, 4.0, 5.0]);
/// assert_eq!(m.dim(), (2, 3));
/// assert_eq!(m[[1, 2]], 10.0);
/// ```
pub fn outer<S1, S2>(a: &ArrayBase<S1, Ix1>, b: &ArrayBase<S2, Ix1>) -> Array2<f32>
where
    S1: Data<Elem = f32>,
    S2: Data<Elem = f32>,
{
    let column = a.view().insert_axis(Axis(1));
    let row = b.view().insert_axis(Axis(0));
    column.dot(&row)
}

/// Index of the largest element. Ties resolve to the first occurrence.
///
/// Returns `None` for an empty input.
pub fn argmax<S>(values: &ArrayBase<S, Ix1>) -> Option<usize>
where
    S: Data<Elem = f32>,
{
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
