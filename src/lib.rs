/// Error types shared by the whole crate.
///
/// - `ModelError` - Invalid input or a broken forward/backward contract during computation
/// - `IoError` - File, JSON and corpus reading failures
pub mod error;

pub use error::{IoError, ModelError};

/// Module `math` contains the scalar and vector functions used by the layers.
///
/// # Core Functions
///
/// - `sigmoid`, `sigmoid_vec` - Logistic function with its argument clamped to ±88 so `exp` cannot overflow
/// - `tanh_vec` - Element-wise hyperbolic tangent
/// - `softmax` - Max-shifted softmax over a logit vector
/// - `outer` - Outer product of two vectors, used for weight gradients
/// - `argmax` - Index of the largest element, used for greedy decoding
///
/// # Example
/// ```rust
/// use rustynmt::math::{argmax, softmax};
/// use ndarray::array;
///
/// let p = softmax(&array![0.5_f32, 2.0, -1.0]);
/// assert_eq!(argmax(&p), Some(1));
/// ```
pub mod math;

/// Shared traits.
///
/// - `Optimizer` - Updates `(parameter, gradient)` pairs in place
pub mod traits;

/// Vocabulary building and corpus preparation for sentence-pair translation data.
///
/// # Available Components
/// - **Vocabulary / VocabularyBuilder**: word/index tables with `<PAD>`, `<SOS>`, `<EOS>`, `<UNK>` at indices 0 to 3
/// - **normalize_string**: lowercasing, accent folding and punctuation splitting
/// - **read_pairs / filter_pairs / prepare_dataset**: tab-separated pair loading, length filtering and encoding
///
/// # Examples
/// ```rust
/// use rustynmt::dataset::{SentencePair, normalize_string, prepare_dataset};
///
/// let pair = SentencePair {
///     source: normalize_string("Je suis prêt."),
///     target: normalize_string("I'm ready."),
/// };
/// let corpus = prepare_dataset(vec![pair], 100);
/// assert_eq!(corpus.input_vocab.decode(&corpus.examples[0].input), "je suis pret .");
/// ```
pub mod dataset;

/// A sequence-to-sequence LSTM translator trained with hand-written backpropagation through time.
///
/// No automatic differentiation is involved: every layer implements its own backward pass,
/// and the trainer threads the state gradients across time and across the boundary
/// between encoder and decoder.
///
/// # Core Components
///
/// ## Layers
/// - **Dense**: Affine projection of the decoder hidden state to vocabulary logits
/// - **Embedding**: Token lookup table whose backward pass sums repeated tokens
/// - **LSTMCell**: Single LSTM step with a per-step cache and a pure step backward
///
/// ## Model
/// - **Encoder**: Runs the cell over a source sentence from the zero state
/// - **Decoder**: One step at a time, with a stack of step caches consumed in reverse order
/// - **Seq2Seq**: The pair of them, greedy translation and JSON weight persistence
///
/// ## Training
/// - **compute_gradients / train_iteration**: Teacher-forced BPTT for one example
/// - **SGD**: Per-tensor, element-wise clipped stochastic gradient descent
/// - **Trainer**: Shuffled epochs, progress bar, checkpoints
///
/// # Examples
/// ```rust
/// use rustynmt::dataset::EOS_INDEX;
/// use rustynmt::neural_network::*;
///
/// let config = Seq2SeqConfig {
///     input_vocab_size: 10,
///     output_vocab_size: 10,
///     embed_size: 8,
///     hidden_size: 16,
/// };
/// let mut model = Seq2Seq::new(config, Some(0)).unwrap();
/// let mut sgd = SGD::new(0.1).unwrap();
///
/// let input = [4, 5, 6];
/// let target = [7, 8, EOS_INDEX];
/// let first = train_iteration(&mut model, &mut sgd, &input, &target).unwrap();
/// let mut last = first;
/// for _ in 0..30 {
///     last = train_iteration(&mut model, &mut sgd, &input, &target).unwrap();
/// }
/// assert!(last < first);
/// ```
pub mod neural_network;

/// A convenience module that re-exports the most commonly used types and functions of this crate.
///
/// # Examples
/// ```rust
/// use rustynmt::prelude::*;
///
/// let vocab = VocabularyBuilder::new("eng").build();
/// assert_eq!(vocab.index_of("hello"), UNK_INDEX);
/// ```
pub mod prelude;
