use super::*;

/// Training hyperparameters, loadable from JSON.
///
/// Missing keys fall back to the [`Default`] values, so a config file only needs the
/// fields it changes.
///
/// # Fields
///
/// - `embed_size` - Embedding width of both halves (default 128)
/// - `hidden_size` - Hidden size of both LSTM cells (default 256)
/// - `learning_rate` - SGD step size (default 0.001)
/// - `clip_value` - Element-wise gradient bound (default 5.0)
/// - `epochs` - Number of passes over the examples (default 30)
/// - `checkpoint_every` - Save weights every this many epochs (default 5)
/// - `max_length` - Sentence pairs with this many words or more are filtered out (default 10)
/// - `num_samples` - Number of sentence pairs kept for training (default 2000)
/// - `seed` - Seed for initialization and shuffling, `None` for entropy
/// - `weights_path` - Where checkpoints are written and resumed from
/// - `show_progress` - Whether to draw a progress bar (default true)
///
/// # Example
/// ```rust
/// use rustynmt::neural_network::TrainingConfig;
///
/// let config: TrainingConfig = serde_json::from_str(r#"{ "epochs": 3, "seed": 11 }"#).unwrap();
/// assert_eq!(config.epochs, 3);
/// assert_eq!(config.hidden_size, 256);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub embed_size: usize,
    pub hidden_size: usize,
    pub learning_rate: f32,
    pub clip_value: f32,
    pub epochs: usize,
    pub checkpoint_every: usize,
    pub max_length: usize,
    pub num_samples: usize,
    pub seed: Option<u64>,
    pub weights_path: Option<String>,
    pub show_progress: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            embed_size: 128,
            hidden_size: 256,
            learning_rate: 0.001,
            clip_value: DEFAULT_CLIP_VALUE,
            epochs: 30,
            checkpoint_every: 5,
            max_length: 10,
            num_samples: 2000,
            seed: None,
            weights_path: None,
            show_progress: true,
        }
    }
}

impl TrainingConfig {
    /// Reads a JSON config file.
    ///
    /// # Errors
    ///
    /// - `IoError::StdIoError` - If the file cannot be opened
    /// - `IoError::JsonError` - If the file is not a valid config document
    pub fn from_path(path: &str) -> Result<Self, IoError> {
        let reader = IoError::load_in_buf_reader(path)?;
        serde_json::from_reader(reader).map_err(IoError::JsonError)
    }

    /// Checks sizes and rates before any model is built.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If a size or count is 0, or a rate is not positive and finite
    pub fn validate(&self) -> Result<(), ModelError> {
        let counts = [
            (self.embed_size, "embed_size"),
            (self.hidden_size, "hidden_size"),
            (self.epochs, "epochs"),
            (self.checkpoint_every, "checkpoint_every"),
            (self.max_length, "max_length"),
            (self.num_samples, "num_samples"),
        ];
        for (value, name) in counts {
            if value == 0 {
                return Err(ModelError::InputValidationError(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        for (value, name) in [
            (self.learning_rate, "learning_rate"),
            (self.clip_value, "clip_value"),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ModelError::InputValidationError(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Model dimensions for the given vocabulary sizes.
    pub fn model_config(&self, input_vocab_size: usize, output_vocab_size: usize) -> Seq2SeqConfig {
        Seq2SeqConfig {
            input_vocab_size,
            output_vocab_size,
            embed_size: self.embed_size,
            hidden_size: self.hidden_size,
        }
    }
}
