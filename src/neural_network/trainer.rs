use super::*;
use crate::dataset::{SOS_INDEX, TrainingExample, Vocabulary, normalize_string};
use crate::error::IoError;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array1;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Hyperparameters and bookkeeping options for [`Trainer`]
pub mod training_config;

pub use training_config::*;

/// Runs one teacher-forced forward pass and the complete backward pass for one example.
///
/// 1. The decoder is reset and the encoder consumes `input` from the zero state.
/// 2. The decoder starts from `<SOS>`; at every target position the loss
///    `-ln(p[target] + 1e-9)` is accumulated and the next input is the ground-truth token.
/// 3. Decoder steps are backpropagated last to first, chaining `(dh, dc)` between steps.
/// 4. The state gradient left at the first decoder step is fed into the encoder.
///
/// The returned loss is the mean over target positions, while the gradients are those
/// of the summed loss: per-step gradients are added without dividing by `target.len()`.
/// Parameters are not modified.
///
/// # Parameters
///
/// - `model` - Model to differentiate
/// - `input` - Source token indices
/// - `target` - Target token indices, usually ending with `<EOS>`
///
/// # Returns
///
/// - `Ok((mean_loss, gradients))` - Loss averaged over target positions and the gradient of the summed loss
/// - `Err(ModelError::InputValidationError)` - If `target` is empty or an index is out of range
pub fn compute_gradients(
    model: &mut Seq2Seq,
    input: &[usize],
    target: &[usize],
) -> Result<(f32, Seq2SeqGradients), ModelError> {
    if target.is_empty() {
        return Err(ModelError::InputValidationError(
            "target sequence must not be empty".to_string(),
        ));
    }

    let result = backpropagate_through_time(model, input, target);
    if result.is_err() {
        model.encoder.reset();
        model.decoder.reset();
    }
    result
}

fn backpropagate_through_time(
    model: &mut Seq2Seq,
    input: &[usize],
    target: &[usize],
) -> Result<(f32, Seq2SeqGradients), ModelError> {
    let loss_fn = SparseCategoricalCrossEntropy::new();

    model.decoder.reset();
    let mut state = model.encoder.forward(input)?;

    let mut total_loss = 0.0;
    let mut logit_grads: Vec<Array1<f32>> = Vec::with_capacity(target.len());
    let mut token = SOS_INDEX;
    for &expected in target {
        let (logits, next_state) = model.decoder.forward(token, &state)?;
        let (loss, d_logits) = loss_fn.loss_and_grad(logits.view(), expected)?;
        total_loss += loss;
        logit_grads.push(d_logits);
        state = next_state;
        token = expected;
    }

    let mut decoder_grads = DecoderGradients::zeros_like(&model.decoder);
    let mut grad_state = LSTMState::zeros(model.config().hidden_size);
    for d_logits in logit_grads.iter().rev() {
        let (step, grad_prev) = model.decoder.backward(d_logits.view(), &grad_state)?;
        decoder_grads.accumulate(&step)?;
        grad_state = grad_prev;
    }

    let encoder_grads = model.encoder.backward(grad_state)?;

    Ok((
        total_loss / target.len() as f32,
        Seq2SeqGradients {
            encoder: encoder_grads,
            decoder: decoder_grads,
        },
    ))
}

/// Mean teacher-forced loss of one example without computing gradients.
pub fn compute_loss(
    model: &mut Seq2Seq,
    input: &[usize],
    target: &[usize],
) -> Result<f32, ModelError> {
    if target.is_empty() {
        return Err(ModelError::InputValidationError(
            "target sequence must not be empty".to_string(),
        ));
    }

    let loss_fn = SparseCategoricalCrossEntropy::new();
    let logits = model.teacher_forced_logits(input, target)?;
    let mut total_loss = 0.0;
    for (step_logits, &expected) in logits.iter().zip(target) {
        let (loss, _) = loss_fn.loss_and_grad(step_logits.view(), expected)?;
        total_loss += loss;
    }
    Ok(total_loss / target.len() as f32)
}

/// Trains on one example: full gradient computation, then one optimizer step.
///
/// Gradients are complete before the optimizer sees them, so either all ten
/// tensors are updated or, on error, none are.
///
/// # Returns
///
/// - `Ok(f32)` - Mean loss of the example before the update
/// - `Err(ModelError)` - If the example is invalid or the optimizer rejects the pairs
pub fn train_iteration<O: Optimizer + ?Sized>(
    model: &mut Seq2Seq,
    optimizer: &mut O,
    input: &[usize],
    target: &[usize],
) -> Result<f32, ModelError> {
    let (loss, mut grads) = compute_gradients(model, input, target)?;
    optimizer.step(model.params_and_grads(&mut grads))?;
    Ok(loss)
}

/// Translates a raw sentence with greedy decoding.
///
/// The sentence is normalized and encoded with `<UNK>` for unknown words, then the
/// predicted indices are decoded back into a space-separated string.
///
/// # Example
/// ```rust
/// use rustynmt::dataset::VocabularyBuilder;
/// use rustynmt::neural_network::{Seq2Seq, Seq2SeqConfig, translate_sentence};
///
/// let mut src = VocabularyBuilder::new("fra");
/// src.add_sentence("je suis content .");
/// let mut tgt = VocabularyBuilder::new("eng");
/// tgt.add_sentence("i am happy .");
/// let (src, tgt) = (src.build(), tgt.build());
///
/// let config = Seq2SeqConfig {
///     input_vocab_size: src.len(),
///     output_vocab_size: tgt.len(),
///     embed_size: 8,
///     hidden_size: 8,
/// };
/// let mut model = Seq2Seq::new(config, Some(1)).unwrap();
/// let out = translate_sentence(&mut model, "Je suis très content!", &src, &tgt, 4).unwrap();
/// assert!(out.split_whitespace().count() <= 4);
/// ```
pub fn translate_sentence(
    model: &mut Seq2Seq,
    sentence: &str,
    input_vocab: &Vocabulary,
    output_vocab: &Vocabulary,
    max_length: usize,
) -> Result<String, ModelError> {
    let normalized = normalize_string(sentence);
    let input = input_vocab.encode(&normalized);
    let output = model.translate(&input, max_length)?;
    Ok(output_vocab.decode(&output))
}

/// Drives training over a set of examples.
///
/// Each epoch visits every example once in a freshly shuffled order and applies one
/// clipped SGD step per example. Progress goes to an `indicatif` bar and per-epoch
/// summaries to `tracing`.
///
/// # Example
/// ```rust
/// use rustynmt::dataset::TrainingExample;
/// use rustynmt::neural_network::{Seq2Seq, Trainer, TrainingConfig};
///
/// let config = TrainingConfig {
///     embed_size: 8,
///     hidden_size: 8,
///     learning_rate: 0.1,
///     epochs: 3,
///     seed: Some(7),
///     show_progress: false,
///     ..TrainingConfig::default()
/// };
/// let examples = vec![TrainingExample {
///     input: vec![4, 5],
///     target: vec![4, 2],
/// }];
///
/// let mut model = Seq2Seq::new(config.model_config(6, 6), config.seed).unwrap();
/// let mut trainer = Trainer::new(config).unwrap();
/// let losses = trainer.fit(&mut model, &examples).unwrap();
/// assert_eq!(losses.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
    optimizer: SGD,
    rng: StdRng,
}

impl Trainer {
    /// Creates a trainer with a clipped SGD optimizer built from `config`.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `config` fails [`TrainingConfig::validate`]
    pub fn new(config: TrainingConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let optimizer = SGD::with_clip_value(config.learning_rate, config.clip_value)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            optimizer,
            rng,
        })
    }

    /// Trains `model` for `config.epochs` epochs.
    ///
    /// When `weights_path` is set, the weights are saved every `checkpoint_every`
    /// epochs and after the last epoch.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<f32>)` - Mean example loss of each epoch
    /// - `Err(ModelError::InputValidationError)` - If `examples` is empty or an example is invalid
    /// - `Err(ModelError::ProcessingError)` - If a checkpoint cannot be written
    pub fn fit(
        &mut self,
        model: &mut Seq2Seq,
        examples: &[TrainingExample],
    ) -> Result<Vec<f32>, ModelError> {
        if examples.is_empty() {
            return Err(ModelError::InputValidationError(
                "no training examples".to_string(),
            ));
        }

        let epochs = self.config.epochs;
        let progress_bar = if self.config.show_progress {
            let bar = ProgressBar::new((epochs * examples.len()) as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} | Loss: {msg}")
                    .map_err(|e| ModelError::ProcessingError(e.to_string()))?
                    .progress_chars("█▓░"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        info!(
            examples = examples.len(),
            epochs,
            parameters = model.parameter_count(),
            "starting training"
        );

        let mut order: Vec<usize> = (0..examples.len()).collect();
        let mut epoch_losses = Vec::with_capacity(epochs);
        for epoch in 1..=epochs {
            order.shuffle(&mut self.rng);

            let mut total_loss = 0.0;
            for &i in &order {
                let example = &examples[i];
                let loss =
                    train_iteration(model, &mut self.optimizer, &example.input, &example.target)?;
                total_loss += loss;
                progress_bar.set_message(format!("{:.4}", loss));
                progress_bar.inc(1);
            }

            let mean_loss = total_loss / examples.len() as f32;
            epoch_losses.push(mean_loss);
            info!(epoch, epochs, loss = mean_loss, "epoch finished");

            if epoch % self.config.checkpoint_every == 0 || epoch == epochs {
                self.checkpoint(model, epoch)?;
            }
        }

        progress_bar.finish_with_message("Training completed");
        Ok(epoch_losses)
    }

    fn checkpoint(&self, model: &Seq2Seq, epoch: usize) -> Result<(), ModelError> {
        let Some(path) = self.config.weights_path.as_deref() else {
            return Ok(());
        };
        model.save_to_path(path).map_err(|e| {
            ModelError::ProcessingError(format!("failed to save checkpoint to {}: {}", path, e))
        })?;
        info!(epoch, path, "checkpoint saved");
        Ok(())
    }

    /// Mean loss over `examples` without updating the model.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `examples` is empty or an example is invalid
    pub fn evaluate(
        &self,
        model: &mut Seq2Seq,
        examples: &[TrainingExample],
    ) -> Result<f32, ModelError> {
        if examples.is_empty() {
            return Err(ModelError::InputValidationError(
                "no examples to evaluate".to_string(),
            ));
        }
        let mut total_loss = 0.0;
        for example in examples {
            total_loss += compute_loss(model, &example.input, &example.target)?;
        }
        Ok(total_loss / examples.len() as f32)
    }

    /// Loads `config.weights_path` into `model` when it holds compatible weights.
    ///
    /// Returns `false` and keeps the current parameters when no path is configured or
    /// the file cannot be used.
    pub fn resume(&self, model: &mut Seq2Seq) -> bool {
        match self.config.weights_path.as_deref() {
            Some(path) => model.load_or_keep_initialized(path),
            None => {
                warn!("no weights_path configured, starting from initialized parameters");
                false
            }
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn optimizer(&self) -> &SGD {
        &self.optimizer
    }
}
