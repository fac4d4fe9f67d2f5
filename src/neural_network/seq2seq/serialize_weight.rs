use super::*;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use serde_json::{from_reader, to_writer_pretty};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, warn};

/// Serializable form of every trainable tensor of a [`Seq2Seq`] model.
///
/// Matrices are stored as lists of rows, vectors as flat lists. Field names are the
/// persisted keys and match [`PARAMETER_NAMES`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableSeq2SeqWeight {
    pub enc_emb_w: Vec<Vec<f32>>,
    pub enc_lstm_wxh: Vec<Vec<f32>>,
    pub enc_lstm_whh: Vec<Vec<f32>>,
    pub enc_lstm_b: Vec<f32>,
    pub dec_emb_w: Vec<Vec<f32>>,
    pub dec_lstm_wxh: Vec<Vec<f32>>,
    pub dec_lstm_whh: Vec<Vec<f32>>,
    pub dec_lstm_b: Vec<f32>,
    pub dec_fc_w: Vec<Vec<f32>>,
    pub dec_fc_b: Vec<f32>,
}

fn matrix_rows(matrix: &Array2<f32>) -> Vec<Vec<f32>> {
    matrix.outer_iter().map(|row| row.to_vec()).collect()
}

/// Rebuilds a tensor of exactly `shape` from its persisted form.
fn restore_tensor(name: &str, shape: &[usize], flat: Vec<f32>) -> Result<ArrayD<f32>, IoError> {
    ArrayD::from_shape_vec(IxDyn(shape), flat).map_err(|e| {
        IoError::invalid_data(format!(
            "'{}' does not fit shape {:?}: {}",
            name, shape, e
        ))
    })
}

fn flatten_rows(name: &str, rows: &[Vec<f32>], shape: &[usize]) -> Result<Vec<f32>, IoError> {
    let cols = shape.get(1).copied().unwrap_or(0);
    if rows.len() != shape[0] || rows.iter().any(|row| row.len() != cols) {
        return Err(IoError::invalid_data(format!(
            "'{}' has {} rows of uneven or wrong width, expected shape {:?}",
            name,
            rows.len(),
            shape
        )));
    }
    Ok(rows.iter().flat_map(|row| row.iter().copied()).collect())
}

impl SerializableSeq2SeqWeight {
    /// Copies every parameter of `model`.
    pub fn from_model(model: &Seq2Seq) -> Self {
        let enc = model.encoder();
        let dec = model.decoder();
        Self {
            enc_emb_w: matrix_rows(enc.embedding().weights()),
            enc_lstm_wxh: matrix_rows(enc.cell().kernel()),
            enc_lstm_whh: matrix_rows(enc.cell().recurrent_kernel()),
            enc_lstm_b: enc.cell().bias().to_vec(),
            dec_emb_w: matrix_rows(dec.embedding().weights()),
            dec_lstm_wxh: matrix_rows(dec.cell().kernel()),
            dec_lstm_whh: matrix_rows(dec.cell().recurrent_kernel()),
            dec_lstm_b: dec.cell().bias().to_vec(),
            dec_fc_w: matrix_rows(dec.dense().weights()),
            dec_fc_b: dec.dense().bias().to_vec(),
        }
    }

    /// Flat contents of each tensor, in [`PARAMETER_NAMES`] order, checked against `shapes`.
    fn flatten(self, shapes: &[Vec<usize>]) -> Result<Vec<Vec<f32>>, IoError> {
        let matrices = [
            self.enc_emb_w,
            self.enc_lstm_wxh,
            self.enc_lstm_whh,
            self.dec_emb_w,
            self.dec_lstm_wxh,
            self.dec_lstm_whh,
            self.dec_fc_w,
        ];
        let vectors = [self.enc_lstm_b, self.dec_lstm_b, self.dec_fc_b];

        let mut matrices = matrices.into_iter();
        let mut vectors = vectors.into_iter();
        let mut flat = Vec::with_capacity(PARAMETER_NAMES.len());
        for (name, shape) in PARAMETER_NAMES.iter().zip(shapes) {
            let data = if shape.len() == 2 {
                let rows = matrices.next().unwrap_or_default();
                flatten_rows(name, &rows, shape)?
            } else {
                let values = vectors.next().unwrap_or_default();
                if values.len() != shape[0] {
                    return Err(IoError::invalid_data(format!(
                        "'{}' has length {}, expected {}",
                        name,
                        values.len(),
                        shape[0]
                    )));
                }
                values
            };
            flat.push(data);
        }
        Ok(flat)
    }

    /// Writes every tensor into `model`.
    ///
    /// All ten shapes are checked before the first assignment, so on error the model
    /// keeps its previous parameters.
    ///
    /// # Errors
    ///
    /// - `IoError::StdIoError` with kind `InvalidData` - If any tensor's shape differs from the model's
    pub fn apply_to(self, model: &mut Seq2Seq) -> Result<(), IoError> {
        let shapes: Vec<Vec<usize>> = model
            .parameters()
            .iter()
            .map(|(_, p)| p.shape().to_vec())
            .collect();

        let restored = self
            .flatten(&shapes)?
            .into_iter()
            .zip(PARAMETER_NAMES.iter().zip(&shapes))
            .map(|(flat, (name, shape))| restore_tensor(name, shape, flat))
            .collect::<Result<Vec<_>, IoError>>()?;

        for ((_, mut target), source) in model.parameters_mut().into_iter().zip(restored) {
            target.assign(&source);
        }
        Ok(())
    }
}

impl Seq2Seq {
    /// Saves all ten parameter tensors to a JSON file.
    ///
    /// # Parameters
    ///
    /// - `path` - File path to create or overwrite
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Weights written and flushed
    /// - `Err(IoError::StdIoError)` - File creation or write failed
    /// - `Err(IoError::JsonError)` - Serialization failed
    pub fn save_to_path(&self, path: &str) -> Result<(), IoError> {
        let weights = SerializableSeq2SeqWeight::from_model(self);

        let file = File::create(path).map_err(IoError::StdIoError)?;
        let mut writer = BufWriter::new(file);
        to_writer_pretty(&mut writer, &weights).map_err(IoError::JsonError)?;
        writer.flush().map_err(IoError::StdIoError)?;

        debug!(path, "saved model weights");
        Ok(())
    }

    /// Loads weights previously written by [`Seq2Seq::save_to_path`].
    ///
    /// The model must have been built with the same [`Seq2SeqConfig`]. Nothing is
    /// assigned unless every tensor has the expected shape.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - All ten tensors replaced
    /// - `Err(IoError::StdIoError)` - File missing, unreadable or holding wrongly shaped tensors
    /// - `Err(IoError::JsonError)` - The file is not a weight document
    pub fn load_from_path(&mut self, path: &str) -> Result<(), IoError> {
        let reader = IoError::load_in_buf_reader(path)?;
        let weights: SerializableSeq2SeqWeight =
            from_reader(reader).map_err(IoError::JsonError)?;
        weights.apply_to(self)
    }

    /// Loads weights from `path` if possible, otherwise keeps the current initialization.
    ///
    /// A missing file or a schema mismatch is reported with a `tracing` warning rather
    /// than an error.
    ///
    /// # Returns
    ///
    /// - `true` - Weights were loaded
    /// - `false` - The model is unchanged
    pub fn load_or_keep_initialized(&mut self, path: &str) -> bool {
        match self.load_from_path(path) {
            Ok(()) => true,
            Err(e) => {
                warn!(path, error = %e, "could not load weights, keeping initialized parameters");
                false
            }
        }
    }
}
