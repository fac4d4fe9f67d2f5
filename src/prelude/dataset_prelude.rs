pub use crate::dataset::vocabulary::{EOS_INDEX, PAD_INDEX, SOS_INDEX, UNK_INDEX};
pub use crate::dataset::vocabulary::{Vocabulary, VocabularyBuilder};
pub use crate::dataset::corpus::{Corpus, SentencePair, TrainingExample};
pub use crate::dataset::corpus::{filter_pairs, normalize_string, prepare_dataset, read_pairs};
