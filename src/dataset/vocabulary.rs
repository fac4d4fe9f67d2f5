use super::*;

/// Index of the padding token
pub const PAD_INDEX: usize = 0;
/// Index of the start-of-sequence token fed to the decoder first
pub const SOS_INDEX: usize = 1;
/// Index of the end-of-sequence token appended to every target
pub const EOS_INDEX: usize = 2;
/// Index substituted for out-of-vocabulary words
pub const UNK_INDEX: usize = 3;

/// Reserved tokens, in index order
pub const RESERVED_TOKENS: [&str; 4] = ["<PAD>", "<SOS>", "<EOS>", "<UNK>"];

/// Collects the words of one language in first-seen order.
///
/// The four reserved tokens always occupy indices 0 to 3. Call
/// [`VocabularyBuilder::build`] once every training sentence has been added; the
/// resulting [`Vocabulary`] cannot grow, so the embedding tables sized from it stay valid.
#[derive(Debug, Clone)]
pub struct VocabularyBuilder {
    name: String,
    word_to_index: AHashMap<String, usize>,
    index_to_word: Vec<String>,
}

impl VocabularyBuilder {
    pub fn new(name: &str) -> Self {
        let index_to_word: Vec<String> = RESERVED_TOKENS.iter().map(|t| t.to_string()).collect();
        let word_to_index = index_to_word
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();
        Self {
            name: name.to_string(),
            word_to_index,
            index_to_word,
        }
    }

    /// Adds every space-separated word of `sentence` not seen before.
    pub fn add_sentence(&mut self, sentence: &str) -> &mut Self {
        for word in sentence.split_whitespace() {
            self.add_word(word);
        }
        self
    }

    /// Adds a single word, returning its index.
    pub fn add_word(&mut self, word: &str) -> usize {
        if let Some(&index) = self.word_to_index.get(word) {
            return index;
        }
        let index = self.index_to_word.len();
        self.word_to_index.insert(word.to_string(), index);
        self.index_to_word.push(word.to_string());
        index
    }

    pub fn len(&self) -> usize {
        self.index_to_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_word.is_empty()
    }

    /// Freezes the table.
    pub fn build(self) -> Vocabulary {
        Vocabulary {
            name: self.name,
            word_to_index: self.word_to_index,
            index_to_word: self.index_to_word,
        }
    }
}

/// Frozen word/index table of one language.
///
/// # Example
/// ```rust
/// use rustynmt::dataset::{UNK_INDEX, VocabularyBuilder};
///
/// let mut builder = VocabularyBuilder::new("eng");
/// builder.add_sentence("i am cold .").add_sentence("i am hot .");
/// let vocab = builder.build();
///
/// assert_eq!(vocab.len(), 4 + 5);
/// assert_eq!(vocab.encode("i am tired ."), vec![4, 5, UNK_INDEX, 7]);
/// assert_eq!(vocab.decode(&[4, 5, 8, 7]), "i am hot .");
/// ```
#[derive(Debug, Clone)]
pub struct Vocabulary {
    name: String,
    word_to_index: AHashMap<String, usize>,
    index_to_word: Vec<String>,
}

impl Vocabulary {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries, reserved tokens included. This is the embedding table size.
    pub fn len(&self) -> usize {
        self.index_to_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_word.is_empty()
    }

    /// Index of `word`, or [`UNK_INDEX`] for an unknown word.
    pub fn index_of(&self, word: &str) -> usize {
        self.word_to_index.get(word).copied().unwrap_or(UNK_INDEX)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.word_to_index.contains_key(word)
    }

    pub fn word_of(&self, index: usize) -> Option<&str> {
        self.index_to_word.get(index).map(String::as_str)
    }

    /// Indices of the space-separated words of `sentence`, with `<UNK>` for unknown words.
    pub fn encode(&self, sentence: &str) -> Vec<usize> {
        sentence
            .split_whitespace()
            .map(|word| self.index_of(word))
            .collect()
    }

    /// Joins the words of `indices` with single spaces. Out-of-range indices print as `<UNK>`.
    pub fn decode(&self, indices: &[usize]) -> String {
        indices
            .iter()
            .map(|&i| self.word_of(i).unwrap_or(RESERVED_TOKENS[UNK_INDEX]))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
