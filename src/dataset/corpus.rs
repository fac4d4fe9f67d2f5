use super::*;
use std::io::BufRead;

/// One source/target sentence pair after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentencePair {
    pub source: String,
    pub target: String,
}

/// One training example as token indices. `target` ends with `<EOS>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    pub input: Vec<usize>,
    pub target: Vec<usize>,
}

/// Everything needed to train and later translate: both vocabularies, the kept sentence
/// pairs and their index form.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub input_vocab: Vocabulary,
    pub output_vocab: Vocabulary,
    pub pairs: Vec<SentencePair>,
    pub examples: Vec<TrainingExample>,
}

/// Unicode combining diacritical marks
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Maps an accented Latin letter to its base letter(s).
///
/// Covers the precomposed letters of Latin-1, Latin Extended-A, the pinyin carons of
/// Latin Extended-B and the Vietnamese block of Latin Extended Additional. Letters
/// without a canonical decomposition (`ø`, `æ`, `ß`, `đ`) and other scripts are not
/// folded and end up as separators.
fn fold_diacritic(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'ǎ' => "a",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' | 'ǧ' => "g",
        'ĥ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ǐ' => "i",
        'ĵ' => "j",
        'ķ' | 'ǩ' => "k",
        'ĺ' | 'ļ' | 'ľ' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' | 'ǹ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' | 'ŏ' | 'ő' | 'ơ' | 'ǒ' => "o",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ţ' | 'ť' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' | 'ư' => "u",
        'ǔ' | 'ǖ' | 'ǘ' | 'ǚ' | 'ǜ' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        // Vietnamese letters with tone marks
        '\u{1ea0}'..='\u{1eb7}' => "a",
        '\u{1eb8}'..='\u{1ec7}' => "e",
        '\u{1ec8}'..='\u{1ecb}' => "i",
        '\u{1ecc}'..='\u{1ee3}' => "o",
        '\u{1ee4}'..='\u{1ef1}' => "u",
        '\u{1ef2}'..='\u{1ef9}' => "y",
        _ => return None,
    };
    Some(folded)
}

/// Normalizes a raw sentence for tokenization.
///
/// Lowercases, folds accented Latin letters to their base letter, separates `.`, `!`
/// and `?` from the preceding word, and turns every run of other characters into a
/// single space.
///
/// # Example
/// ```rust
/// use rustynmt::dataset::normalize_string;
///
/// assert_eq!(normalize_string("  Ça va, Élodie?! "), "ca va elodie ? !");
/// assert_eq!(normalize_string("I'm 20."), "i m .");
/// ```
pub fn normalize_string(s: &str) -> String {
    let lowered = s.trim().to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c.is_ascii_lowercase() {
            out.push(c);
        } else if let Some(base) = fold_diacritic(c) {
            out.push_str(base);
        } else if COMBINING_MARKS.contains(&c) {
            // already-decomposed accent, drop it and keep the base letter
        } else {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            if matches!(c, '.' | '!' | '?') {
                out.push(c);
            }
        }
    }
    out.truncate(out.trim_end().len());
    out
}

/// Reads tab-separated sentence pairs from `path`.
///
/// Only the first two columns are used; both are passed through [`normalize_string`].
/// Lines with fewer than two columns are skipped.
///
/// # Parameters
///
/// - `path` - Path to a UTF-8 file, one pair per line
/// - `reverse` - Swap the columns so the second language becomes the source
///
/// # Errors
///
/// - `IoError::StdIoError` - If the file cannot be opened or read
pub fn read_pairs(path: &str, reverse: bool) -> Result<Vec<SentencePair>, IoError> {
    let reader = IoError::load_in_buf_reader(path)?;

    let mut pairs = Vec::new();
    let mut skipped = 0usize;
    for line in reader.lines() {
        let line = line.map_err(IoError::StdIoError)?;
        if line.trim().is_empty() {
            continue;
        }
        let mut columns = line.split('\t');
        let (Some(first), Some(second)) = (columns.next(), columns.next()) else {
            skipped += 1;
            continue;
        };
        let (source, target) = if reverse {
            (second, first)
        } else {
            (first, second)
        };
        pairs.push(SentencePair {
            source: normalize_string(source),
            target: normalize_string(target),
        });
    }

    if skipped > 0 {
        warn!(path, skipped, "skipped lines without a tab-separated pair");
    }
    info!(path, pairs = pairs.len(), "read sentence pairs");
    Ok(pairs)
}

fn word_count(sentence: &str) -> usize {
    sentence.split_whitespace().count()
}

/// Keeps the pairs whose sides both have fewer than `max_length` words.
pub fn filter_pairs(pairs: Vec<SentencePair>, max_length: usize) -> Vec<SentencePair> {
    pairs
        .into_iter()
        .filter(|p| word_count(&p.source) < max_length && word_count(&p.target) < max_length)
        .collect()
}

/// Builds both vocabularies from the first `num_samples` pairs and encodes them.
///
/// Every target gets `<EOS>` appended. The vocabularies are frozen before the
/// examples are encoded, so every index is in range for a model sized from them.
///
/// # Example
/// ```rust
/// use rustynmt::dataset::{EOS_INDEX, SentencePair, prepare_dataset};
///
/// let pairs = vec![
///     SentencePair { source: "je suis la .".into(), target: "i m here .".into() },
///     SentencePair { source: "va !".into(), target: "go !".into() },
/// ];
/// let corpus = prepare_dataset(pairs, 1);
/// assert_eq!(corpus.examples.len(), 1);
/// assert_eq!(corpus.examples[0].input, vec![4, 5, 6, 7]);
/// assert_eq!(corpus.examples[0].target, vec![4, 5, 6, 7, EOS_INDEX]);
/// assert_eq!(corpus.output_vocab.len(), 8);
/// ```
pub fn prepare_dataset(mut pairs: Vec<SentencePair>, num_samples: usize) -> Corpus {
    pairs.truncate(num_samples);

    let mut input_builder = VocabularyBuilder::new("source");
    let mut output_builder = VocabularyBuilder::new("target");
    for pair in &pairs {
        input_builder.add_sentence(&pair.source);
        output_builder.add_sentence(&pair.target);
    }
    let input_vocab = input_builder.build();
    let output_vocab = output_builder.build();

    let examples = pairs
        .iter()
        .map(|pair| {
            let mut target = output_vocab.encode(&pair.target);
            target.push(EOS_INDEX);
            TrainingExample {
                input: input_vocab.encode(&pair.source),
                target,
            }
        })
        .collect();

    Corpus {
        input_vocab,
        output_vocab,
        pairs,
        examples,
    }
}

impl Corpus {
    /// Reads, filters and encodes a tab-separated corpus in one go.
    ///
    /// # Errors
    ///
    /// - `IoError::StdIoError` - If the file cannot be read
    pub fn from_path(
        path: &str,
        reverse: bool,
        max_length: usize,
        num_samples: usize,
    ) -> Result<Self, IoError> {
        let pairs = filter_pairs(read_pairs(path, reverse)?, max_length);
        let corpus = prepare_dataset(pairs, num_samples);
        info!(
            examples = corpus.examples.len(),
            input_vocab = corpus.input_vocab.len(),
            output_vocab = corpus.output_vocab.len(),
            "prepared corpus"
        );
        Ok(corpus)
    }
}
