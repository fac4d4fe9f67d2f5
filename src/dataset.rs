use crate::error::IoError;
use ahash::AHashMap;
use tracing::{info, warn};

/// Sentence normalization, tab-separated pair reading and example preparation
pub mod corpus;
/// Word/index tables with the four reserved tokens
pub mod vocabulary;

pub use corpus::*;
pub use vocabulary::*;
