use std::fmt;
#[cfg(feature = "tiktoken")]
use std::sync::Arc;

/// Name of the BPE encoding used for exact counts
pub const ENCODING_NAME: &str = "cl100k_base";

/// Measures text size for segment budgeting.
///
/// The strategy is chosen once when the counter is built and never changes
/// afterwards. Cloning is cheap: the BPE tables are shared.
#[derive(Clone)]
pub struct TokenCounter {
    strategy: Strategy,
}

#[derive(Clone)]
enum Strategy {
    /// Sub-word count from the cl100k_base BPE
    #[cfg(feature = "tiktoken")]
    Exact(Arc<tiktoken_rs::CoreBPE>),
    /// Whitespace-delimited word count
    Words,
}

/// Which strategy a counter settled on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerKind {
    Exact,
    Words,
}

impl TokenCounter {
    /// Probe for the BPE tokenizer and fall back to word counting if it
    /// cannot be loaded.
    pub fn detect() -> Self {
        match Self::exact() {
            Some(counter) => counter,
            None => {
                tracing::warn!(
                    "{} tokenizer unavailable, using word-based chunking",
                    ENCODING_NAME
                );
                Self::words()
            }
        }
    }

    /// Exact sub-word counter, if the tokenizer can be loaded
    #[cfg(feature = "tiktoken")]
    pub fn exact() -> Option<Self> {
        match tiktoken_rs::cl100k_base() {
            Ok(bpe) => Some(Self {
                strategy: Strategy::Exact(Arc::new(bpe)),
            }),
            Err(e) => {
                tracing::debug!("Failed to load {}: {}", ENCODING_NAME, e);
                None
            }
        }
    }

    #[cfg(not(feature = "tiktoken"))]
    pub fn exact() -> Option<Self> {
        None
    }

    /// Word-count counter
    pub fn words() -> Self {
        Self {
            strategy: Strategy::Words,
        }
    }

    pub fn kind(&self) -> TokenizerKind {
        match self.strategy {
            #[cfg(feature = "tiktoken")]
            Strategy::Exact(_) => TokenizerKind::Exact,
            Strategy::Words => TokenizerKind::Words,
        }
    }

    /// Size of `text` in tokens
    pub fn count(&self, text: &str) -> usize {
        match &self.strategy {
            #[cfg(feature = "tiktoken")]
            Strategy::Exact(bpe) => bpe.encode_ordinary(text).len(),
            Strategy::Words => text.split_whitespace().count(),
        }
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCounter")
            .field("kind", &self.kind())
            .finish()
    }
}
