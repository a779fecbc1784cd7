use super::token::TokenCounter;
use once_cell::sync::Lazy;
use regex::Regex;

/// Blank-line paragraph boundary
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\n+").expect("valid paragraph pattern"));

/// Sentence terminator followed by whitespace
static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("valid sentence pattern"));

/// Run of non-whitespace
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("valid word pattern"));

/// Separator placed between fragments of one segment
pub const FRAGMENT_SEPARATOR: &str = "\n\n";

/// A contiguous slice of document text, before any decoration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Fragments joined with a blank line
    pub text: String,
    /// Byte offset of the first fragment in the source text
    pub start_offset: usize,
    /// Sum of the fragments' token counts plus one separator cost per join
    pub token_count: usize,
}

/// Greedy paragraph packer with a sentence-level fallback.
///
/// Rules:
/// - Paragraphs are packed until the next one would exceed the budget
/// - A paragraph over budget on its own is split into sentences, which are
///   packed the same way
/// - A sentence over budget on its own is cut into word windows
/// - A single word over budget becomes its own segment
pub struct ParagraphSplitter<'a> {
    counter: &'a TokenCounter,
    budget: usize,
    /// Cost of the blank line placed between fragments
    separator_tokens: usize,
}

impl<'a> ParagraphSplitter<'a> {
    pub fn new(counter: &'a TokenCounter, budget: usize) -> Self {
        Self {
            counter,
            budget,
            separator_tokens: counter.count(FRAGMENT_SEPARATOR),
        }
    }

    pub fn split(&self, text: &str) -> Vec<Segment> {
        let mut acc = Accumulator::new(text);

        for paragraph in paragraphs(text) {
            let paragraph_tokens = self.counter.count(paragraph);
            if paragraph_tokens <= self.budget {
                self.pack(&mut acc, paragraph, paragraph_tokens);
                continue;
            }

            acc.flush();
            for sentence in sentences(paragraph) {
                let sentence_tokens = self.counter.count(sentence);
                if sentence_tokens <= self.budget {
                    self.pack(&mut acc, sentence, sentence_tokens);
                    continue;
                }
                for window in self.word_windows(sentence) {
                    self.pack(&mut acc, window, self.counter.count(window));
                }
            }
        }

        acc.finish()
    }

    /// Start a new segment if `fragment` does not fit the current one
    fn pack<'t>(&self, acc: &mut Accumulator<'t>, fragment: &'t str, tokens: usize) {
        if !acc.is_empty() && acc.tokens + self.separator_tokens + tokens > self.budget {
            acc.flush();
        }
        let cost = if acc.is_empty() {
            tokens
        } else {
            self.separator_tokens + tokens
        };
        acc.push(fragment, cost);
    }

    /// Cut an oversized sentence into runs of whole words that fit the budget.
    ///
    /// Each window is a slice of the sentence, so inner whitespace survives.
    fn word_windows<'s>(&self, sentence: &'s str) -> Vec<&'s str> {
        let mut windows = Vec::new();
        let mut window: Option<(usize, usize)> = None;
        let mut tokens = 0;

        for word in WORD.find_iter(sentence) {
            let word_tokens = self.counter.count(word.as_str());
            if let Some((start, end)) = window {
                if tokens + word_tokens > self.budget {
                    windows.push(&sentence[start..end]);
                    window = None;
                    tokens = 0;
                }
            }
            window = Some(match window {
                Some((start, _)) => (start, word.end()),
                None => (word.start(), word.end()),
            });
            tokens += word_tokens;
        }

        if let Some((start, end)) = window {
            windows.push(&sentence[start..end]);
        }
        windows
    }
}

/// Segment under construction plus the segments already completed
struct Accumulator<'t> {
    source: &'t str,
    /// Search position for locating the next fragment; only moves forward
    cursor: usize,
    fragments: Vec<&'t str>,
    tokens: usize,
    start_offset: usize,
    done: Vec<Segment>,
}

impl<'t> Accumulator<'t> {
    fn new(source: &'t str) -> Self {
        Self {
            source,
            cursor: 0,
            fragments: Vec::new(),
            tokens: 0,
            start_offset: 0,
            done: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn push(&mut self, fragment: &'t str, tokens: usize) {
        let offset = self.locate(fragment);
        if self.fragments.is_empty() {
            self.start_offset = offset;
        }
        self.fragments.push(fragment);
        self.tokens += tokens;
    }

    /// First occurrence of `fragment` at or after the cursor
    fn locate(&mut self, fragment: &str) -> usize {
        match self.source[self.cursor..].find(fragment) {
            Some(relative) => {
                let offset = self.cursor + relative;
                self.cursor = offset + fragment.len();
                offset
            }
            None => self.cursor,
        }
    }

    fn flush(&mut self) {
        if self.fragments.is_empty() {
            return;
        }
        self.done.push(Segment {
            text: self.fragments.join(FRAGMENT_SEPARATOR),
            start_offset: self.start_offset,
            token_count: self.tokens,
        });
        self.fragments.clear();
        self.tokens = 0;
    }

    fn finish(mut self) -> Vec<Segment> {
        self.flush();
        self.done
    }
}

/// Trimmed, non-empty paragraphs in document order
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// Trimmed, non-empty sentences of a paragraph.
///
/// Splits after `.`, `!` or `?` when followed by whitespace. Abbreviations
/// such as "Dr. Smith" are split too.
pub fn sentences(paragraph: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut last = 0;

    for m in SENTENCE_BREAK.find_iter(paragraph) {
        // keep the terminator, drop the whitespace
        out.push(&paragraph[last..m.start() + 1]);
        last = m.end();
    }
    out.push(&paragraph[last..]);

    out.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
