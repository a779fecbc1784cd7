use once_cell::sync::Lazy;
use regex::Regex;

/// ATX heading: 1-6 `#`, horizontal whitespace, then the title
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]+(.+)$").expect("valid heading pattern"));

const MAX_LEVEL: usize = 6;

/// A heading line found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Byte offset of the start of the heading line
    pub offset: usize,
    /// 1 for `#`, 6 for `######`
    pub level: usize,
    pub title: String,
}

/// Heading hierarchy of one document, precomputed once.
///
/// Each heading event carries the full path that is open right after it, so
/// a lookup is a binary search over the event offsets.
#[derive(Debug, Clone, Default)]
pub struct HeadingIndex {
    offsets: Vec<usize>,
    paths: Vec<Vec<String>>,
}

impl HeadingIndex {
    pub fn new(text: &str) -> Self {
        let mut open: [Option<String>; MAX_LEVEL] = Default::default();
        let mut offsets = Vec::new();
        let mut paths = Vec::new();

        for heading in scan_headings(text) {
            // a heading closes every deeper section and replaces its own level
            for slot in open.iter_mut().skip(heading.level) {
                *slot = None;
            }
            open[heading.level - 1] = Some(heading.title);

            offsets.push(heading.offset);
            paths.push(open.iter().flatten().cloned().collect());
        }

        Self { offsets, paths }
    }

    /// Titles of the sections open at `offset`, outermost first.
    ///
    /// Only headings whose line starts strictly before `offset` count.
    pub fn headings_before(&self, offset: usize) -> Vec<String> {
        match self.offsets.partition_point(|&start| start < offset) {
            0 => Vec::new(),
            n => self.paths[n - 1].clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Every heading line in `text`, in document order
pub fn scan_headings(text: &str) -> Vec<Heading> {
    HEADING_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let marker = caps.get(1)?;
            let title = caps.get(2)?.as_str().trim();
            if title.is_empty() {
                return None;
            }
            Some(Heading {
                offset: marker.start(),
                level: marker.as_str().len(),
                title: title.to_string(),
            })
        })
        .collect()
}

/// One-shot lookup without keeping an index around
pub fn headings_before(text: &str, offset: usize) -> Vec<String> {
    HeadingIndex::new(text).headings_before(offset)
}
