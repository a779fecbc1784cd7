use super::splitter::Segment;

/// Marker placed before carried-over words
pub const OVERLAP_MARKER: &str = "...";

/// Prepend the last `overlap_words` words of each segment's predecessor.
///
/// The first segment is left alone. Offsets and token counts are untouched.
/// Words are always taken from the predecessor's original text, so overlap
/// never compounds.
pub fn inject_overlap(segments: Vec<Segment>, overlap_words: usize) -> Vec<Segment> {
    if overlap_words == 0 || segments.len() < 2 {
        return segments;
    }

    let tails: Vec<String> = segments
        .iter()
        .map(|segment| trailing_words(&segment.text, overlap_words))
        .collect();

    segments
        .into_iter()
        .enumerate()
        .map(|(i, mut segment)| {
            if i > 0 {
                segment.text = format!("{}{}\n\n{}", OVERLAP_MARKER, tails[i - 1], segment.text);
            }
            segment
        })
        .collect()
}

/// Last `n` whitespace-delimited words of `text`, joined by single spaces
pub fn trailing_words(text: &str, n: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let start = words.len().saturating_sub(n);
    words[start..].join(" ")
}
