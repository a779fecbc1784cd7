mod assembler;
mod chunk;
mod headings;
mod overlap;
mod splitter;
mod token;


pub use assembler::Chunker;
pub use chunk::{Chunk, ChunkMetadata, EmbeddingRecord, chunk_id, content_hash};
pub use headings::{Heading, HeadingIndex, headings_before, scan_headings};
pub use overlap::{OVERLAP_MARKER, inject_overlap, trailing_words};
pub use splitter::{FRAGMENT_SEPARATOR, ParagraphSplitter, Segment, paragraphs, sentences};
pub use token::{ENCODING_NAME, TokenCounter, TokenizerKind};
