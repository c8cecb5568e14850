//! Recursive character text splitter
//!
//! Splits on the coarsest separator present (paragraphs, then lines, then
//! sentences, then words, then characters), recursing into pieces that are
//! still too long, and greedily merges small pieces back into chunks of at
//! most `chunk_size` characters. Consecutive chunks share up to
//! `chunk_overlap` characters of trailing pieces.

use std::collections::VecDeque;

use scout_core::Chunk;

pub const CHUNK_SIZE: usize = 500;
pub const CHUNK_OVERLAP: usize = 50;

const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(CHUNK_SIZE, CHUNK_OVERLAP)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` before every occurrence of `separator`, keeping the
/// separator at the start of the following piece
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

impl TextSplitter {
    /// Overlap is clamped below the chunk size
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into trimmed, non-empty segments
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Split a document into chunks tagged with their source and position
    pub fn split_into_chunks(&self, source: &str, text: &str) -> Vec<Chunk> {
        self.split_text(text)
            .into_iter()
            .enumerate()
            .map(|(position, text)| Chunk::new(source, position, text))
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = Self::pick_separator(text, separators);

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge_pieces(&pending));
                pending.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge_pieces(&pending));
        }

        chunks
    }

    /// First separator present in `text`, plus the finer ones after it
    fn pick_separator<'s>(text: &str, separators: &'s [String]) -> (&'s str, &'s [String]) {
        for (i, separator) in separators.iter().enumerate() {
            if separator.is_empty() {
                return ("", &[]);
            }
            if text.contains(separator.as_str()) {
                return (separator.as_str(), &separators[i + 1..]);
            }
        }
        (separators.last().map(String::as_str).unwrap_or(""), &[])
    }

    /// Greedily merge pieces shorter than the chunk size into chunks
    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window);

                // Keep a tail of the window as overlap for the next chunk
                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    match window.pop_front() {
                        Some(front) => total = total.saturating_sub(char_len(front)),
                        None => break,
                    }
                }
            }

            window.push_back(piece);
            total += len;
        }

        push_joined(&mut chunks, &window);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>) {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n)
            .map(|i| format!("token{:04}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = TextSplitter::default();
        let chunks = splitter.split_text("  Acme Corp makes anvils.  ");
        assert_eq!(chunks, vec!["Acme Corp makes anvils.".to_string()]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let splitter = TextSplitter::default();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text(" \n\n \n").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_bound() {
        let splitter = TextSplitter::default();
        let text = format!("{}\n\n{}\n{}", words(200), "x".repeat(1_234), words(80));
        let chunks = splitter.split_text(&text);
        assert!(chunks.len() > 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= CHUNK_SIZE, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let splitter = TextSplitter::default();
        let chunks = splitter.split_text(&words(300));
        assert!(chunks.len() >= 2);
        for pair in chunks.windows(2) {
            let first_word = pair[1].split_whitespace().next().unwrap();
            assert!(
                pair[0].contains(first_word),
                "next chunk should start inside the previous one"
            );
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = TextSplitter::default();
        let para_a = format!("Alpha {}", "a".repeat(290));
        let para_b = format!("Beta {}", "b".repeat(290));
        let chunks = splitter.split_text(&format!("{}\n\n{}", para_a, para_b));
        assert_eq!(chunks, vec![para_a, para_b]);
    }

    #[test]
    fn test_multibyte_text_is_measured_in_chars() {
        let splitter = TextSplitter::new(10, 2);
        let chunks = splitter.split_text(&"é".repeat(35));
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert!(chunks.len() >= 4);
    }

    #[test]
    fn test_chunks_carry_provenance() {
        let splitter = TextSplitter::new(20, 0);
        let chunks = splitter.split_into_chunks("https://acme.example", &words(10));
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.source, "https://acme.example");
            assert_eq!(chunk.position, i);
        }
    }
}
