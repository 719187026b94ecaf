//! Text chunking with page tracking

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, Page};

/// Default distance (in characters) searched back from the window edge for whitespace
const DEFAULT_BOUNDARY_TOLERANCE: usize = 100;

/// Splits page text into fixed-size windows that overlap by a fixed amount
///
/// Windows never cross a page boundary. Sizes are counted in characters, not bytes.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk length in characters
    max_chars: usize,
    /// Characters shared by consecutive chunks of one page
    overlap_chars: usize,
    /// How far back from the window edge a whitespace break is accepted
    boundary_tolerance: usize,
}

impl TextChunker {
    /// Create a new chunker; `overlap_chars` must be smaller than `max_chars`
    pub fn new(max_chars: usize, overlap_chars: usize) -> Result<Self> {
        if max_chars == 0 || overlap_chars >= max_chars {
            return Err(Error::InvalidChunkConfig {
                max_chars,
                overlap_chars,
            });
        }

        Ok(Self {
            max_chars,
            overlap_chars,
            boundary_tolerance: DEFAULT_BOUNDARY_TOLERANCE,
        })
    }

    /// Create from config
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Ok(Self::new(config.max_chars, config.overlap_chars)?
            .with_boundary_tolerance(config.boundary_tolerance))
    }

    pub fn with_boundary_tolerance(mut self, boundary_tolerance: usize) -> Self {
        self.boundary_tolerance = boundary_tolerance;
        self
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn overlap_chars(&self) -> usize {
        self.overlap_chars
    }

    /// Split pages into chunks numbered in document order
    pub fn split(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut sequence_index = 0u32;

        for page in pages {
            let chars: Vec<char> = page.text.chars().collect();

            for (start, end) in self.windows(&chars) {
                chunks.push(Chunk::new(
                    chars[start..end].iter().collect(),
                    page.page_number,
                    sequence_index,
                    start,
                    end,
                ));
                sequence_index += 1;
            }
        }

        tracing::debug!(
            "Split {} pages into {} chunks (max {}, overlap {})",
            pages.len(),
            chunks.len(),
            self.max_chars,
            self.overlap_chars
        );

        chunks
    }

    /// Compute `[start, end)` character windows for one page
    fn windows(&self, chars: &[char]) -> Vec<(usize, usize)> {
        let len = chars.len();
        if chars.iter().all(|c| c.is_whitespace()) {
            return Vec::new();
        }

        let mut windows = Vec::new();
        let mut start = 0usize;

        loop {
            if len - start <= self.max_chars {
                windows.push((start, len));
                break;
            }

            let edge = start + self.max_chars;
            // The next window starts `overlap_chars` before this one ends, so the
            // end must stay past `start + overlap_chars` for the scan to advance.
            let floor = edge
                .saturating_sub(self.boundary_tolerance)
                .max(start + self.overlap_chars + 1);

            let end = (floor..=edge)
                .rev()
                .find(|&end| is_break(chars, end))
                .unwrap_or(edge);

            windows.push((start, end));
            start = end - self.overlap_chars;
        }

        windows
    }
}

/// A break before index `end` falls on a whitespace boundary
fn is_break(chars: &[char], end: usize) -> bool {
    chars[end - 1].is_whitespace() || chars.get(end).map_or(true, |c| c.is_whitespace())
}
