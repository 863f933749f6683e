//! Token estimation
//!
//! A cheap length heuristic, not a tokenizer: one token per four UTF-8 bytes.

use crate::core::models::Lexeme;

/// Estimated token cost of raw bytes: `ceil(len / 4)` after lossy UTF-8 decoding.
///
/// Invalid sequences become U+FFFD before measuring, so any input is accepted.
pub fn estimate_tokens(bytes: &[u8]) -> usize {
    let text = String::from_utf8_lossy(bytes);
    text.len().div_ceil(4)
}

/// Anything the batching engine can weigh
pub trait TokenCost {
    fn estimated_tokens(&self) -> usize;
}

impl TokenCost for str {
    fn estimated_tokens(&self) -> usize {
        estimate_tokens(self.as_bytes())
    }
}

impl TokenCost for String {
    fn estimated_tokens(&self) -> usize {
        estimate_tokens(self.as_bytes())
    }
}

impl TokenCost for [u8] {
    fn estimated_tokens(&self) -> usize {
        estimate_tokens(self)
    }
}

impl TokenCost for Lexeme {
    fn estimated_tokens(&self) -> usize {
        estimate_tokens(self.source_text.as_bytes())
    }
}

impl<T: TokenCost + ?Sized> TokenCost for &T {
    fn estimated_tokens(&self) -> usize {
        (**self).estimated_tokens()
    }
}
