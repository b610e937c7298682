//! Text chunking for extraction
//!
//! Long inputs are split so each model call stays within a bounded prompt
//! size. Splits prefer paragraph breaks, then whitespace, and only cut
//! inside a word when a single word exceeds the limit.

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Chunks are trimmed; empty chunks are never returned. `max_chars == 0`
/// disables chunking.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text.trim();

    if max_chars == 0 {
        if !remaining.is_empty() {
            chunks.push(remaining);
        }
        return chunks;
    }

    while !remaining.is_empty() {
        // Byte offset of the first character past the limit
        let limit = match remaining.char_indices().nth(max_chars) {
            Some((i, _)) => i,
            None => {
                chunks.push(remaining);
                break;
            }
        };

        let window = &remaining[..limit];
        let split = match window.rfind("\n\n") {
            Some(i) if i > 0 => i,
            _ => match window.rfind(char::is_whitespace) {
                Some(i) if i > 0 => i,
                _ => limit,
            },
        };

        let chunk = remaining[..split].trim();
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        remaining = remaining[split..].trim_start();
    }

    chunks
}
