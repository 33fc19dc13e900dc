/*!
 * Fixed-size splitting of extracted text.
 */

/// Default chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 12000;

/// Split text into consecutive slices of at most `chunk_size` characters
///
/// Sizes are counted in Unicode scalar values so a slice never splits a character.
/// The slices cover `text` exactly once, in order; only the last one may be shorter.
/// Empty text yields no chunks. A `chunk_size` of zero yields no chunks either;
/// configuration validation rejects it before it gets here.
pub fn split_into_chunks(text: &str, chunk_size: usize) -> Vec<&str> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::with_capacity(text.len() / chunk_size + 1);
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);

    chunks
}

/// Number of chunks `split_into_chunks` produces for a text of `char_count` characters
pub fn chunk_count(char_count: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    char_count.div_ceil(chunk_size)
}
