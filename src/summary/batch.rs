/*!
 * Chunked summarization of a whole document.
 *
 * The document text is split into fixed-size chunks, each chunk is sent with the
 * duration prompt, and the trimmed responses are joined back in chunk order.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::SummarizationError;

use super::chunking::{split_into_chunks, DEFAULT_CHUNK_SIZE};
use super::core::{build_chunk_request, combine_summaries, ChunkSummarizer};
use super::duration::PodcastDuration;

/// Result of summarizing one document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    /// Trimmed summary of each chunk, in chunk order
    pub chunk_summaries: Vec<String>,
    /// Chunk summaries joined with blank lines; the spoken script
    pub combined: String,
}

impl DocumentSummary {
    /// Number of chunks the document was split into
    pub fn chunk_count(&self) -> usize {
        self.chunk_summaries.len()
    }
}

/// Summarizes documents chunk by chunk
pub struct BatchSummarizer {
    /// The summarizer used for each chunk
    summarizer: Arc<dyn ChunkSummarizer>,

    /// Chunk size in characters
    chunk_size: usize,

    /// Maximum number of chunks in flight
    max_concurrent_requests: usize,
}

impl BatchSummarizer {
    /// Create a sequential batch summarizer with the default chunk size
    pub fn new(summarizer: Arc<dyn ChunkSummarizer>) -> Self {
        Self {
            summarizer,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrent_requests: 1,
        }
    }

    /// Set the chunk size in characters
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Allow up to `max` chunks to be summarized at once
    pub fn with_concurrency(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max.max(1);
        self
    }

    /// Chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Summarize `text` for the given duration
    ///
    /// The first chunk failure aborts the run; chunks not yet sent are never sent.
    /// `progress_callback` receives `(completed, total)` after each chunk.
    pub async fn summarize(
        &self,
        text: &str,
        duration: PodcastDuration,
        progress_callback: impl Fn(usize, usize) + Send + Sync,
    ) -> Result<DocumentSummary, SummarizationError> {
        if self.chunk_size == 0 {
            return Err(SummarizationError::InvalidSettings("chunk size must be greater than zero".to_string()));
        }

        let chunks = split_into_chunks(text, self.chunk_size);
        let total = chunks.len();
        let prompt = duration.prompt();

        debug!("Summarizing {} chunk(s) of up to {} characters with {}", total, self.chunk_size, self.summarizer.describe());

        // Owned requests and a cloned summarizer keep the stream free of borrows
        let requests: Vec<(usize, String)> = chunks.into_iter()
            .enumerate()
            .map(|(index, chunk)| (index, build_chunk_request(&prompt, chunk)))
            .collect();
        let summarizer = Arc::clone(&self.summarizer);

        let mut results = stream::iter(requests)
            .map(move |(index, request)| {
                let summarizer = Arc::clone(&summarizer);
                async move {
                    let start_time = Instant::now();
                    let result = summarizer.summarize(&request).await;
                    debug!("Chunk {} of {} finished in {:?}", index + 1, total, start_time.elapsed());
                    (index, result)
                }
            })
            .buffer_unordered(self.max_concurrent_requests)
            .boxed();

        let mut summaries: Vec<(usize, String)> = Vec::with_capacity(total);

        while let Some((index, result)) = results.next().await {
            let text = result.map_err(|source| {
                error!("Chunk {} of {} failed: {}", index + 1, total, source);
                SummarizationError::Chunk { index, total, source }
            })?;

            let trimmed = text.trim();
            if trimmed.is_empty() {
                warn!("Chunk {} of {} returned an empty summary", index + 1, total);
            }

            summaries.push((index, trimmed.to_string()));
            progress_callback(summaries.len(), total);
        }

        // Restore chunk order
        summaries.sort_by_key(|(index, _)| *index);
        let chunk_summaries: Vec<String> = summaries.into_iter().map(|(_, s)| s).collect();
        let combined = combine_summaries(&chunk_summaries);

        Ok(DocumentSummary { chunk_summaries, combined })
    }
}
