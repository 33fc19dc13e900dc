/*!
 * Chunked summarization of extracted document text.
 *
 * - `duration`: Podcast length choices and their prompts
 * - `chunking`: Fixed-size character chunking
 * - `core`: Summarizer seam and the provider-backed service
 * - `batch`: Per-document chunk loop and result assembly
 */

pub use self::batch::{BatchSummarizer, DocumentSummary};
pub use self::chunking::{split_into_chunks, DEFAULT_CHUNK_SIZE};
pub use self::core::{build_chunk_request, combine_summaries, ChunkSummarizer, SummarizationService};
pub use self::duration::PodcastDuration;

pub mod batch;
pub mod chunking;
pub mod core;
pub mod duration;
