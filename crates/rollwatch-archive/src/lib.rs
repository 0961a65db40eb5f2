//! Archive Chunker: packs fetch outcomes into size-capped zip archives and
//! hands every finished archive to the notifier.

mod error;
pub use error::ArchiveError;

mod config;
pub use config::{ChunkerConfig, DEFAULT_BUDGET_BYTES};

mod chunk;
pub use chunk::SealedChunk;

mod chunker;
pub use chunker::{ArchiveChunker, ChunkReport};
