use std::sync::Arc;

use rollwatch_model::FetchOutcome;
use rollwatch_notify::Notify;
use tracing::{debug, info, warn};

use crate::chunk::{OpenChunk, SealedChunk};
use crate::config::ChunkerConfig;
use crate::error::ArchiveError;

const MISSING_BODY: &[u8] = b"Failed to download.";

/// What one packing pass produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkReport {
    /// Archives finalized (uploaded or not).
    pub parts: usize,
    pub failed_uploads: usize,
    pub documents: usize,
    pub placeholders: usize,
}

/// Streams fetch outcomes into numbered zip archives and uploads each one as
/// soon as it is finished.
///
/// Before a document is added, an open archive already past the budget is
/// finalized and uploaded. Placeholders for failed renders never trigger that
/// check. A single archive may therefore overshoot the budget by one document.
pub struct ArchiveChunker {
    config: ChunkerConfig,
    notifier: Arc<dyn Notify>,
}

impl ArchiveChunker {
    pub fn new(config: ChunkerConfig, notifier: Arc<dyn Notify>) -> Self {
        Self { config, notifier }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Pack and upload every outcome. Upload failures are logged and counted;
    /// only archive encoding errors abort the pass.
    pub async fn pack_and_upload<I>(&self, outcomes: I) -> Result<ChunkReport, ArchiveError>
    where
        I: IntoIterator<Item = FetchOutcome>,
        I::IntoIter: Send,
    {
        let mut report = ChunkReport::default();
        let mut open = OpenChunk::new(1);

        for outcome in outcomes {
            let id = outcome.identifier;
            match outcome.document {
                Some(document) => {
                    if open.size() > self.config.budget_bytes {
                        let next = OpenChunk::new(report.parts + 2);
                        let sealed = std::mem::replace(&mut open, next).seal()?;
                        self.upload(sealed, false, &mut report).await;
                    }
                    let name = open.add(&format!("Result_{id}.pdf"), &document)?;
                    debug!(identifier = %id, entry = %name, "document archived");
                    report.documents += 1;
                }
                None => {
                    let name = open.add(&format!("MISSING_{id}.txt"), MISSING_BODY)?;
                    debug!(identifier = %id, entry = %name, "placeholder archived");
                    report.placeholders += 1;
                }
            }
        }

        if !open.is_empty() {
            let sealed = open.seal()?;
            self.upload(sealed, true, &mut report).await;
        }

        info!(
            parts = report.parts,
            documents = report.documents,
            placeholders = report.placeholders,
            failed_uploads = report.failed_uploads,
            "archives packed"
        );
        Ok(report)
    }

    async fn upload(&self, chunk: SealedChunk, last: bool, report: &mut ChunkReport) {
        let caption = if last {
            format!("📦 **Final Batch {} Ready** ({:.2} MB)", chunk.index, chunk.size_mib())
        } else {
            format!("📦 **Batch {} Ready** ({:.2} MB)", chunk.index, chunk.size_mib())
        };
        let name = chunk.file_name();
        info!(chunk = chunk.index, entries = chunk.entries, bytes = chunk.bytes.len(), "uploading archive");

        report.parts += 1;
        if !self.notifier.send_file(&name, &chunk.bytes, &caption).await {
            warn!(chunk = chunk.index, file = %name, "archive upload failed");
            report.failed_uploads += 1;
        }
    }
}
