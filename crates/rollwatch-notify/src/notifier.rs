use async_trait::async_trait;

/// Outbound notification channel.
///
/// Both calls are best-effort: they report delivery with a `bool` and never
/// fail the caller. Implementations must be no-ops returning `false` when no
/// destination is configured.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Post a text message.
    async fn send_message(&self, text: &str) -> bool;

    /// Upload `data` as an attachment called `file_name`, with an optional caption.
    async fn send_file(&self, file_name: &str, data: &[u8], caption: &str) -> bool;
}
