//! Texts posted to the webhook (Discord markdown).

pub const LIVE: &str = "🚨 **SITE IS LIVE!** Starting Bulk Download...";
pub const ALL_UPLOADED: &str = "✅ **All Batches Uploaded Successfully**";
pub const WENT_DOWN: &str = "🔴 Website went **DOWN**";
pub const CURRENTLY_DOWN: &str = "🔴 Website is currently **DOWN**";
pub const STILL_DOWN: &str = "🔴 Reminder: Website is still **DOWN**";

pub fn started(budget_mib: f64) -> String {
    format!("🔍 **Monitor Started** (browser check + {budget_mib:.1}MB split)")
}

pub fn downloaded(count: usize) -> String {
    format!("📥 Downloaded {count} PDFs. Compressing...")
}

pub fn still_up(secs_left: u64) -> String {
    format!("✅ Website still UP ({secs_left}s left)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_messages() {
        assert_eq!(started(7.5), "🔍 **Monitor Started** (browser check + 7.5MB split)");
        assert_eq!(downloaded(168), "📥 Downloaded 168 PDFs. Compressing...");
        assert_eq!(still_up(42), "✅ Website still UP (42s left)");
    }
}
