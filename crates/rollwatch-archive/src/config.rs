/// 7.5 MiB, under the attachment limit of a standard chat server.
pub const DEFAULT_BUDGET_BYTES: u64 = 7 * 1024 * 1024 + 512 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Once an open archive grows past this size, the next document starts a new one.
    pub budget_bytes: u64,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            budget_bytes: DEFAULT_BUDGET_BYTES,
        }
    }
}

impl ChunkerConfig {
    pub fn budget_mib(&self) -> f64 {
        self.budget_bytes as f64 / (1024.0 * 1024.0)
    }
}
