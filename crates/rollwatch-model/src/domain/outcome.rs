use crate::Identifier;

/// Result of rendering one roster entry.
///
/// A missing document is a first-class failure record: downstream it turns
/// into a placeholder archive entry instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub identifier: Identifier,
    pub document: Option<Vec<u8>>,
}

impl FetchOutcome {
    pub fn success(identifier: Identifier, document: Vec<u8>) -> Self {
        Self {
            identifier,
            document: Some(document),
        }
    }

    pub fn failed(identifier: Identifier) -> Self {
        Self {
            identifier,
            document: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.document.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_failure() {
        let ok = FetchOutcome::success("1".into(), b"%PDF".to_vec());
        let missing = FetchOutcome::failed("2".into());
        assert!(ok.is_success());
        assert!(!missing.is_success());
        assert_eq!(missing.identifier.as_str(), "2");
    }
}
