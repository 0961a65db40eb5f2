use crate::{Identifier, ModelError};

/// Fixed, ordered list of identifiers processed by a bulk run.
///
/// The first entry doubles as the canary for availability probes,
/// so a roster is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster(Vec<Identifier>);

impl Roster {
    pub fn new(entries: Vec<Identifier>) -> Result<Self, ModelError> {
        if entries.is_empty() {
            return Err(ModelError::EmptyRoster);
        }
        Ok(Self(entries))
    }

    /// Parse one identifier per line. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let entries = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim())
            .filter(|line| !line.is_empty())
            .map(Identifier::from)
            .collect();
        Self::new(entries)
    }

    /// Entry used to test overall site reachability.
    pub fn canary(&self) -> &Identifier {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Identifier] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Identifier;
    type IntoIter = std::slice::Iter<'a, Identifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_blanks_and_comments() {
        let roster = Roster::parse(
            "# batch 2022\n22156148040\n\n  22156148042  \n22156148018 # lateral\n",
        )
        .unwrap();
        let ids: Vec<&str> = roster.iter().map(Identifier::as_str).collect();
        assert_eq!(ids, ["22156148040", "22156148042", "22156148018"]);
    }

    #[test]
    fn canary_is_first_entry() {
        let roster = Roster::parse("b\na\n").unwrap();
        assert_eq!(roster.canary().as_str(), "b");
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn empty_roster_is_rejected() {
        assert!(matches!(Roster::parse("\n# nothing\n"), Err(ModelError::EmptyRoster)));
        assert!(matches!(Roster::new(Vec::new()), Err(ModelError::EmptyRoster)));
    }
}
