use std::path::Path;

use anyhow::Context;
use rollwatch_model::Roster;

const BUILTIN: &str = include_str!("roster.txt");

/// Roster from `path` when given, otherwise the built-in list.
pub fn load(path: Option<&Path>) -> anyhow::Result<Roster> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading roster file {}", path.display()))?;
            Roster::parse(&text).with_context(|| format!("roster file {}", path.display()))
        }
        None => Ok(Roster::parse(BUILTIN)?),
    }
}
