use serde::{Deserialize, Serialize};

/// What happened to one `KEY=VALUE` token of a state update block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DirectiveOutcome {
    Applied,
    /// Well-formed but had no effect (duplicate add, absent remove).
    Unchanged { reason: String },
    /// Malformed or unknown token; ignored.
    Skipped { token: String, reason: String },
}

/// Result of running one narrator response through the state updater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdateReport {
    pub narration: String,
    pub results: Vec<DirectiveOutcome>,
}

impl StateUpdateReport {
    pub fn applied_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, DirectiveOutcome::Applied))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, DirectiveOutcome::Skipped { .. }))
            .count()
    }
}
