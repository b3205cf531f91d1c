use serde::{Deserialize, Serialize};

/// Hit points a fresh adventurer starts with.
pub const DEFAULT_STARTING_HP: i32 = 10;

/// The player's mutable record. Only directive application changes it.
///
/// `hp` is not clamped: reaching zero or below is left to the narrator
/// to interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub hp: i32,
    pub inventory: Vec<String>,
}

impl PlayerState {
    pub fn new(hp: i32) -> Self {
        Self {
            hp,
            inventory: Vec::new(),
        }
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.iter().any(|i| i == item)
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_HP)
    }
}
