use serde::{Deserialize, Serialize};

pub const HP_KEY: &str = "HP";
pub const INVENTORY_ADD_KEY: &str = "INVENTORY_ADD";
pub const INVENTORY_REMOVE_KEY: &str = "INVENTORY_REMOVE";

/// A single state change requested by the narrator inside a
/// `[STATE_UPDATE: ...]` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    Hp { delta: i32 },
    InventoryAdd { item: String },
    InventoryRemove { item: String },
}

impl Directive {
    pub fn key(&self) -> &'static str {
        match self {
            Directive::Hp { .. } => HP_KEY,
            Directive::InventoryAdd { .. } => INVENTORY_ADD_KEY,
            Directive::InventoryRemove { .. } => INVENTORY_REMOVE_KEY,
        }
    }
}
