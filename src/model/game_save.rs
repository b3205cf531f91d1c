use serde::{Deserialize, Serialize};

use crate::model::message::ConversationHistory;
use crate::model::player_state::PlayerState;

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSave {
    pub version: u32,
    pub player: PlayerState,
    pub history: ConversationHistory,
}

impl GameSave {
    pub fn new(player: PlayerState, history: ConversationHistory) -> Self {
        Self {
            version: SAVE_VERSION,
            player,
            history,
        }
    }
}
