use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::llm_client::{LlmError, NarrativeService};
use crate::engine::prompt_builder::PromptBuilder;
use crate::engine::scenarios::pick_opening;
use crate::engine::state_update::apply_state_updates_with_report;
use crate::model::event_result::StateUpdateReport;
use crate::model::game_save::{GameSave, SAVE_VERSION};
use crate::model::message::{ConversationHistory, Message};
use crate::model::player_state::PlayerState;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("player input is empty")]
    EmptyInput,
    #[error("narrator unavailable: {0}")]
    Narrator(#[from] LlmError),
    #[error("unsupported save version {0}")]
    UnsupportedSave(u32),
}

/// Everything one game owns. Destroyed on reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub player: PlayerState,
    pub history: ConversationHistory,
}

impl GameSession {
    pub fn new(starting_hp: i32) -> Self {
        Self {
            player: PlayerState::new(starting_hp),
            history: ConversationHistory::new(),
        }
    }

    pub fn to_save(&self) -> GameSave {
        GameSave::new(self.player.clone(), self.history.clone())
    }
}

/// Result of one player turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub narration: String,
    pub player: PlayerState,
    pub report: StateUpdateReport,
}

/// Runs turns against the narrator. Holds no per-game state; callers own
/// the `GameSession` and must not run two turns on one session at once.
pub struct Engine {
    narrator: Arc<dyn NarrativeService>,
    prompts: PromptBuilder,
    starting_hp: i32,
}

impl Engine {
    pub fn new(narrator: Arc<dyn NarrativeService>, history_window: usize, starting_hp: i32) -> Self {
        Self {
            narrator,
            prompts: PromptBuilder::new(history_window),
            starting_hp,
        }
    }

    pub fn new_session(&self) -> GameSession {
        GameSession::new(self.starting_hp)
    }

    /// Reset the session and open it with a random scenario.
    pub fn start<R: Rng + ?Sized>(&self, session: &mut GameSession, rng: &mut R) -> String {
        *session = self.new_session();
        let opening = pick_opening(rng).to_string();
        session.history.push(Message::narrator(opening.clone()));
        tracing::info!("Started new game");
        opening
    }

    pub fn reset(&self, session: &mut GameSession) {
        *session = self.new_session();
        tracing::info!("Game reset");
    }

    pub async fn take_turn(
        &self,
        session: &mut GameSession,
        input: &str,
    ) -> Result<TurnOutcome, EngineError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        session.history.push(Message::player(input));
        let messages = self.prompts.build(&session.player, &session.history);

        let raw = match self.narrator.narrate(messages).await {
            Ok(raw) => raw,
            Err(e) => {
                session.history.pop_player_input();
                tracing::warn!(error = %e, "Narrator request failed");
                return Err(e.into());
            }
        };

        let report = apply_state_updates_with_report(&raw, &mut session.player);
        session.history.push(Message::narrator(report.narration.clone()));

        tracing::info!(
            hp = session.player.hp,
            items = session.player.inventory.len(),
            applied = report.applied_count(),
            skipped = report.skipped_count(),
            "Turn complete"
        );

        Ok(TurnOutcome {
            narration: report.narration.clone(),
            player: session.player.clone(),
            report,
        })
    }

    /// Replace the session wholesale with a loaded save.
    pub fn restore(&self, session: &mut GameSession, save: GameSave) -> Result<(), EngineError> {
        if save.version > SAVE_VERSION {
            return Err(EngineError::UnsupportedSave(save.version));
        }
        session.player = save.player;
        session.history = save.history;
        Ok(())
    }
}
