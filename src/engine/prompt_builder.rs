use crate::engine::llm_client::ChatMessage;
use crate::model::message::{ConversationHistory, Message, Role};
use crate::model::player_state::PlayerState;

/// Builds the message list sent to the narrator model.
/// Only formats text: no parsing, no networking.
pub struct PromptBuilder {
    history_window: usize,
}

impl PromptBuilder {
    pub fn new(history_window: usize) -> Self {
        Self { history_window }
    }

    pub fn build(&self, player: &PlayerState, history: &ConversationHistory) -> Vec<ChatMessage> {
        let mut system = String::new();
        push_narrator_rules(&mut system);
        push_state_update_rules(&mut system);
        push_player_state(&mut system, player);

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(
            history
                .recent(self.history_window)
                .iter()
                .map(history_message),
        );
        messages
    }
}

fn push_narrator_rules(prompt: &mut String) {
    prompt.push_str(
        "You are a Dungeon Master narrating a fantasy adventure.\n\n\
Rules:\n\
- Respond vividly but briefly (3-5 sentences).\n\
- Take into account the player's HP, inventory, and actions.\n\
- You are the arbiter of every dice roll. When an action is risky, name the roll and the difficulty, \
roll it yourself, and narrate the result.\n\
- Never decide actions for the player beyond what they explicitly state.\n\
- End the story if the player dies or wins.\n\n",
    );
}

fn push_state_update_rules(prompt: &mut String) {
    prompt.push_str(
        "STATE UPDATES:\n\
When the player's hit points or inventory change, end your reply with exactly one line:\n\
[STATE_UPDATE: KEY=VALUE, KEY=VALUE]\n\
Allowed keys:\n\
- HP=<signed integer change>, e.g. HP=-3 or HP=+2\n\
- INVENTORY_ADD=<item name>\n\
- INVENTORY_REMOVE=<item name>\n\
Item names must not contain commas or square brackets.\n\
Omit the line entirely when nothing changes. Never mention it in the prose.\n\n",
    );
}

fn push_player_state(prompt: &mut String, player: &PlayerState) {
    prompt.push_str("PLAYER STATE:\n");
    prompt.push_str(&format!("HP: {}\n", player.hp));
    if player.inventory.is_empty() {
        prompt.push_str("Inventory: (empty)\n");
    } else {
        prompt.push_str(&format!("Inventory: {}\n", player.inventory.join(", ")));
    }
}

fn history_message(message: &Message) -> ChatMessage {
    match message.role {
        Role::Player => ChatMessage::user(message.content.clone()),
        Role::Narrator => ChatMessage::assistant(message.content.clone()),
    }
}
