use crate::model::directive::Directive;
use crate::model::event_result::DirectiveOutcome;
use crate::model::player_state::PlayerState;

/// Apply a Directive to the PlayerState, returning the outcome
pub fn apply_directive(state: &mut PlayerState, directive: Directive) -> DirectiveOutcome {
    match directive {
        Directive::Hp { delta } => {
            state.hp = state.hp.saturating_add(delta);
            DirectiveOutcome::Applied
        }

        Directive::InventoryAdd { item } => {
            if state.has_item(&item) {
                return DirectiveOutcome::Unchanged {
                    reason: format!("'{}' already in inventory", item),
                };
            }

            state.inventory.push(item);
            DirectiveOutcome::Applied
        }

        Directive::InventoryRemove { item } => {
            let Some(index) = state.inventory.iter().position(|i| *i == item) else {
                return DirectiveOutcome::Unchanged {
                    reason: format!("'{}' not in inventory", item),
                };
            };

            state.inventory.remove(index);
            DirectiveOutcome::Applied
        }
    }
}
