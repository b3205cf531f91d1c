pub mod directive;
pub mod event_result;
pub mod game_save;
pub mod message;
pub mod player_state;
