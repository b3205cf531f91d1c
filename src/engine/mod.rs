pub mod engine;
pub mod apply_directive;
pub mod state_update;

pub mod prompt_builder;
pub mod llm_client;
pub mod speech_client;
pub mod scenarios;
pub mod save_io;
