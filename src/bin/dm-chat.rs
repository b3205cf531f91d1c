//! Play in the terminal instead of the browser.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use dungeon_narrator::config::{load_dotenv, AppConfig};
use dungeon_narrator::engine::engine::{Engine, EngineError, GameSession};
use dungeon_narrator::engine::llm_client::ChatCompletionsClient;
use dungeon_narrator::engine::save_io::{load_game, save_game};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    dungeon_narrator::init_tracing();

    let config = AppConfig::from_env()?;
    let narrator = Arc::new(ChatCompletionsClient::new(&config.llm));
    let engine = Engine::new(narrator, config.history_window, config.starting_hp);

    let mut session = engine.new_session();
    let opening = engine.start(&mut session, &mut rand::thread_rng());

    println!("Type 'exit' or 'quit' to end, 'save' or 'load' to use {}.", config.save_path.display());
    println!("{}", "-".repeat(20));
    println!("DM: {}", opening);
    print_status(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };

        match line.trim().to_lowercase().as_str() {
            "exit" | "quit" => break,
            "save" => {
                match save_game(&config.save_path, &session.to_save()) {
                    Ok(()) => println!("Game saved."),
                    Err(e) => println!("Could not save: {:#}", e),
                }
                continue;
            }
            "load" => {
                match load_game(&config.save_path).and_then(|save| {
                    engine
                        .restore(&mut session, save)
                        .map_err(anyhow::Error::from)
                }) {
                    Ok(()) => {
                        println!("Game loaded.");
                        print_status(&session);
                    }
                    Err(e) => println!("Could not load: {:#}", e),
                }
                continue;
            }
            _ => {}
        }

        match engine.take_turn(&mut session, &line).await {
            Ok(outcome) => {
                println!("DM: {}", outcome.narration);
                print_status(&session);
            }
            Err(EngineError::EmptyInput) => continue,
            Err(e) => println!("An error occurred: {}", e),
        }
    }

    println!("Exiting chat. Goodbye!");
    Ok(())
}

fn print_status(session: &GameSession) {
    let inventory = if session.player.inventory.is_empty() {
        "nothing".to_string()
    } else {
        session.player.inventory.join(", ")
    };
    println!("[HP {} | Carrying: {}]", session.player.hp, inventory);
}
