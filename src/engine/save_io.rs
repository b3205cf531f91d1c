use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::model::game_save::GameSave;

pub fn default_save_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("dungeon_narrator");
    path.push("savegame.json");
    path
}

pub fn save_game(path: &Path, save: &GameSave) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating save directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(save)?;
    fs::write(path, json).with_context(|| format!("writing save file {}", path.display()))?;
    Ok(())
}

pub fn load_game(path: &Path) -> anyhow::Result<GameSave> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading save file {}", path.display()))?;
    let save = serde_json::from_str(&json)
        .with_context(|| format!("parsing save file {}", path.display()))?;
    Ok(save)
}
