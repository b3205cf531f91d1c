//! Extraction of `[STATE_UPDATE: ...]` blocks from narrator output.
//!
//! The narrator ends a turn with at most one block such as
//!
//! ```text
//! The goblin's blade bites your arm.
//! [STATE_UPDATE: HP=-3, INVENTORY_ADD=Rusty Dagger]
//! ```
//!
//! Everything before the marker is shown to the player. The block body is
//! split on commas into `KEY=VALUE` tokens which are applied left to right.
//! Malformed tokens are skipped; nothing here ever fails.

use regex_lite::Regex;
use std::sync::LazyLock;

use crate::engine::apply_directive::apply_directive;
use crate::model::directive::{Directive, HP_KEY, INVENTORY_ADD_KEY, INVENTORY_REMOVE_KEY};
use crate::model::event_result::{DirectiveOutcome, StateUpdateReport};
use crate::model::player_state::PlayerState;

pub const STATE_UPDATE_MARKER: &str = "[STATE_UPDATE:";

// The body stops at the first `]`, so item names cannot contain one.
static STATE_UPDATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[STATE_UPDATE:([^\]]*)\]").expect("valid regex"));

/// Narration split away from the raw tokens of its state update block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedUpdate {
    pub narration: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has no '='")]
    MissingEquals,
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("HP value '{0}' is not an integer")]
    InvalidHp(String),
}

/// Separate display narration from the directive tokens.
///
/// Only the first block is considered. A marker without a closing bracket
/// still hides the tail from the player but yields no tokens.
pub fn extract_state_update(raw: &str) -> ExtractedUpdate {
    let Some((before, _)) = raw.split_once(STATE_UPDATE_MARKER) else {
        return ExtractedUpdate {
            narration: raw.trim().to_string(),
            tokens: Vec::new(),
        };
    };

    let tokens = STATE_UPDATE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|body| {
            body.as_str()
                .split(',')
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    ExtractedUpdate {
        narration: before.trim().to_string(),
        tokens,
    }
}

/// Parse one `KEY=VALUE` token, split on the first `=`.
///
/// Keys are case-sensitive and neither side is trimmed; the caller has
/// already trimmed the token as a whole.
pub fn parse_token(token: &str) -> Result<Directive, TokenError> {
    let (key, value) = token.split_once('=').ok_or(TokenError::MissingEquals)?;

    match key {
        HP_KEY => parse_hp_delta(value)
            .map(|delta| Directive::Hp { delta })
            .ok_or_else(|| TokenError::InvalidHp(value.to_string())),
        INVENTORY_ADD_KEY => Ok(Directive::InventoryAdd {
            item: value.to_string(),
        }),
        INVENTORY_REMOVE_KEY => Ok(Directive::InventoryRemove {
            item: value.to_string(),
        }),
        other => Err(TokenError::UnknownKey(other.to_string())),
    }
}

/// Any optionally signed run of digits is an integer; values outside the
/// `i32` range saturate instead of being dropped.
fn parse_hp_delta(value: &str) -> Option<i32> {
    let digits = value.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let delta = match value.parse::<i64>() {
        Ok(v) => v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
        Err(_) if value.starts_with('-') => i32::MIN,
        Err(_) => i32::MAX,
    };
    Some(delta)
}

/// Apply every directive in `raw` to `state`, reporting each token.
pub fn apply_state_updates_with_report(raw: &str, state: &mut PlayerState) -> StateUpdateReport {
    let extracted = extract_state_update(raw);

    let results = extracted
        .tokens
        .iter()
        .map(|token| match parse_token(token) {
            Ok(directive) => {
                let key = directive.key();
                let outcome = apply_directive(state, directive);
                tracing::debug!(key, ?outcome, "Applied state update token");
                outcome
            }
            Err(e) => {
                tracing::debug!(token = %token, error = %e, "Skipping state update token");
                DirectiveOutcome::Skipped {
                    token: token.clone(),
                    reason: e.to_string(),
                }
            }
        })
        .collect();

    StateUpdateReport {
        narration: extracted.narration,
        results,
    }
}

/// Returns the display narration and the updated state.
pub fn apply_state_updates(raw: &str, mut state: PlayerState) -> (String, PlayerState) {
    let report = apply_state_updates_with_report(raw, &mut state);
    (report.narration, state)
}
