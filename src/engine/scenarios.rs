use rand::seq::SliceRandom;
use rand::Rng;

/// Openings a new game may start from. Pure flavor; none of them changes
/// the player's state.
pub const OPENING_SCENARIOS: &[&str] = &[
    "You find yourself in a dimly lit tavern. A hooded stranger in the corner raises a cup in your direction.",
    "You wake on a cold stone floor. Somewhere above you, water drips into a pool you cannot see.",
    "The caravan you were guarding lies overturned on the forest road. Something large moves between the trees.",
    "The village elder presses a tarnished key into your hand and begs you to find her missing grandson.",
    "A storm drives you to the gates of a ruined keep. The portcullis is raised, and a torch burns inside.",
    "You stand at the edge of a frozen lake. On the far shore, a tower of black glass catches the last light.",
];

pub fn pick_opening<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    OPENING_SCENARIOS
        .choose(rng)
        .copied()
        .unwrap_or(OPENING_SCENARIOS[0])
}
