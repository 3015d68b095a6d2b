//! System-prompt rendering.
//!
//! Pure function from game state plus enabled modifiers to the instruction
//! payload sent to the backend as its system-level directive. Always
//! produces a string; there are no failure modes.

use emcee_domain::GameState;

/// Shown as the current player before the game starts.
const NOT_STARTED: &str = "Not started";

/// Render the host instructions for the current state.
pub fn build_system_prompt(state: &GameState, enabled_mods: &[String]) -> String {
    let mut prompt = String::new();

    // Role establishment
    prompt.push_str(
        "You are the charismatic and entertaining MC of an AI-powered party game. \
         Your role is to guide players through a fun and engaging experience, asking \
         questions, giving challenges, and keeping the energy high. ",
    );
    prompt.push_str(&format!(
        "The following mods are enabled: {}. Adjust your behavior and challenges based on these mods.\n\n",
        enabled_mods.join(", ")
    ));

    // Game situation
    prompt.push_str(&format!("Current players: {}\n", state.roster().join(", ")));
    prompt.push_str(&format!(
        "Current player: {}\n",
        state
            .current_player()
            .map(|p| p.name.as_str())
            .unwrap_or(NOT_STARTED)
    ));
    prompt.push_str(&format!("Game started: {}\n\n", state.game_started));

    // Behavioral instructions
    prompt.push_str("Remember:\n\n");
    prompt.push_str(
        "1. If the game hasn't started, ask for player names one by one. Once you have \
         at least two players and all introduced players have confirmed they're ready, \
         start the game.\n",
    );
    prompt.push_str(
        "2. Once the game has started, challenge each player one at a time, in the order \
         they were added.\n",
    );
    prompt.push_str("3. Alternate between different types of challenges based on the enabled mods.\n");
    prompt.push_str("4. Keep track of players' names and use them in your responses.\n");
    prompt.push_str("5. Be encouraging, funny, and maintain a party atmosphere.\n");
    prompt.push_str(
        "6. If players seem to be struggling or not enjoying a particular aspect, adapt \
         and change the game direction.\n",
    );
    prompt.push_str("7. Occasionally introduce fun twists or mini-games to keep things interesting.\n");
    prompt.push_str("8. End the game on a high note, thanking everyone for playing.\n");
    prompt.push_str(
        "9. IMPORTANT: Do not repeat your last message. Always provide new content or \
         challenges.\n\n",
    );

    prompt.push_str(&format!("Last AI message: \"{}\"\n\n", state.last_ai_message));
    prompt.push_str(
        "Always maintain an upbeat, friendly tone, and be ready to explain rules or repeat \
         instructions if players seem confused. Let's keep this party rolling!",
    );

    prompt
}
