//! Static catalog of optional rule-modifiers.
//!
//! The catalog is fixed data: clients toggle entries and re-transmit the
//! enabled subset as a control message on every change. The server never
//! mutates the catalog; it only uses it to supply the default enabled set
//! when no control message has been seen yet.

use serde::{Deserialize, Serialize};

/// One optional rule toggle altering challenge style or content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// Stable identifier used in control messages.
    pub id: &'static str,
    /// Human-readable label.
    pub name: &'static str,
    /// Whether the modifier is on before the player touches anything.
    pub default_enabled: bool,
}

const CATALOG: &[Modifier] = &[
    Modifier { id: "drinking_game", name: "Drinking Game", default_enabled: true },
    Modifier { id: "exercise_challenges", name: "Add Exercise Challenges", default_enabled: false },
    Modifier { id: "add_water", name: "Add Water", default_enabled: false },
    Modifier { id: "tongue_twisters", name: "Add Tongue Twisters", default_enabled: false },
    Modifier { id: "food_challenges", name: "Add Food Challenges", default_enabled: false },
    Modifier { id: "easy_ai", name: "Easy-going AI (Easy Challenges)", default_enabled: false },
    Modifier { id: "hard_ai", name: "Hard AI (Difficult Challenges)", default_enabled: false },
    Modifier { id: "inquisitive_ai", name: "Inquisitive AI (Customized Games)", default_enabled: false },
    Modifier { id: "truth_or_dare", name: "Truth or Dare", default_enabled: false },
    Modifier { id: "karaoke_challenges", name: "Karaoke Challenges", default_enabled: false },
    Modifier { id: "movie_quotes", name: "Movie Quote Challenges", default_enabled: false },
    Modifier { id: "dance_offs", name: "Dance-Off Challenges", default_enabled: false },
    Modifier { id: "trivia_master", name: "Trivia Master", default_enabled: false },
    Modifier { id: "would_you_rather", name: "Would You Rather", default_enabled: false },
    Modifier { id: "impressions", name: "Celebrity Impressions", default_enabled: false },
    Modifier { id: "charades", name: "Charades", default_enabled: false },
    Modifier { id: "storytelling", name: "Collaborative Storytelling", default_enabled: false },
    Modifier { id: "riddles", name: "Riddles and Brain Teasers", default_enabled: false },
    Modifier { id: "accent_challenge", name: "Accent Challenge", default_enabled: false },
    Modifier { id: "lip_sync_battles", name: "Lip Sync Battles", default_enabled: false },
    Modifier { id: "dare_devil", name: "Dare Devil (Risky Challenges)", default_enabled: false },
    Modifier { id: "rapid_fire", name: "Rapid Fire Questions", default_enabled: false },
    Modifier { id: "memory_game", name: "Memory Game Challenges", default_enabled: false },
    Modifier { id: "physical_comedy", name: "Physical Comedy Challenges", default_enabled: false },
    Modifier { id: "pun_master", name: "Pun Master", default_enabled: false },
    Modifier { id: "emoji_translator", name: "Emoji Translator", default_enabled: false },
    Modifier { id: "reverse_charades", name: "Reverse Charades", default_enabled: false },
    Modifier { id: "musical_challenges", name: "Musical Challenges", default_enabled: false },
    Modifier { id: "blindfolded_tasks", name: "Blindfolded Tasks", default_enabled: false },
    Modifier { id: "team_challenges", name: "Team Challenges", default_enabled: false },
    Modifier { id: "debate_club", name: "Impromptu Debate Club", default_enabled: false },
    Modifier { id: "time_travel", name: "Time Travel Scenarios", default_enabled: false },
    Modifier { id: "silent_challenge", name: "Silent Challenge", default_enabled: false },
    Modifier { id: "compliment_battle", name: "Compliment Battle", default_enabled: false },
    Modifier { id: "roast_master", name: "Roast Master (Friendly Roasts)", default_enabled: false },
    Modifier { id: "accent_roulette", name: "Accent Roulette", default_enabled: false },
    Modifier { id: "lyric_challenge", name: "Finish the Lyric Challenge", default_enabled: false },
    Modifier { id: "mime_time", name: "Mime Time", default_enabled: false },
    Modifier { id: "tongue_twister_race", name: "Tongue Twister Race", default_enabled: false },
    Modifier { id: "fictional_scenarios", name: "Fictional Scenarios", default_enabled: false },
    Modifier { id: "celebrity_hot_seat", name: "Celebrity Hot Seat", default_enabled: false },
    Modifier { id: "rhythm_challenge", name: "Rhythm Challenge", default_enabled: false },
    Modifier { id: "word_association", name: "Rapid Word Association", default_enabled: false },
    Modifier { id: "art_challenge", name: "60-Second Art Challenge", default_enabled: false },
    Modifier { id: "sports_commentary", name: "Sports Commentary", default_enabled: false },
    Modifier { id: "magic_show", name: "Impromptu Magic Show", default_enabled: false },
    Modifier { id: "fashion_show", name: "Impromptu Fashion Show", default_enabled: false },
    Modifier { id: "commercial_break", name: "Create a Commercial", default_enabled: false },
    Modifier { id: "animal_impressions", name: "Animal Impressions", default_enabled: false },
    Modifier { id: "superhero_scenarios", name: "Superhero Scenarios", default_enabled: false },
    Modifier { id: "whisper_challenge", name: "Whisper Challenge", default_enabled: false },
    Modifier { id: "news_anchor", name: "Fake News Anchor", default_enabled: false },
    Modifier { id: "slow_motion", name: "Slow Motion Challenge", default_enabled: false },
    Modifier { id: "poetry_slam", name: "Impromptu Poetry Slam", default_enabled: false },
    Modifier { id: "voice_acting", name: "Voice Acting Challenge", default_enabled: false },
    Modifier { id: "human_knot", name: "Human Knot Challenge", default_enabled: false },
    Modifier { id: "balloon_challenge", name: "Balloon Challenge", default_enabled: false },
    Modifier { id: "paper_airplane", name: "Paper Airplane Contest", default_enabled: false },
];

/// The full ordered catalog.
pub fn catalog() -> &'static [Modifier] {
    CATALOG
}

/// Ids of the modifiers that are on by default.
///
/// This is the enabled set used until the first control message arrives.
pub fn default_enabled_ids() -> Vec<String> {
    CATALOG
        .iter()
        .filter(|m| m.default_enabled)
        .map(|m| m.id.to_string())
        .collect()
}

/// Look up a catalog entry by id.
pub fn find(id: &str) -> Option<&'static Modifier> {
    CATALOG.iter().find(|m| m.id == id)
}
