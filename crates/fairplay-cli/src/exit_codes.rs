//! Process exit codes.

/// Run completed; no team was flagged.
pub const EXIT_SUCCESS: i32 = 0;
/// Run completed; at least one team carries high-severity evidence.
pub const EXIT_FLAGGED: i32 = 1;
/// Invalid configuration or roster; nothing was evaluated.
pub const EXIT_CONFIG_ERROR: i32 = 2;
