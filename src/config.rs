use std::time::Duration;

/// Front-end configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Time per side in seconds.
    pub time_control_secs: u64,
    /// Draw pieces with Unicode chess glyphs instead of FEN letters.
    pub unicode_pieces: bool,
    /// Optional FEN to start from instead of the standard position.
    pub start_fen: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            time_control_secs: lookup("CHESS_TIME_CONTROL")
                .and_then(|v| v.parse().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or(defaults.time_control_secs),
            unicode_pieces: lookup("CHESS_UNICODE_PIECES")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(defaults.unicode_pieces),
            start_fen: lookup("CHESS_START_FEN").filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn time_control(&self) -> Duration {
        Duration::from_secs(self.time_control_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            time_control_secs: 300,
            unicode_pieces: true,
            start_fen: None,
        }
    }
}
