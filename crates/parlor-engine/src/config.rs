//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for a session, shared by every session a registry creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Starting clock budget per side.
    pub initial_time: Duration,

    /// Base delay before a scheduled AI turn fires. The AI is never
    /// invoked inline on the move that hands it the turn — the delay
    /// both reads as "thinking" to the opponent and keeps a search off
    /// the path that serves other sessions.
    pub ai_move_delay: Duration,

    /// Random extra delay (0..=jitter) added per AI turn so several
    /// AI sessions started together don't all wake at once.
    pub ai_move_jitter: Duration,

    /// Maximum moves included in snapshot history. 0 means unlimited.
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // Ten minutes per side.
            initial_time: Duration::from_secs(600),
            ai_move_delay: Duration::from_millis(400),
            ai_move_jitter: Duration::from_millis(200),
            history_limit: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.initial_time, Duration::from_secs(600));
        assert_eq!(config.history_limit, 0);
        assert!(config.ai_move_delay > Duration::ZERO);
    }
}
