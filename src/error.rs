// Error kinds surfaced outside of rollouts
//
// Inside a rollout nothing fails: every fault is modeled as a player
// elimination. Everything here aborts the game (or, for sink errors raised
// after the game started, is reported once the game is over).

use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// Malformed server message, missing fields, unparseable deadline
    Protocol(String),
    /// Connection dropped or refused
    Transport(String),
    /// A board or engine state that breaks the game invariants
    Invariant(String),
    /// Bad configuration or command line values
    Config(String),
    /// Output sink could not be created or written
    Sink(String),
    Io(std::io::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Protocol(msg) => write!(f, "protocol error: {}", msg),
            EngineError::Transport(msg) => write!(f, "transport error: {}", msg),
            EngineError::Invariant(msg) => write!(f, "invariant violated: {}", msg),
            EngineError::Config(msg) => write!(f, "configuration error: {}", msg),
            EngineError::Sink(msg) => write!(f, "output error: {}", msg),
            EngineError::Io(e) => write!(f, "i/o error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Protocol(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_errors_are_protocol_errors() {
        let err: EngineError = serde_json::from_str::<u8>("not json").unwrap_err().into();
        assert!(matches!(err, EngineError::Protocol(_)));
    }

    #[test]
    fn test_display_names_the_kind() {
        let err = EngineError::Invariant("you=3 not in players".to_string());
        assert_eq!(err.to_string(), "invariant violated: you=3 not in players");
    }
}
