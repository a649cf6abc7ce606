//! Unified error type for the parlor server.

use parlor_engine::ActionError;
use parlor_protocol::ProtocolError;
use parlor_transport::TransportError;

/// Top-level error wrapping each layer's error type.
///
/// The `#[from]` attributes generate the `From` impls, so `?` converts
/// layer errors automatically on the way up.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An engine-level rejection.
    #[error(transparent)]
    Action(#[from] ActionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_protocol::SessionId;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let wrapped: ParlorError = err.into();
        assert!(matches!(wrapped, ParlorError::Transport(_)));
        assert!(wrapped.to_string().contains("gone"));
    }

    #[test]
    fn test_from_action_error() {
        let err = ActionError::SessionNotFound(SessionId::from("r1"));
        let wrapped: ParlorError = err.into();
        assert!(matches!(wrapped, ParlorError::Action(_)));
        assert!(wrapped.to_string().contains("r1"));
    }
}
