//! Chess arena: a runnable parlor server hosting chess sessions.
//!
//! Connect over WebSocket and speak the JSON event contract:
//!
//! ```text
//! → { "type": "Join", "session_id": "r1", "display_name": "alice" }
//! ← { "type": "Joined", "seat": "white", "snapshot": { ... } }
//! → { "type": "Action", "session_id": "r1", "action": "move", "payload": "e4" }
//! ← { "type": "MovePlayed", "notation": "e4", "snapshot": { ... } }
//! ```
//!
//! Pass `ai_opponent: true` on join to play against the engine.

use parlor::prelude::*;
use parlor_chess::ChessGame;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let server = ParlorServer::<ChessGame>::builder()
        .bind("0.0.0.0:8080")
        .build::<ChessGame>()
        .await?;

    tracing::info!(addr = %server.local_addr()?, "chess arena up");
    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use parlor_engine::SessionConfig;
    use parlor_protocol::{
        ServerEvent, SessionPhase, Side,
    };
    use std::time::Duration;
    use tokio_tungstenite::tungstenite::Message;

    type Ws = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn start_with(config: SessionConfig) -> String {
        let server = ParlorServer::<ChessGame>::builder()
            .bind("127.0.0.1:0")
            .session_config(config)
            .build::<ChessGame>()
            .await
            .unwrap();
        let addr = server.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let _ = server.run().await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        addr
    }

    async fn start() -> String {
        start_with(SessionConfig {
            ai_move_delay: Duration::from_millis(30),
            ai_move_jitter: Duration::ZERO,
            ..SessionConfig::default()
        })
        .await
    }

    async fn ws(addr: &str) -> Ws {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .unwrap();
        ws
    }

    async fn send_json(ws: &mut Ws, value: serde_json::Value) {
        ws.send(Message::Text(value.to_string().into())).await.unwrap();
    }

    async fn join(ws: &mut Ws, room: &str, name: &str) {
        send_json(
            ws,
            serde_json::json!({
                "type": "Join",
                "session_id": room,
                "display_name": name,
            }),
        )
        .await;
    }

    async fn join_vs_ai(ws: &mut Ws, room: &str, name: &str) {
        send_json(
            ws,
            serde_json::json!({
                "type": "Join",
                "session_id": room,
                "display_name": name,
                "ai_opponent": true,
                "ai_difficulty": "shallow",
            }),
        )
        .await;
    }

    async fn play(ws: &mut Ws, room: &str, notation: &str) {
        send_json(
            ws,
            serde_json::json!({
                "type": "Action",
                "session_id": room,
                "action": "move",
                "payload": notation,
            }),
        )
        .await;
    }

    async fn recv(ws: &mut Ws) -> ServerEvent {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
                .await
                .expect("timed out waiting for event")
                .expect("stream ended")
                .expect("ws error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(&text).expect("bad server event");
            }
        }
    }

    #[tokio::test]
    async fn test_two_joins_seat_both_sides_and_start() {
        let addr = start().await;
        let mut alice = ws(&addr).await;
        let mut bob = ws(&addr).await;

        join(&mut alice, "e2e-1", "alice").await;
        let event = recv(&mut alice).await;
        match event {
            ServerEvent::Joined { seat, snapshot } => {
                assert_eq!(seat, parlor_protocol::Seat::White);
                assert_eq!(snapshot.phase, SessionPhase::Waiting);
            }
            other => panic!("expected Joined, got {other:?}"),
        }

        join(&mut bob, "e2e-1", "bob").await;
        let event = recv(&mut bob).await;
        match event {
            ServerEvent::Joined { seat, snapshot } => {
                assert_eq!(seat, parlor_protocol::Seat::Black);
                assert_eq!(snapshot.phase, SessionPhase::Active);
            }
            other => panic!("expected Joined, got {other:?}"),
        }

        // Alice hears about bob taking a seat.
        let event = recv(&mut alice).await;
        match event {
            ServerEvent::PlayerJoined { player, snapshot } => {
                assert_eq!(player.side, Side::Black);
                assert_eq!(snapshot.phase, SessionPhase::Active);
            }
            other => panic!("expected PlayerJoined, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_move_broadcasts_to_both_players() {
        let addr = start().await;
        let mut alice = ws(&addr).await;
        let mut bob = ws(&addr).await;

        join(&mut alice, "e2e-2", "alice").await;
        let _ = recv(&mut alice).await; // Joined
        join(&mut bob, "e2e-2", "bob").await;
        let _ = recv(&mut bob).await; // Joined
        let _ = recv(&mut alice).await; // PlayerJoined

        play(&mut alice, "e2e-2", "e4").await;

        for client in [&mut alice, &mut bob] {
            match recv(client).await {
                ServerEvent::MovePlayed { notation, snapshot } => {
                    assert_eq!(notation, "e4");
                    assert_eq!(snapshot.moves.len(), 1);
                    assert!(snapshot.board.contains(" b "), "black to move");
                }
                other => panic!("expected MovePlayed, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_wrong_turn_is_rejected_with_error_event() {
        let addr = start().await;
        let mut alice = ws(&addr).await;
        let mut bob = ws(&addr).await;

        join(&mut alice, "e2e-3", "alice").await;
        let _ = recv(&mut alice).await;
        join(&mut bob, "e2e-3", "bob").await;
        let _ = recv(&mut bob).await;

        // Black tries to open.
        play(&mut bob, "e2e-3", "e5").await;
        match recv(&mut bob).await {
            ServerEvent::Error { kind, .. } => assert_eq!(kind, "not_your_turn"),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resign_ends_the_game() {
        let addr = start().await;
        let mut alice = ws(&addr).await;
        let mut bob = ws(&addr).await;

        join(&mut alice, "e2e-4", "alice").await;
        let _ = recv(&mut alice).await;
        join(&mut bob, "e2e-4", "bob").await;
        let _ = recv(&mut bob).await;
        let _ = recv(&mut alice).await; // PlayerJoined

        send_json(
            &mut bob,
            serde_json::json!({
                "type": "Action",
                "session_id": "e2e-4",
                "action": "resign",
            }),
        )
        .await;

        match recv(&mut alice).await {
            ServerEvent::GameOver { snapshot } => {
                assert_eq!(snapshot.phase, SessionPhase::Finished);
                let outcome = snapshot.result.unwrap();
                assert_eq!(outcome.winner, Some(Side::White));
            }
            other => panic!("expected GameOver, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ai_opponent_replies_to_the_opening_move() {
        let addr = start().await;
        let mut alice = ws(&addr).await;

        join_vs_ai(&mut alice, "e2e-5", "alice").await;
        match recv(&mut alice).await {
            ServerEvent::Joined { snapshot, .. } => {
                // AI seated: the session starts immediately.
                assert_eq!(snapshot.phase, SessionPhase::Active);
                let ai = snapshot.player_for_side(Side::Black).unwrap();
                assert!(ai.ai);
            }
            other => panic!("expected Joined, got {other:?}"),
        }

        play(&mut alice, "e2e-5", "e4").await;

        // Our own move comes back first...
        match recv(&mut alice).await {
            ServerEvent::MovePlayed { snapshot, .. } => {
                assert_eq!(snapshot.moves.len(), 1);
            }
            other => panic!("expected MovePlayed, got {other:?}"),
        }
        // ...and the AI's reply arrives on its own within the delay
        // window.
        match recv(&mut alice).await {
            ServerEvent::MovePlayed { snapshot, .. } => {
                assert_eq!(snapshot.moves.len(), 2);
                assert_eq!(snapshot.moves[1].side, Side::Black);
                assert!(snapshot.board.contains(" w "), "white to move again");
            }
            other => panic!("expected MovePlayed, got {other:?}"),
        }
    }
}
