//! Per-connection handler: decodes client events, routes them into the
//! engine, and pumps session broadcasts back out.
//!
//! Each connection owns one unbounded event channel. Its sender is
//! registered with whichever session the client joins (the engine
//! broadcasts through it); the receiving half is drained here,
//! interleaved with inbound frames via `select!`.
//!
//! The actor id is the connection id — one identity per socket, the
//! way the original backend used socket ids. Authorization of session
//! ids happens upstream in the room directory; this layer accepts the
//! ids it is handed.

use parlor_engine::{ActionRouter, TurnGame};
use parlor_protocol::{
    ActorId, ClientEvent, Codec, JsonCodec, ProtocolError, ServerEvent,
    SessionId,
};
use parlor_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ParlorError;

/// Handles one connection from accept to close.
pub(crate) async fn handle_connection<G: TurnGame>(
    conn: WebSocketConnection,
    router: ActionRouter<G>,
    codec: JsonCodec,
) -> Result<(), ParlorError> {
    let actor = ActorId::from(conn.id().to_string());
    tracing::debug!(%actor, "handling new connection");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    // The session this connection has joined, if any. A connection is
    // in at most one session at a time.
    let mut joined: Option<SessionId> = None;

    loop {
        tokio::select! {
            // Session broadcasts → socket.
            outbound = event_rx.recv() => {
                let Some(event) = outbound else { break };
                if send_event(&conn, &codec, &event).await.is_err() {
                    break;
                }
            }

            // Socket → engine.
            inbound = conn.recv() => {
                match inbound {
                    Ok(Some(text)) => {
                        handle_frame(
                            &conn, &router, &codec, &actor, &mut joined,
                            &event_tx, &text,
                        )
                        .await;
                    }
                    Ok(None) => {
                        tracing::info!(%actor, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%actor, error = %e, "recv error");
                        break;
                    }
                }
            }
        }
    }

    // Deferred cleanup: mark the slot disconnected; the router evicts
    // the session only once nobody is left in it.
    if let Some(session_id) = joined {
        router.leave(&session_id, actor).await;
    }
    Ok(())
}

/// Decodes and dispatches a single inbound frame. All rejections are
/// answered with an `Error` event on this connection; nothing here
/// tears the connection down.
async fn handle_frame<G: TurnGame>(
    conn: &WebSocketConnection,
    router: &ActionRouter<G>,
    codec: &JsonCodec,
    actor: &ActorId,
    joined: &mut Option<SessionId>,
    event_tx: &mpsc::UnboundedSender<ServerEvent>,
    text: &str,
) {
    let event: ClientEvent = match codec.decode(text.as_bytes()) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(%actor, error = %e, "undecodable frame");
            let _ = send_event(
                conn,
                codec,
                &ServerEvent::Error {
                    kind: "bad_event".into(),
                    message: e.to_string(),
                },
            )
            .await;
            return;
        }
    };

    match event {
        ClientEvent::Join {
            session_id,
            display_name,
            ai_opponent,
            ai_difficulty,
        } => {
            if let Some(current) = joined {
                if *current != session_id {
                    let _ = send_event(
                        conn,
                        codec,
                        &ServerEvent::Error {
                            kind: "already_joined".into(),
                            message: format!("already in session {current}"),
                        },
                    )
                    .await;
                    return;
                }
            }

            let result = router
                .join(
                    &session_id,
                    actor.clone(),
                    display_name,
                    ai_opponent,
                    ai_difficulty,
                    event_tx.clone(),
                )
                .await;

            match result {
                Ok((seat, snapshot)) => {
                    *joined = Some(session_id);
                    let _ = send_event(
                        conn,
                        codec,
                        &ServerEvent::Joined { seat, snapshot },
                    )
                    .await;
                }
                Err(e) => {
                    let _ = send_event(
                        conn,
                        codec,
                        &ServerEvent::Error {
                            kind: e.kind().into(),
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        ClientEvent::Action { session_id, action, payload } => {
            // Accepted actions reach everyone (including the sender)
            // through the session broadcast; only rejections are
            // answered directly.
            if let Err(e) = router
                .dispatch(&session_id, actor.clone(), action, payload)
                .await
            {
                tracing::debug!(%actor, error = %e, "action rejected");
                let _ = send_event(
                    conn,
                    codec,
                    &ServerEvent::Error {
                        kind: e.kind().into(),
                        message: e.to_string(),
                    },
                )
                .await;
            }
        }
    }
}

/// Encodes an event and sends it as one text frame.
async fn send_event(
    conn: &WebSocketConnection,
    codec: &JsonCodec,
    event: &ServerEvent,
) -> Result<(), ParlorError> {
    let bytes = codec.encode(event)?;
    let text = String::from_utf8(bytes).map_err(|_| {
        ParlorError::Protocol(ProtocolError::InvalidEvent(
            "event encoded to non-UTF-8".into(),
        ))
    })?;
    conn.send(&text).await?;
    Ok(())
}
