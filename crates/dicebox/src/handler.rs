//! Per-connection handler: intent decoding, dispatch, and replies.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Open an outbound channel and spawn a writer task draining it
//!   2. Loop: receive envelopes → dispatch intents to the room registry
//!   3. On exit, unseat the player from their room
//!
//! Replies to the requester and room broadcasts both go through the
//! outbound channel, so every frame on a connection carries the next
//! sequence number in order.

use std::sync::Arc;
use std::time::Instant;

use dicebox_game::Line;
use dicebox_protocol::{
    ClientIntent, Codec, Envelope, ErrorCode, PlayerId, ProtocolError,
    ServerEvent,
};
use dicebox_room::{PlayerSender, RoomError};
use dicebox_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::DiceboxError;
use crate::server::ServerState;

/// Largest inbound frame accepted.
const MAX_FRAME_LEN: usize = 16 * 1024;

/// Drop guard that unseats a player when the handler exits, including on
/// panic. The registry lock is async, so `drop` spawns the leave.
struct SeatGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SeatGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.rooms.lock().await.leave(player_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), DiceboxError> {
    let conn = Arc::new(conn);
    let player_id = PlayerId(conn.id().into_inner());
    let start = Instant::now();
    tracing::debug!(%player_id, peer = %conn.peer_addr(), "player connected");

    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_events(
        Arc::clone(&conn),
        rx,
        Arc::clone(&state),
        start,
    ));
    let _guard = SeatGuard {
        player_id,
        state: Arc::clone(&state),
    };

    loop {
        let data =
            match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
                Ok(Ok(Some(data))) => data,
                Ok(Ok(None)) => {
                    tracing::info!(%player_id, "connection closed cleanly");
                    break;
                }
                Ok(Err(e)) => {
                    tracing::debug!(%player_id, error = %e, "recv error");
                    break;
                }
                Err(_) => {
                    tracing::info!(%player_id, "connection timed out");
                    break;
                }
            };

        let envelope = match decode_intent(&state.codec, &data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(
                    %player_id, error = %e, "failed to decode envelope"
                );
                reply_error(
                    &tx,
                    ErrorCode::BadRequest,
                    format!("malformed message: {e}"),
                );
                continue;
            }
        };

        let should_close =
            handle_intent(&state, player_id, &tx, envelope.payload, start)
                .await;
        if should_close {
            break;
        }
    }

    // The room still holds a clone of `tx`, so the writer would outlive us.
    writer.abort();
    conn.close().await?;
    // _guard drops here → player leaves their room.
    Ok(())
}

/// Dispatches one intent. Returns `true` if the connection should close.
async fn handle_intent<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    tx: &PlayerSender,
    intent: ClientIntent,
    start: Instant,
) -> bool {
    match intent {
        ClientIntent::CreateRoom { name, board_size } => {
            let result = state.rooms.lock().await.create_room(
                player_id,
                &name,
                board_size,
                tx.clone(),
            );
            if let Err(e) = result {
                reject(tx, player_id, e);
            }
        }

        ClientIntent::JoinRoom { room_id, name } => {
            let result = state.rooms.lock().await.join_room(
                &room_id,
                player_id,
                &name,
                tx.clone(),
            );
            if let Err(e) = result {
                reject(tx, player_id, e);
            }
        }

        ClientIntent::RollDice { room_id } => {
            let result = {
                let mut rooms = state.rooms.lock().await;
                rooms
                    .authorize_turn(&room_id, player_id)
                    .and_then(|_| rooms.roll_dice(&room_id))
            };
            if let Err(e) = result {
                reject_turn(tx, player_id, e);
            }
        }

        ClientIntent::MakeMove {
            room_id,
            line_type,
            row,
            col,
        } => {
            let line = Line {
                kind: line_type,
                row,
                col,
            };
            let result = {
                let mut rooms = state.rooms.lock().await;
                rooms
                    .authorize_turn(&room_id, player_id)
                    .and_then(|_| rooms.make_move(&room_id, line))
            };
            if let Err(e) = result {
                reject_turn(tx, player_id, e);
            }
        }

        ClientIntent::Heartbeat { client_time } => {
            let _ = tx.send(ServerEvent::HeartbeatAck {
                client_time,
                server_time: elapsed_ms(start),
            });
        }

        ClientIntent::Disconnect { reason } => {
            tracing::info!(%player_id, %reason, "client disconnected");
            return true;
        }
    }

    false
}

/// Reports a failed create or join to the requester.
fn reject(tx: &PlayerSender, player_id: PlayerId, err: RoomError) {
    tracing::debug!(%player_id, error = %err, "request rejected");
    if let Some(code) = err.error_code() {
        reply_error(tx, code, err.to_string());
    }
}

/// Reports a failed roll or move.
///
/// An unknown room and a move or roll the game refuses are silent; only
/// seat and turn problems are reported.
fn reject_turn(tx: &PlayerSender, player_id: PlayerId, err: RoomError) {
    match err {
        RoomError::NotFound(_)
        | RoomError::RollRejected(_)
        | RoomError::MoveRejected(_) => {
            tracing::debug!(%player_id, reason = %err, "ignored turn intent");
        }
        err => reject(tx, player_id, err),
    }
}

fn decode_intent<C: Codec>(
    codec: &C,
    data: &[u8],
) -> Result<Envelope<ClientIntent>, ProtocolError> {
    if data.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::InvalidMessage(format!(
            "frame of {} bytes exceeds {MAX_FRAME_LEN}",
            data.len()
        )));
    }
    codec.decode(data)
}

fn reply_error(tx: &PlayerSender, code: ErrorCode, message: String) {
    let _ = tx.send(ServerEvent::Error { code, message });
}

/// Drains the outbound channel onto the socket, framing each event.
async fn write_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
    state: Arc<ServerState<C>>,
    start: Instant,
) {
    let mut seq: u64 = 1;
    while let Some(event) = rx.recv().await {
        let envelope = Envelope::new(next_seq(&mut seq), elapsed_ms(start), event);
        let bytes = match state.codec.encode(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed");
            break;
        }
    }
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
